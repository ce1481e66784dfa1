use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use input_sanitizer::{PipelineSpecs, TransformRegistry};
use serde::Deserialize;
use tracing::{debug, info};

/// On-disk pipeline configuration.
///
/// ```json
/// {
///   "aliases": { "clean_name": "trim|squish|ucwords" },
///   "pipelines": { "name": "clean_name", "email": ["trim", "lower"] }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct PipelineFile {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    pub pipelines: PipelineSpecs,
}

impl PipelineFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline file '{}'", path.display()))?;
        let file: PipelineFile = serde_json::from_str(&raw)
            .with_context(|| format!("invalid pipeline file '{}'", path.display()))?;

        info!(
            path = %path.display(),
            pipelines = file.pipelines.len(),
            aliases = file.aliases.len(),
            "pipeline file loaded"
        );
        Ok(file)
    }

    /// Registers every alias. Aliases may build on aliases defined earlier
    /// in name order.
    pub fn install_aliases(&self, registry: &TransformRegistry) -> Result<()> {
        for (name, spec) in &self.aliases {
            registry
                .register_alias(name.as_str(), spec)
                .with_context(|| format!("failed to register alias '{name}'"))?;
            debug!(alias = %name, spec = %spec, "alias registered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(contents.as_bytes()).expect("failed to write temp file");
        file
    }

    #[test]
    fn test_load_pipeline_file() {
        let file = write_file(
            r#"{
                "aliases": {"clean": "trim|squish"},
                "pipelines": {"name": "clean|ucwords", "tags": ["trim", "lower"]}
            }"#,
        );

        let loaded = PipelineFile::load(file.path()).unwrap();
        assert_eq!(loaded.aliases.len(), 1);
        assert_eq!(loaded.pipelines.len(), 2);
    }

    #[test]
    fn test_aliases_are_optional() {
        let file = write_file(r#"{"pipelines": {"name": "trim"}}"#);
        let loaded = PipelineFile::load(file.path()).unwrap();
        assert!(loaded.aliases.is_empty());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let file = write_file(r#"{"pipelines": {"name": 5}}"#);
        assert!(PipelineFile::load(file.path()).is_err());
    }

    #[test]
    fn test_install_aliases() {
        let file = write_file(r#"{"aliases": {"clean": "trim|squish"}, "pipelines": {}}"#);
        let loaded = PipelineFile::load(file.path()).unwrap();

        let registry = TransformRegistry::with_builtins();
        loaded.install_aliases(&registry).unwrap();
        assert!(registry.is_registered("clean"));
    }

    #[test]
    fn test_install_alias_with_unknown_step() {
        let file = write_file(r#"{"aliases": {"bad": "trim|nope"}, "pipelines": {}}"#);
        let loaded = PipelineFile::load(file.path()).unwrap();

        let registry = TransformRegistry::with_builtins();
        assert!(loaded.install_aliases(&registry).is_err());
    }
}
