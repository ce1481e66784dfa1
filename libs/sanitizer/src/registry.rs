use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use serde_json::Value;
use tracing::{debug, warn};

use crate::{parser, transforms, PipelineStep, SanitizeError};

/// A registered transform: takes the current value and the step's parsed
/// arguments and returns the transformed value.
pub type TransformFn = Arc<dyn Fn(Value, &[String]) -> Value + Send + Sync>;

static SHARED: OnceLock<Arc<TransformRegistry>> = OnceLock::new();

/// Name-to-transform lookup table.
///
/// Registration is expected to happen while the application is being
/// composed, before the registry is shared with request handlers. Later
/// registrations overwrite earlier ones under the same name.
pub struct TransformRegistry {
    transforms: RwLock<HashMap<String, TransformFn>>,
}

impl TransformRegistry {
    /// Creates a registry with no transforms at all.
    pub fn new() -> Self {
        Self {
            transforms: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a registry seeded with the built-in catalog.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        transforms::register_builtins(&registry);
        debug!(transforms = registry.len(), "seeded built-in transforms");
        registry
    }

    /// Process-wide registry, seeded with the built-ins on first access.
    pub fn shared() -> Arc<TransformRegistry> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::with_builtins())))
    }

    pub fn register<F>(&self, name: impl Into<String>, func: F)
    where
        F: Fn(Value, &[String]) -> Value + Send + Sync + 'static,
    {
        self.insert(name.into(), Arc::new(func));
    }

    /// Registers a composite transform built from a pipe-delimited pipeline.
    ///
    /// Every step is resolved now, so the alias keeps working even if one of
    /// its steps is overridden later. Arguments passed to the alias itself are
    /// ignored; each inner step keeps the arguments written in `spec`.
    pub fn register_alias(&self, name: impl Into<String>, spec: &str) -> Result<(), SanitizeError> {
        let mut resolved = Vec::new();
        for step in parser::parse_str(spec) {
            if let PipelineStep::Named {
                name: step_name,
                args,
            } = step
            {
                resolved.push((self.resolve(&step_name)?, args));
            }
        }

        self.insert(
            name.into(),
            Arc::new(move |value: Value, _args: &[String]| {
                resolved
                    .iter()
                    .fold(value, |current, (func, args)| func(current, args.as_slice()))
            }),
        );
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<TransformFn, SanitizeError> {
        self.transforms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SanitizeError::UnknownTransform(name.to_string()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.transforms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .transforms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.transforms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, name: String, func: TransformFn) {
        if name.is_empty() {
            warn!("ignoring transform registration with an empty name");
            return;
        }

        let mut guard = self
            .transforms
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if guard.insert(name.clone(), func).is_some() {
            debug!(transform = %name, "transform overridden");
        }
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let registry = TransformRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.resolve("trim"),
            Err(SanitizeError::UnknownTransform(name)) if name == "trim"
        ));
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = TransformRegistry::new();
        registry.register("shout", |value, _| match value {
            Value::String(s) => Value::String(format!("{s}!")),
            other => other,
        });

        assert!(registry.is_registered("shout"));
        let shout = registry.resolve("shout").unwrap();
        assert_eq!(shout(json!("hey"), &[]), json!("hey!"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let registry = TransformRegistry::new();
        registry.register("trim", |value, _| value);
        assert!(registry.is_registered("trim"));
        assert!(!registry.is_registered("Trim"));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = TransformRegistry::new();
        registry.register("tag", |_, _| json!("first"));
        registry.register("tag", |_, _| json!("second"));

        let tag = registry.resolve("tag").unwrap();
        assert_eq!(tag(Value::Null, &[]), json!("second"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_name_is_ignored() {
        let registry = TransformRegistry::new();
        registry.register("", |value, _| value);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_alias() {
        let registry = TransformRegistry::with_builtins();
        registry.register_alias("clean_name", "trim|squish|ucwords").unwrap();

        let clean = registry.resolve("clean_name").unwrap();
        assert_eq!(clean(json!("  ada   lovelace "), &[]), json!("Ada Lovelace"));
    }

    #[test]
    fn test_register_alias_keeps_step_args() {
        let registry = TransformRegistry::with_builtins();
        registry.register_alias("short", "trim|limit:3,").unwrap();

        let short = registry.resolve("short").unwrap();
        assert_eq!(short(json!("  abcdef "), &["99".to_string()]), json!("abc"));
    }

    #[test]
    fn test_register_alias_unknown_step() {
        let registry = TransformRegistry::with_builtins();
        let result = registry.register_alias("broken", "trim|nope");
        assert!(matches!(
            result,
            Err(SanitizeError::UnknownTransform(name)) if name == "nope"
        ));
        assert!(!registry.is_registered("broken"));
    }

    #[test]
    fn test_shared_registry_has_builtins() {
        let shared = TransformRegistry::shared();
        assert!(shared.is_registered("trim"));
        assert!(Arc::ptr_eq(&shared, &TransformRegistry::shared()));
    }
}
