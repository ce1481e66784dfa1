use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    parser,
    spec::{PipelineSpec, PipelineSpecs, PipelineStep},
    SanitizeError, TransformRegistry,
};

/// Applies configured pipelines to a mapping of input values.
///
/// The engine holds no per-call state; it only reads from the registry it
/// was built with, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    registry: Arc<TransformRegistry>,
}

impl Sanitizer {
    pub fn new(registry: Arc<TransformRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TransformRegistry> {
        &self.registry
    }

    /// Runs every configured pipeline against its input value.
    ///
    /// Keys without a pipeline are copied verbatim, pipelines without an
    /// input value are skipped. The first unknown transform name aborts the
    /// whole run. Nothing is logged here; callers report failures.
    pub fn run(
        &self,
        inputs: &Map<String, Value>,
        specs: &PipelineSpecs,
    ) -> Result<Map<String, Value>, SanitizeError> {
        let mut output = inputs.clone();

        for (key, spec) in specs {
            let Some(value) = inputs.get(key) else {
                continue;
            };

            let sanitized = self.apply(value.clone(), spec)?;
            output.insert(key.clone(), sanitized);
        }

        Ok(output)
    }

    /// Threads a single value through `spec`.
    pub fn apply(&self, value: Value, spec: &PipelineSpec) -> Result<Value, SanitizeError> {
        self.apply_steps(value, &parser::parse(spec))
    }

    /// Threads a single value through already-parsed steps, left to right.
    pub fn apply_steps(&self, value: Value, steps: &[PipelineStep]) -> Result<Value, SanitizeError> {
        steps.iter().try_fold(value, |current, step| match step {
            PipelineStep::Named { name, args } => {
                let transform = self.registry.resolve(name)?;
                Ok(transform(current, args.as_slice()))
            }
            PipelineStep::Inline(func) => Ok(func.call(current)),
        })
    }

    /// Checks that every named step in `specs` resolves, without touching any
    /// input. Meant to run once at startup.
    pub fn validate(&self, specs: &PipelineSpecs) -> Result<(), SanitizeError> {
        for spec in specs.values() {
            for step in parser::parse(spec) {
                if let Some(name) = step.name() {
                    if !self.registry.is_registered(name) {
                        return Err(SanitizeError::UnknownTransform(name.to_string()));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(TransformRegistry::shared())
    }
}
