//! Input sanitization pipelines.
//!
//! This crate threads named input values through configurable transform
//! pipelines such as `"trim|lower"` or `["trim", "date:m/d/Y"]`. It never
//! rejects input; the only failure is a pipeline naming a transform that is
//! not registered.
//!
//! The pieces:
//! - [`TransformRegistry`] maps names to transforms and comes seeded with the
//!   built-in catalog in [`transforms`].
//! - [`parser`] turns a [`PipelineSpec`] into ordered [`PipelineStep`]s.
//! - [`Sanitizer`] applies each key's pipeline to its value.

use serde_json::{Map, Value};
use thiserror::Error;

pub mod engine;
pub mod parser;
pub mod registry;
pub mod spec;
pub mod transforms;

pub use engine::Sanitizer;
pub use registry::{TransformFn, TransformRegistry};
pub use spec::{InlineFn, PipelineSpec, PipelineSpecs, PipelineStep, SpecItem};

/// Errors emitted while running pipelines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// A pipeline referenced a name with no registered implementation.
    #[error("unknown transform '{0}'")]
    UnknownTransform(String),
}

impl SanitizeError {
    pub fn transform_name(&self) -> &str {
        match self {
            SanitizeError::UnknownTransform(name) => name.as_str(),
        }
    }
}

/// Sanitizes `inputs` against the process-wide registry.
///
/// # Example
/// ```
/// use input_sanitizer::{sanitize, PipelineSpecs};
/// use serde_json::json;
///
/// let inputs = json!({"email": "  A@B.COM "});
/// let mut specs = PipelineSpecs::new();
/// specs.insert("email".into(), "trim|lower".into());
///
/// let output = sanitize(inputs.as_object().unwrap(), &specs).unwrap();
/// assert_eq!(output["email"], "a@b.com");
/// ```
pub fn sanitize(
    inputs: &Map<String, Value>,
    specs: &PipelineSpecs,
) -> Result<Map<String, Value>, SanitizeError> {
    Sanitizer::default().run(inputs, specs)
}
