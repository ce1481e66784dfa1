use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Per-key pipeline configuration handed to [`Sanitizer::run`](crate::Sanitizer::run).
pub type PipelineSpecs = BTreeMap<String, PipelineSpec>;

/// A one-off pipeline step supplied as a closure instead of a registered name.
///
/// Inline functions receive only the current value, never parsed arguments.
#[derive(Clone)]
pub struct InlineFn(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl InlineFn {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(func))
    }

    pub fn call(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for InlineFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InlineFn(..)")
    }
}

/// A pipeline as authored by the caller.
#[derive(Debug, Clone)]
pub enum PipelineSpec {
    /// Pipe-delimited string such as `"trim|date:m/d/Y"`.
    Text(String),
    /// Ordered list mixing transform names and inline functions.
    Steps(Vec<SpecItem>),
}

/// One element of a [`PipelineSpec::Steps`] list.
#[derive(Debug, Clone)]
pub enum SpecItem {
    /// A transform name, optionally carrying `:`-delimited arguments.
    Name(String),
    Inline(InlineFn),
}

impl SpecItem {
    pub fn inline<F>(func: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        SpecItem::Inline(InlineFn::new(func))
    }
}

/// A normalized, executable pipeline step.
#[derive(Debug, Clone)]
pub enum PipelineStep {
    /// Resolved against the registry when the pipeline runs.
    Named { name: String, args: Vec<String> },
    Inline(InlineFn),
}

impl PipelineStep {
    pub fn named(name: impl Into<String>, args: Vec<String>) -> Self {
        PipelineStep::Named {
            name: name.into(),
            args,
        }
    }

    /// Returns the transform name for named steps.
    pub fn name(&self) -> Option<&str> {
        match self {
            PipelineStep::Named { name, .. } => Some(name.as_str()),
            PipelineStep::Inline(_) => None,
        }
    }

    pub fn args(&self) -> &[String] {
        match self {
            PipelineStep::Named { args, .. } => args,
            PipelineStep::Inline(_) => &[],
        }
    }
}

impl PipelineSpec {
    pub fn is_empty(&self) -> bool {
        match self {
            PipelineSpec::Text(text) => text.trim().is_empty(),
            PipelineSpec::Steps(items) => items.is_empty(),
        }
    }
}

impl From<&str> for PipelineSpec {
    fn from(value: &str) -> Self {
        PipelineSpec::Text(value.to_string())
    }
}

impl From<String> for PipelineSpec {
    fn from(value: String) -> Self {
        PipelineSpec::Text(value)
    }
}

impl From<Vec<SpecItem>> for PipelineSpec {
    fn from(items: Vec<SpecItem>) -> Self {
        PipelineSpec::Steps(items)
    }
}

impl From<Vec<&str>> for PipelineSpec {
    fn from(names: Vec<&str>) -> Self {
        PipelineSpec::Steps(names.into_iter().map(SpecItem::from).collect())
    }
}

impl From<Vec<String>> for PipelineSpec {
    fn from(names: Vec<String>) -> Self {
        PipelineSpec::Steps(names.into_iter().map(SpecItem::Name).collect())
    }
}

impl From<&str> for SpecItem {
    fn from(value: &str) -> Self {
        SpecItem::Name(value.to_string())
    }
}

impl From<String> for SpecItem {
    fn from(value: String) -> Self {
        SpecItem::Name(value)
    }
}

impl From<InlineFn> for SpecItem {
    fn from(func: InlineFn) -> Self {
        SpecItem::Inline(func)
    }
}

// Configuration files can only express the string forms.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpec {
    Text(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for PipelineSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawSpec::deserialize(deserializer)? {
            RawSpec::Text(text) => PipelineSpec::Text(text),
            RawSpec::List(names) => PipelineSpec::from(names),
        })
    }
}
