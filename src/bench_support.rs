use std::sync::Arc;

use input_sanitizer::{PipelineSpec, PipelineSpecs, Sanitizer, SpecItem, TransformRegistry};
use serde_json::{json, Map, Value};
use tracing::debug;

// Re-export external crates needed by benches
pub use input_sanitizer;
pub use serde_json;
pub use tracing_subscriber;

/// A sanitizer plus a realistic form submission and its pipelines.
pub struct PipelineBenchFixture {
    pub sanitizer: Sanitizer,
    pub inputs: Map<String, Value>,
    pub specs: PipelineSpecs,
}

impl PipelineBenchFixture {
    /// Registration-form style payload: a handful of text, numeric and date
    /// fields, each with a two to four step pipeline.
    pub fn signup_form() -> Self {
        let inputs = object(json!({
            "first_name": "  aDA ",
            "last_name": " lovelace  ",
            "email": "  Ada.Lovelace@Example.COM ",
            "phone": "+44 (20) 7946-0958",
            "age": " 36 ",
            "newsletter": "yes",
            "born": "1815-12-10",
            "bio": "<p>First   <b>programmer</b>, analyst   and   mathematician.</p>",
            "card": "4111 1111 1111 1111",
            "balance": "1234567.891",
            "tags": ["  Math ", "ENGINES ", " poetry"]
        }));

        let specs = specs(vec![
            ("first_name", "trim|capitalize".into()),
            ("last_name", "trim|ucfirst".into()),
            ("email", "trim|lower".into()),
            ("phone", "digits".into()),
            ("age", "trim|int".into()),
            ("newsletter", "bool".into()),
            ("born", "date:F j, Y".into()),
            ("bio", "strip_tags|squish|limit:40".into()),
            ("card", "digits|mask:*,0,12".into()),
            ("balance", "number_format:2".into()),
            ("tags", vec!["trim", "lower", "slug"].into()),
        ]);

        Self::new(inputs, specs)
    }

    /// `fields` string fields sharing one pipeline string.
    pub fn wide_form(fields: usize, pipeline: &str) -> Self {
        let inputs = (0..fields)
            .map(|idx| (format!("field_{idx}"), json!(format!("  Value Number {idx}  "))))
            .collect();
        let specs = (0..fields)
            .map(|idx| (format!("field_{idx}"), PipelineSpec::from(pipeline)))
            .collect();

        Self::new(inputs, specs)
    }

    /// Single field whose pipeline is one inline closure.
    pub fn inline_only() -> Self {
        let inputs = object(json!({"score": 41}));
        let specs = specs(vec![(
            "score",
            vec![SpecItem::inline(|value| {
                json!(value.as_i64().unwrap_or_default() + 1)
            })]
            .into(),
        )]);

        Self::new(inputs, specs)
    }

    fn new(inputs: Map<String, Value>, specs: PipelineSpecs) -> Self {
        debug!(
            fields = inputs.len(),
            pipelines = specs.len(),
            "bench fixture created"
        );
        Self {
            sanitizer: Sanitizer::new(Arc::new(TransformRegistry::with_builtins())),
            inputs,
            specs,
        }
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn specs(entries: Vec<(&str, PipelineSpec)>) -> PipelineSpecs {
    entries
        .into_iter()
        .map(|(key, spec)| (key.to_string(), spec))
        .collect()
}
