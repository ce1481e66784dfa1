use std::io::{self, Read, Write};

use anyhow::{anyhow, Context, Result};
use input_sanitizer::{Sanitizer, TransformRegistry};
use serde_json::{Map, Value};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod pipelines;

use config::{CliConfig, InputSource};
use pipelines::PipelineFile;

fn main() -> Result<()> {
    let config = CliConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config);
    config.validate()?;

    let pipeline_file = PipelineFile::load(&config.pipelines_path)?;

    let registry = TransformRegistry::shared();
    pipeline_file.install_aliases(&registry)?;
    let sanitizer = Sanitizer::new(registry);
    sanitizer
        .validate(&pipeline_file.pipelines)
        .context("pipeline configuration is invalid")?;

    let inputs = read_inputs(&config.input)?;
    debug!(keys = inputs.len(), "input object read");

    let output = sanitizer
        .run(&inputs, &pipeline_file.pipelines)
        .context("sanitization failed")?;

    write_output(&output, config.pretty)?;
    info!(keys = output.len(), "sanitized object written");
    Ok(())
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| std::env::var("LOG_LEVEL").map(EnvFilter::new))
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn read_inputs(source: &InputSource) -> Result<Map<String, Value>> {
    let raw = match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read input from stdin")?;
            buffer
        }
        InputSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file '{}'", path.display()))?,
    };

    match serde_json::from_str::<Value>(&raw).context("input is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!(
            "input must be a JSON object, got {}",
            json_type_name(&other)
        )),
    }
}

fn write_output(output: &Map<String, Value>, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").context("failed to write output")?;
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
