use crate::spec::{PipelineSpec, PipelineStep, SpecItem};
use nom::{
    bytes::complete::take_till,
    character::complete::char,
    combinator::{opt, rest},
    error::VerboseError,
    sequence::{pair, preceded},
    IResult,
};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

pub const STEP_DELIMITER: char = '|';
pub const ARGS_DELIMITER: char = ':';
pub const ARG_SEPARATOR: char = ',';

/// Normalizes a pipeline specification into ordered executable steps.
///
/// A text spec is split on `|` first; afterwards both shapes go through the
/// same per-token handling. Parsing never fails: blank tokens are dropped and
/// a token without `:` yields a step with no arguments.
pub fn parse(spec: &PipelineSpec) -> Vec<PipelineStep> {
    match spec {
        PipelineSpec::Text(text) => split_steps(text).filter_map(parse_token).collect(),
        PipelineSpec::Steps(items) => items.iter().filter_map(parse_item).collect(),
    }
}

/// Shorthand for parsing a pipe-delimited string.
pub fn parse_str(spec: &str) -> Vec<PipelineStep> {
    split_steps(spec).filter_map(parse_token).collect()
}

fn split_steps(text: &str) -> impl Iterator<Item = &str> {
    text.trim().split(STEP_DELIMITER)
}

fn parse_item(item: &SpecItem) -> Option<PipelineStep> {
    match item {
        SpecItem::Name(token) => parse_token(token),
        SpecItem::Inline(func) => Some(PipelineStep::Inline(func.clone())),
    }
}

/// Parses a single `name[:arg,arg,...]` token.
pub fn parse_token(token: &str) -> Option<PipelineStep> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    let (name, raw_args) = token_parser(token)
        .map(|(_, parsed)| parsed)
        .unwrap_or((token, None));

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(PipelineStep::named(
        name,
        raw_args.map(split_args).unwrap_or_default(),
    ))
}

/// Splits a token on its first colon. Everything after it, including further
/// colons, belongs to the argument list.
pub fn token_parser(input: &str) -> Res<'_, (&str, Option<&str>)> {
    pair(
        take_till(|c| c == ARGS_DELIMITER),
        opt(preceded(char(ARGS_DELIMITER), rest)),
    )(input)
}

fn split_args(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.split(ARG_SEPARATOR)
        .map(|arg| arg.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(step: &PipelineStep) -> (&str, Vec<&str>) {
        match step {
            PipelineStep::Named { name, args } => {
                (name.as_str(), args.iter().map(String::as_str).collect())
            }
            PipelineStep::Inline(_) => panic!("Expected Named step"),
        }
    }

    #[test]
    fn test_token_parser_splits_on_first_colon() {
        let (remaining, (name, args)) = token_parser("date:H:i").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(name, "date");
        assert_eq!(args, Some("H:i"));
    }

    #[test]
    fn test_token_parser_without_args() {
        let (_, (name, args)) = token_parser("trim").unwrap();
        assert_eq!(name, "trim");
        assert_eq!(args, None);
    }

    #[test]
    fn test_parse_token_trims_args() {
        let step = parse_token(" mask : # , 2 , 4 ").unwrap();
        assert_eq!(named(&step), ("mask", vec!["#", "2", "4"]));
    }

    #[test]
    fn test_parse_token_empty_args() {
        let step = parse_token("limit:").unwrap();
        assert_eq!(named(&step), ("limit", vec![]));
    }

    #[test]
    fn test_parse_token_blank() {
        assert!(parse_token("   ").is_none());
        assert!(parse_token(":orphan").is_none());
    }

    #[test]
    fn test_parse_str_skips_blank_tokens() {
        let steps = parse_str("trim||lower|");
        let names: Vec<_> = steps.iter().filter_map(PipelineStep::name).collect();
        assert_eq!(names, vec!["trim", "lower"]);
    }
}
