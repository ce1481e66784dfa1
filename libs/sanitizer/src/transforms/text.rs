//! String shaping transforms. Non-string values pass through unchanged;
//! arrays are mapped element-wise.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{arg, map_strings};

/// `trim[:chars]` strips surrounding whitespace, or any of `chars` when given.
pub fn trim(value: Value, args: &[String]) -> Value {
    match strip_set(args) {
        Some(set) => map_strings(value, &|s: &str| {
            s.trim_matches(|c: char| set.contains(&c)).to_string()
        }),
        None => map_strings(value, &|s: &str| s.trim().to_string()),
    }
}

pub fn ltrim(value: Value, args: &[String]) -> Value {
    match strip_set(args) {
        Some(set) => map_strings(value, &|s: &str| {
            s.trim_start_matches(|c: char| set.contains(&c)).to_string()
        }),
        None => map_strings(value, &|s: &str| s.trim_start().to_string()),
    }
}

pub fn rtrim(value: Value, args: &[String]) -> Value {
    match strip_set(args) {
        Some(set) => map_strings(value, &|s: &str| {
            s.trim_end_matches(|c: char| set.contains(&c)).to_string()
        }),
        None => map_strings(value, &|s: &str| s.trim_end().to_string()),
    }
}

fn strip_set(args: &[String]) -> Option<Vec<char>> {
    arg(args, 0)
        .filter(|chars| !chars.is_empty())
        .map(|chars| chars.chars().collect())
}

pub fn lower(value: Value, _args: &[String]) -> Value {
    map_strings(value, &str::to_lowercase)
}

pub fn upper(value: Value, _args: &[String]) -> Value {
    map_strings(value, &str::to_uppercase)
}

pub fn ucfirst(value: Value, _args: &[String]) -> Value {
    map_strings(value, &upper_first)
}

pub fn lcfirst(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| {
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    })
}

/// Upper-cases the first letter of every whitespace-separated word.
pub fn ucwords(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| {
        let mut out = String::with_capacity(s.len());
        let mut at_word_start = true;
        for c in s.chars() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = c.is_whitespace();
        }
        out
    })
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| upper_first(&s.to_lowercase()))
}

/// Trims and collapses inner whitespace runs into a single space.
pub fn squish(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| s.split_whitespace().collect::<Vec<_>>().join(" "))
}

pub fn strip_tags(value: Value, _args: &[String]) -> Value {
    static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = TAG_PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
    map_strings(value, &|s: &str| pattern.replace_all(s, "").into_owned())
}

/// HTML-escapes `&`, `<`, `>`, `"` and `'`.
pub fn escape(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#039;"),
                other => out.push(other),
            }
        }
        out
    })
}

pub fn digits(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| s.chars().filter(char::is_ascii_digit).collect())
}

pub fn alpha(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| s.chars().filter(|c| c.is_alphabetic()).collect())
}

pub fn alpha_num(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| s.chars().filter(|c| c.is_alphanumeric()).collect())
}

/// `slug[:separator]`, separator defaults to `-`.
pub fn slug(value: Value, args: &[String]) -> Value {
    let separator = arg(args, 0).filter(|sep| !sep.is_empty()).unwrap_or("-");
    map_strings(value, &|s: &str| words(&s.to_lowercase()).join(separator))
}

pub fn snake(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| words(s).join("_").to_lowercase())
}

pub fn kebab(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| words(s).join("-").to_lowercase())
}

pub fn camel(value: Value, _args: &[String]) -> Value {
    map_strings(value, &|s: &str| {
        words(s)
            .iter()
            .enumerate()
            .map(|(idx, word)| {
                let word = word.to_lowercase();
                if idx == 0 {
                    word
                } else {
                    upper_first(&word)
                }
            })
            .collect()
    })
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits on non-alphanumeric characters and on lower-to-upper case changes.
fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower_or_digit = false;

    for c in s.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower_or_digit = false;
            continue;
        }

        if c.is_uppercase() && prev_lower_or_digit && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev_lower_or_digit = c.is_lowercase() || c.is_numeric();
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
