//! Lenient normalization of search tool arguments
//!
//! Some MCP clients send arguments as a JSON object, others as a string that
//! is almost JSON (backtick-quoted keys, single quotes, bare keys). Both are
//! reduced to a [`SearchArgs`] with defaults filled in.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::utils::constants::{DEFAULT_HEADLESS_MODE, DEFAULT_SEARCH_KEYWORD, DEFAULT_SEARCH_LIMIT};

static BARE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+):").expect("valid bare key regex"));

static KEYWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["`']?keyword["`']?\s*[:=]\s*["`']([^"`']+)["`']"#)
        .expect("valid keyword regex")
});

static LIMIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["`']?limit["`']?\s*[:=]\s*(\d+)"#).expect("valid limit regex")
});

/// Tool arguments as received from the client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawToolArgs {
    Object(Map<String, Value>),
    Text(String),
}

impl From<Map<String, Value>> for RawToolArgs {
    fn from(map: Map<String, Value>) -> Self {
        RawToolArgs::Object(map)
    }
}

impl From<String> for RawToolArgs {
    fn from(text: String) -> Self {
        RawToolArgs::Text(text)
    }
}

/// Normalized arguments for the search tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchArgs {
    pub keyword: String,
    pub limit: usize,
    pub headless: bool,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_SEARCH_KEYWORD.to_string(),
            limit: DEFAULT_SEARCH_LIMIT,
            headless: DEFAULT_HEADLESS_MODE,
        }
    }
}

/// Fields before defaults are applied
#[derive(Debug, Default)]
struct PartialArgs {
    keyword: Option<String>,
    limit: Option<i64>,
    headless: Option<bool>,
}

impl SearchArgs {
    /// Normalize raw arguments
    ///
    /// Empty keyword becomes `"landscape"`; a missing, unparseable or
    /// non-positive limit becomes 10; headless defaults to `true`.
    #[must_use]
    pub fn normalize(raw: RawToolArgs) -> Self {
        let partial = match raw {
            RawToolArgs::Object(map) => from_object(&map),
            RawToolArgs::Text(text) => from_text(&text),
        };

        let defaults = Self::default();
        let keyword = partial
            .keyword
            .filter(|k| !k.is_empty())
            .unwrap_or(defaults.keyword);
        let limit = partial
            .limit
            .filter(|l| *l > 0)
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(defaults.limit);
        let headless = partial.headless.unwrap_or(defaults.headless);

        Self {
            keyword,
            limit,
            headless,
        }
    }
}

fn from_object(map: &Map<String, Value>) -> PartialArgs {
    let keyword = match (map.get("keyword"), map.get("`keyword`")) {
        (Some(Value::String(k)), _) => Some(k.trim().to_string()),
        (_, Some(v)) => Some(value_to_string(v).trim().to_string()),
        _ => None,
    };

    let limit = map
        .get("limit")
        .and_then(limit_from_value)
        .or_else(|| map.get("`limit`").and_then(limit_from_value));

    let headless = match (map.get("headless"), map.get("`headless`")) {
        (Some(Value::Bool(b)), _) => Some(*b),
        (_, Some(v)) => Some(is_truthy(v)),
        _ => None,
    };

    PartialArgs {
        keyword,
        limit,
        headless,
    }
}

fn from_text(text: &str) -> PartialArgs {
    let text = text.replace('`', "\"");

    let parsed = serde_json::from_str::<Value>(&text).or_else(|_| {
        debug!("Standard JSON parse failed, trying to repair arguments");
        let repaired = text.replace('\'', "\"");
        let repaired = BARE_KEY.replace_all(&repaired, "\"$1\":");
        serde_json::from_str::<Value>(&repaired)
    });

    match parsed {
        Ok(Value::Object(map)) => PartialArgs {
            keyword: match map.get("keyword") {
                Some(Value::String(k)) => Some(k.trim().to_string()),
                _ => None,
            },
            limit: map.get("limit").and_then(limit_from_value),
            headless: map.get("headless").and_then(Value::as_bool),
        },
        Ok(_) => PartialArgs::default(),
        Err(_) => {
            debug!("Argument repair failed, recovering fields by pattern");
            PartialArgs {
                keyword: KEYWORD_PATTERN
                    .captures(&text)
                    .map(|c| c[1].trim().to_string()),
                limit: LIMIT_PATTERN
                    .captures(&text)
                    .and_then(|c| c[1].parse().ok()),
                headless: None,
            }
        }
    }
}

/// Numbers are truncated; strings contribute their leading integer
fn limit_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

/// Integer prefix of `s` after leading whitespace, like `"12px"` -> 12
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
