//! File name templates for downloaded images
//!
//! A template is plain text with `{variable}` placeholders drawn from a
//! fixed set: `imageId`, `fileExtension`, `timestamp` and `index`. Names are
//! matched case-insensitively. Validation is pure; expansion sanitizes the
//! result so it is safe to use as a single path component.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::utils::DEFAULT_FILENAME_TEMPLATE;

/// Variables a template may reference
pub const SUPPORTED_VARIABLES: [&str; 4] = ["imageId", "fileExtension", "timestamp", "index"];

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is a valid regex"));

static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|]"#).expect("illegal char pattern is a valid regex"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is a valid regex"));

static UNDERSCORE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{2,}").expect("underscore pattern is a valid regex"));

/// Why a template was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template cannot be empty")]
    Empty,

    #[error("template braces are unbalanced ({open} '{{' vs {close} '}}')")]
    UnbalancedBraces { open: usize, close: usize },

    #[error("unsupported variable: {name}. Supported variables: imageId, fileExtension, timestamp, index")]
    UnsupportedVariable { name: String },
}

fn is_supported(name: &str) -> bool {
    SUPPORTED_VARIABLES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(name))
}

/// Check a template without expanding it
///
/// Fails when the template is empty, when `{` and `}` counts differ, or when
/// a `{name}` placeholder names an unsupported variable.
pub fn validate_template(template: &str) -> Result<(), TemplateError> {
    if template.is_empty() {
        return Err(TemplateError::Empty);
    }

    let open = template.matches('{').count();
    let close = template.matches('}').count();
    if open != close {
        return Err(TemplateError::UnbalancedBraces { open, close });
    }

    for caps in PLACEHOLDER.captures_iter(template) {
        let name = &caps[1];
        if !is_supported(name) {
            return Err(TemplateError::UnsupportedVariable {
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

/// Values substituted into a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    pub image_id: String,
    pub file_extension: String,
    pub timestamp: Option<String>,
    pub index: Option<usize>,
}

impl TemplateVars {
    #[must_use]
    pub fn new(image_id: impl Into<String>, file_extension: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            file_extension: file_extension.into(),
            timestamp: None,
            index: None,
        }
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if name.eq_ignore_ascii_case("imageId") {
            Some(self.image_id.clone())
        } else if name.eq_ignore_ascii_case("fileExtension") {
            Some(self.file_extension.clone())
        } else if name.eq_ignore_ascii_case("timestamp") {
            self.timestamp.clone()
        } else if name.eq_ignore_ascii_case("index") {
            self.index.map(|i| i.to_string())
        } else {
            None
        }
    }
}

/// Current UTC time as `YYYYMMDDHHMMSS`
#[must_use]
pub fn utc_timestamp() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S").to_string()
}

/// Make a string safe to use as a file name
///
/// Replaces `/ \ : * ? " < > |` with `_`, turns whitespace runs into a
/// single `_`, collapses repeated underscores, then trims.
#[must_use]
pub fn sanitize_file_name(file_name: &str) -> String {
    let replaced = ILLEGAL_CHARS.replace_all(file_name, "_");
    let replaced = WHITESPACE_RUN.replace_all(&replaced, "_");
    let replaced = UNDERSCORE_RUN.replace_all(&replaced, "_");
    replaced.trim().to_string()
}

/// Expand a template into a sanitized file name
///
/// A `{timestamp}` placeholder with no explicit timestamp gets the current
/// UTC time. Placeholders whose value is absent (an `{index}` outside a
/// batch) are left as written.
#[must_use]
pub fn generate_file_name(template: &str, vars: &TemplateVars) -> String {
    let mut vars = vars.clone();
    let wants_timestamp = PLACEHOLDER
        .captures_iter(template)
        .any(|caps| caps[1].eq_ignore_ascii_case("timestamp"));
    if wants_timestamp && vars.timestamp.is_none() {
        vars.timestamp = Some(utc_timestamp());
    }

    let expanded = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        vars.lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });

    sanitize_file_name(&expanded)
}

/// A template string that passed [`validate_template`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilenameTemplate(String);

impl FilenameTemplate {
    pub fn parse(template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        validate_template(&template)?;
        Ok(Self(template))
    }

    /// Parse `template`, falling back to the default when it is missing or invalid
    #[must_use]
    pub fn parse_or_default(template: Option<&str>) -> Self {
        match template.map(Self::parse) {
            Some(Ok(parsed)) => parsed,
            Some(Err(e)) => {
                tracing::warn!("Invalid filename template ({e}), using default template");
                Self::default()
            }
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn render(&self, vars: &TemplateVars) -> String {
        generate_file_name(&self.0, vars)
    }
}

impl Default for FilenameTemplate {
    fn default() -> Self {
        Self(DEFAULT_FILENAME_TEMPLATE.to_string())
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FilenameTemplate {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<FilenameTemplate> for String {
    fn from(template: FilenameTemplate) -> Self {
        template.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_runs() {
        assert_eq!(sanitize_file_name("a  b//c"), "a_b_c");
        assert_eq!(sanitize_file_name("what?*.jpg"), "what_.jpg");
    }

    #[test]
    fn unresolved_index_is_kept() {
        let name = generate_file_name("{imageId}_{index}.{fileExtension}", &TemplateVars::new("a", "png"));
        assert_eq!(name, "a_{index}.png");
    }

    #[test]
    fn timestamp_is_fourteen_digits() {
        let ts = utc_timestamp();
        assert_eq!(ts.len(), 14);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
    }
}
