use thiserror::Error;

/// The unified error type for fieldmap.
#[derive(Debug, Error)]
pub enum FieldmapError {
    /// A path expression failed to parse. `offset` is the byte offset of the
    /// offending character within `input`, or `input.len()` when the input
    /// ended too early.
    #[error("Path error: {message} at offset {offset}")]
    Parse {
        message: String,
        offset: usize,
        input: String,
    },

    #[error("Rule error: rule {index}: {message}")]
    Rule { index: usize, message: String },

    #[error("Conversion error: {name}: {message}")]
    Convert { name: String, message: String },

    #[error("Format error: {message}")]
    Format {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI error: {0}")]
    Cli(String),
}

/// A convenience result type for fieldmap.
pub type Result<T> = std::result::Result<T, FieldmapError>;

// ---------------------------------------------------------------------------
// From conversions for format-specific crate errors
// ---------------------------------------------------------------------------

impl From<serde_json::Error> for FieldmapError {
    fn from(err: serde_json::Error) -> Self {
        FieldmapError::Format {
            message: err.to_string(),
            line: Some(err.line()),
            column: Some(err.column()),
        }
    }
}

impl From<serde_yaml::Error> for FieldmapError {
    fn from(err: serde_yaml::Error) -> Self {
        let location = err.location();
        FieldmapError::Format {
            message: err.to_string(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
        }
    }
}

impl From<toml::de::Error> for FieldmapError {
    fn from(err: toml::de::Error) -> Self {
        FieldmapError::Format {
            message: err.message().to_string(),
            line: None,
            column: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Helper constructors
// ---------------------------------------------------------------------------

impl FieldmapError {
    /// Create a `Parse` error positioned at `offset` within `input`.
    pub fn parse_at(msg: impl Into<String>, input: &str, offset: usize) -> Self {
        FieldmapError::Parse {
            message: msg.into(),
            offset,
            input: input.to_string(),
        }
    }

    /// Create a `Rule` error for the rule at `index`.
    pub fn rule(index: usize, msg: impl Into<String>) -> Self {
        FieldmapError::Rule {
            index,
            message: msg.into(),
        }
    }

    /// Create a `Convert` error from a failed transform or format callback.
    pub fn convert(name: impl Into<String>, err: &anyhow::Error) -> Self {
        FieldmapError::Convert {
            name: name.into(),
            message: format!("{err:#}"),
        }
    }

    /// Create a `Format` error with just a message.
    pub fn format(msg: impl Into<String>) -> Self {
        FieldmapError::Format {
            message: msg.into(),
            line: None,
            column: None,
        }
    }

    /// Create a `Cli` error.
    pub fn cli(msg: impl Into<String>) -> Self {
        FieldmapError::Cli(msg.into())
    }

    /// The byte offset of a parse error, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            FieldmapError::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

/// Deterministic exit codes for each error category.
///
/// | Code | Category      | Description                                   |
/// |------|---------------|-----------------------------------------------|
/// |  0   | Success       | No error                                      |
/// |  2   | CLI / usage   | Invalid arguments, unknown formats            |
/// |  3   | I/O           | File not found, permission denied, etc.       |
/// |  4   | Format        | Malformed document or plan file               |
/// |  5   | Path          | A path expression failed to parse             |
/// |  6   | Rule          | A mapping rule is malformed                   |
/// |  7   | Conversion    | A transform or format converter failed        |
pub mod exit_code {
    pub const CLI: i32 = 2;
    pub const IO: i32 = 3;
    pub const FORMAT: i32 = 4;
    pub const PATH: i32 = 5;
    pub const RULE: i32 = 6;
    pub const CONVERT: i32 = 7;
}

impl FieldmapError {
    /// Return the deterministic exit code for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            FieldmapError::Cli(_) => exit_code::CLI,
            FieldmapError::Io(_) => exit_code::IO,
            FieldmapError::Format { .. } => exit_code::FORMAT,
            FieldmapError::Parse { .. } => exit_code::PATH,
            FieldmapError::Rule { .. } => exit_code::RULE,
            FieldmapError::Convert { .. } => exit_code::CONVERT,
        }
    }
}

// ---------------------------------------------------------------------------
// Pretty error formatting
// ---------------------------------------------------------------------------

impl FieldmapError {
    /// Format this error for human-friendly display on stderr.
    ///
    /// Path errors quote the expression with a caret under the offending
    /// byte.
    pub fn pretty_print(&self) -> String {
        match self {
            FieldmapError::Parse {
                message,
                offset,
                input,
            } => {
                let mut out = format!("error: {message}");
                out.push('\n');
                out.push_str(&format_caret_snippet(input, *offset));
                out
            }
            FieldmapError::Format {
                message,
                line,
                column,
            } => {
                let mut out = format!("error: {message}");
                if let (Some(l), Some(c)) = (line, column) {
                    out.push_str(&format!("\n  --> line {l}, column {c}"));
                } else if let Some(l) = line {
                    out.push_str(&format!("\n  --> line {l}"));
                }
                out
            }
            FieldmapError::Rule { index, message } => {
                format!("error: rule {index}: {message}")
            }
            FieldmapError::Convert { name, message } => {
                format!("error: conversion '{name}' failed: {message}")
            }
            FieldmapError::Io(err) => format!("error: {err}"),
            FieldmapError::Cli(msg) => format!("error: {msg}"),
        }
    }
}

/// Quote a single-line path expression with a caret under byte `offset`.
///
/// The caret column counts characters, so multi-byte identifiers still line
/// up in a terminal.
fn format_caret_snippet(source: &str, offset: usize) -> String {
    let offset = offset.min(source.len());
    let col = source
        .char_indices()
        .take_while(|(i, _)| *i < offset)
        .count();
    format!("  | {source}\n  | {:>col$}^", "", col = col)
}

// ---------------------------------------------------------------------------
// "Did you mean?" suggestions
// ---------------------------------------------------------------------------

/// Levenshtein distance over chars, one DP row at a time.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// The candidate closest to `input`, ignoring case, if it is within
/// `max_dist` edits. Ties go to the earlier candidate.
pub fn suggest_closest(input: &str, candidates: &[&str], max_dist: usize) -> Option<String> {
    let input = input.to_lowercase();
    candidates
        .iter()
        .map(|c| (edit_distance(&input, &c.to_lowercase()), *c))
        .filter(|(dist, _)| *dist <= max_dist)
        .min_by_key(|(dist, _)| *dist)
        .map(|(_, c)| c.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn display_parse_error() {
        let err = FieldmapError::parse_at("expected ']', found end of input", "a[1", 3);
        assert_eq!(
            err.to_string(),
            "Path error: expected ']', found end of input at offset 3"
        );
        assert_eq!(err.offset(), Some(3));
    }

    #[test]
    fn display_rule_error() {
        let err = FieldmapError::rule(2, "no left value");
        assert_eq!(err.to_string(), "Rule error: rule 2: no left value");
    }

    #[test]
    fn display_convert_error() {
        let cause = anyhow::anyhow!("not a number");
        let err = FieldmapError::convert("string", &cause);
        assert_eq!(err.to_string(), "Conversion error: string: not a number");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FieldmapError = io_err.into();
        assert_eq!(err.to_string(), "I/O error: file not found");
        assert!(err.source().is_some());
    }

    #[test]
    fn from_serde_json_error_keeps_location() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: FieldmapError = json_err.into();
        match err {
            FieldmapError::Format { line, column, .. } => {
                assert_eq!(line, Some(1));
                assert!(column.is_some());
            }
            other => panic!("expected Format variant, got {other:?}"),
        }
    }

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            FieldmapError::cli("x"),
            FieldmapError::Io(std::io::Error::other("x")),
            FieldmapError::format("x"),
            FieldmapError::parse_at("x", "", 0),
            FieldmapError::rule(0, "x"),
            FieldmapError::Convert {
                name: "x".into(),
                message: "x".into(),
            },
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes, vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn pretty_print_points_at_offset() {
        let err = FieldmapError::parse_at("expected digit, found 'x'", "a[x]", 2);
        assert_eq!(
            err.pretty_print(),
            "error: expected digit, found 'x'\n  | a[x]\n  |   ^"
        );
    }

    #[test]
    fn suggests_near_names() {
        let known = ["json", "yaml", "toml"];
        assert_eq!(suggest_closest("jsn", &known, 2), Some("json".into()));
        assert_eq!(suggest_closest("YAML", &known, 0), Some("yaml".into()));
        assert_eq!(suggest_closest("csv", &known, 2), None);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn pretty_print_points_past_end() {
        let err = FieldmapError::parse_at("expected ']', found end of input", "a[1", 3);
        assert_eq!(
            err.pretty_print(),
            "error: expected ']', found end of input\n  | a[1\n  |    ^"
        );
    }
}
