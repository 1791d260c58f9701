//! Runtime configuration values.
//!
//! Only parsing lives here. The ABI crate resolves the environment once per
//! process without allocating and feeds the raw value through these parsers.

use serde::{Deserialize, Serialize};

/// Selects the abort diagnostic format.
pub const ENV_KEY: &str = "FORTIFY_DIAGNOSTICS";

/// When set to a truthy value, property-hook rewrites are traced to stderr.
pub const TRACE_ENV_KEY: &str = "FORTIFY_TRACE";

/// Format of the line written to stderr before aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticFormat {
    /// `FORTIFY: <symbol>: <reason>`
    #[default]
    Text,
    /// One JSON object per line.
    Jsonl,
}

impl DiagnosticFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        }
    }
}

/// Accepted spellings for [`DiagnosticFormat::Jsonl`].
pub const JSONL_ALIASES: [&str; 3] = ["jsonl", "json", "structured"];

/// Accepted spellings for an enabled trace flag.
pub const TRACE_ON_ALIASES: [&str; 4] = ["1", "true", "on", "yes"];

/// Parse a `FORTIFY_DIAGNOSTICS` value.
///
/// Matching is ASCII case-insensitive. Anything unrecognized selects text.
#[must_use]
pub fn parse_format(raw: &str) -> DiagnosticFormat {
    let raw = raw.trim();
    if JSONL_ALIASES.iter().any(|a| raw.eq_ignore_ascii_case(a)) {
        DiagnosticFormat::Jsonl
    } else {
        DiagnosticFormat::Text
    }
}

/// Parse a `FORTIFY_TRACE` value.
#[must_use]
pub fn parse_trace(raw: &str) -> bool {
    let raw = raw.trim();
    TRACE_ON_ALIASES.iter().any(|a| raw.eq_ignore_ascii_case(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jsonl_aliases_are_case_insensitive() {
        for raw in ["jsonl", "JSON", "Structured", " jsonl "] {
            assert_eq!(parse_format(raw), DiagnosticFormat::Jsonl, "{raw:?}");
        }
    }

    #[test]
    fn unknown_values_fall_back_to_text() {
        for raw in ["", "text", "yaml", "jsonlines"] {
            assert_eq!(parse_format(raw), DiagnosticFormat::Text, "{raw:?}");
        }
        assert_eq!(DiagnosticFormat::default(), DiagnosticFormat::Text);
    }

    #[test]
    fn trace_flag_parsing() {
        assert!(parse_trace("1"));
        assert!(parse_trace("TRUE"));
        assert!(!parse_trace("0"));
        assert!(!parse_trace(""));
    }
}
