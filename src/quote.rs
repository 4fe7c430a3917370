//! Identifier quoting
//!
//! Decides whether a database, retention-policy, measurement or column name
//! can be emitted as a bare token or needs double-quoting with escapes. This
//! mirrors InfluxQL's own quoting rules and is deliberately minimal: it is
//! not a general string-safety function.

use regex::Regex;
use std::sync::OnceLock;

static BARE_IDENTIFIER: OnceLock<Regex> = OnceLock::new();

fn bare_identifier() -> &'static Regex {
    BARE_IDENTIFIER.get_or_init(|| {
        Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("bare identifier pattern is valid")
    })
}

/// Return a query-safe version of an identifier.
///
/// The empty string passes through unchanged (emptiness is never quoted),
/// and so does anything matching the bare-identifier grammar
/// `[A-Za-z_][A-Za-z0-9_]*`. Everything else is wrapped in double quotes
/// with backslashes escaped before quotes - the reverse order would
/// double-escape the backslashes the first pass inserts.
pub fn quote(value: &str) -> String {
    if value.is_empty() || bare_identifier().is_match(value) {
        return value.to_string();
    }
    format!("\"{}\"", escape(value))
}

/// Quote unconditionally, with the same escape pass.
///
/// Statement source paths and administrative commands always emit quoted
/// names so a segment reads the same whether or not it happens to be bare.
pub(crate) fn quote_always(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_passes_through() {
        assert_eq!(quote(""), "");
    }

    #[test]
    fn test_bare_identifiers_unchanged() {
        for id in ["cpu", "_internal", "Db1", "a", "measurement_2"] {
            assert_eq!(quote(id), id);
        }
    }

    #[test]
    fn test_quoting_idempotent_on_bare() {
        let once = quote("cpu_load");
        assert_eq!(quote(&once), once);
        assert_eq!(once, "cpu_load");
    }

    #[test]
    fn test_leading_digit_needs_quoting() {
        assert_eq!(quote("1cpu"), "\"1cpu\"");
    }

    #[test]
    fn test_special_characters_quoted() {
        assert_eq!(quote("cpu load"), "\"cpu load\"");
        assert_eq!(quote("cpu-load"), "\"cpu-load\"");
    }

    #[test]
    fn test_backslash_escaped_before_quote() {
        // One backslash then one quote in the input
        assert_eq!(quote("a\\\"b"), "\"a\\\\\\\"b\"");
    }

    #[test]
    fn test_round_trip() {
        // Stripping outer quotes and reversing the escapes recovers the input
        let inputs = ["he said \"hi\"", "back\\slash", "\\\"mixed\\\""];
        for input in inputs {
            let quoted = quote(input);
            let inner = quoted
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap();
            let recovered = inner.replace("\\\"", "\"").replace("\\\\", "\\");
            assert_eq!(recovered, input);
        }
    }
}
