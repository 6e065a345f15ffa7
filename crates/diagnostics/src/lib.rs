//! Diagnostics for cmdgraph.
//!
//! Provides [`StringRange`], the half-open slice type used for matched nodes,
//! parsed arguments and suggestion replacements, and [`SyntaxError`], the one
//! error kind raised by the reader, the node graph, the dispatcher and command
//! handlers. Error codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Error code constants.
pub mod codes;
mod error;

pub use error::{ErrorKind, SyntaxError, ValueKind};

use serde::{Deserialize, Serialize};

// ── StringRange ─────────────────────────────────────────────────────────

/// Half-open byte range `[start, end)` over a command input string.
///
/// Invariant: `start <= end`. Offsets are UTF-8 byte offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringRange {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl StringRange {
    /// Create a range covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "StringRange end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width range at the given position.
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest range covering both `a` and `b`.
    pub fn encompassing(a: StringRange, b: StringRange) -> Self {
        Self {
            start: a.start.min(b.start),
            end: a.end.max(b.end),
        }
    }

    /// The slice of `input` covered by this range, or `""` if it does not
    /// fall on valid boundaries of `input`.
    pub fn get<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start..self.end).unwrap_or("")
    }

    /// Whether the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }
}

impl std::fmt::Display for StringRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ── Explanations ────────────────────────────────────────────────────────

/// Returns a one-line explanation for an error code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    let text = match id {
        codes::READER_EXPECTED_START_OF_QUOTE => {
            "A quoted string was required here; start it with \" or '."
        }
        codes::READER_EXPECTED_END_OF_QUOTE => {
            "A quoted string reached the end of the input without its closing quote."
        }
        codes::READER_INVALID_ESCAPE => {
            "Inside quotes a backslash may only escape the quote character or another backslash."
        }
        codes::READER_INVALID_VALUE => {
            "The token could not be converted to the type this argument expects."
        }
        codes::READER_EXPECTED_VALUE => "This argument needs a value but the input ended or held no token.",
        codes::READER_EXPECTED_SYMBOL => "A specific separator character was required at this position.",
        codes::ARGUMENT_TOO_SMALL => "The number is below the minimum this argument accepts.",
        codes::ARGUMENT_TOO_BIG => "The number is above the maximum this argument accepts.",
        codes::LITERAL_INCORRECT => "The token does not match the keyword expected at this position.",
        codes::NO_SUCH_ARGUMENT => {
            "The command handler looked up an argument that was not part of the parsed input."
        }
        codes::ARGUMENT_TYPE_MISMATCH => {
            "The command handler looked up an argument using a different type than it was parsed as."
        }
        codes::DISPATCHER_UNKNOWN_COMMAND => "No registered command matches the input.",
        codes::DISPATCHER_UNKNOWN_ARGUMENT => {
            "The start of the input matched a command but the remaining tokens did not."
        }
        codes::DISPATCHER_EXPECTED_SEPARATOR => {
            "Each token must be followed by a space or the end of the input."
        }
        codes::DISPATCHER_PARSE_FAILURE => "A command node failed to parse its token.",
        codes::COMMAND_FAILED => "The command handler or redirect modifier reported a failure.",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── StringRange ─────────────────────────────────────────────────────

    #[test]
    fn range_new_valid() {
        let r = StringRange::new(5, 10);
        assert_eq!(r.start, 5);
        assert_eq!(r.end, 10);
        assert_eq!(r.len(), 5);
        assert!(!r.is_empty());
    }

    #[test]
    fn range_at_is_empty() {
        let r = StringRange::at(7);
        assert_eq!(r, StringRange::new(7, 7));
        assert!(r.is_empty());
    }

    #[test]
    #[should_panic(expected = "StringRange end (3) < start (5)")]
    fn range_new_inverted_panics() {
        StringRange::new(5, 3);
    }

    #[test]
    fn range_encompassing() {
        let r = StringRange::encompassing(StringRange::new(4, 6), StringRange::new(1, 5));
        assert_eq!(r, StringRange::new(1, 6));
    }

    #[test]
    fn range_get_slices_input() {
        assert_eq!(StringRange::new(4, 7).get("foo bar baz"), "bar");
        assert_eq!(StringRange::new(4, 40).get("foo"), "");
    }

    #[test]
    fn range_display() {
        assert_eq!(StringRange::new(1, 3).to_string(), "[1, 3)");
    }

    // ── explain() exhaustiveness ────────────────────────────────────────

    #[test]
    fn all_codes_have_explanations() {
        for code in codes::ALL {
            assert!(
                explain(code).is_some(),
                "error code {code} has no explain() entry"
            );
        }
    }

    #[test]
    fn explain_unknown() {
        assert!(explain("UNKNOWN_CODE").is_none());
    }

    #[test]
    fn codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in codes::ALL {
            assert!(seen.insert(*code), "duplicate code {code}");
        }
    }
}
