use cmdgraph_diagnostics::SyntaxError;

use super::ArgumentType;
use crate::reader::{StringReader, escape_if_required};

/// How much input a [`StringArgumentType`] consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// One unquoted word.
    SingleWord,
    /// A word, or a quoted phrase.
    QuotablePhrase,
    /// Everything up to the end of the input.
    GreedyPhrase,
}

/// Parses a string token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringArgumentType {
    kind: StringKind,
}

/// A single unquoted word.
pub fn word() -> StringArgumentType {
    StringArgumentType {
        kind: StringKind::SingleWord,
    }
}

/// A word or a quoted phrase.
pub fn string() -> StringArgumentType {
    StringArgumentType {
        kind: StringKind::QuotablePhrase,
    }
}

/// The remainder of the input.
pub fn greedy_string() -> StringArgumentType {
    StringArgumentType {
        kind: StringKind::GreedyPhrase,
    }
}

impl StringArgumentType {
    /// The consumption mode.
    pub fn kind(&self) -> StringKind {
        self.kind
    }

    /// Render `value` so that this type would parse it back.
    pub fn quote(&self, value: &str) -> String {
        match self.kind {
            StringKind::QuotablePhrase => escape_if_required(value),
            StringKind::SingleWord | StringKind::GreedyPhrase => value.to_owned(),
        }
    }
}

impl<S> ArgumentType<S> for StringArgumentType {
    type Value = String;

    fn parse(&self, reader: &mut StringReader) -> Result<String, SyntaxError> {
        match self.kind {
            StringKind::SingleWord => Ok(reader.read_unquoted_string()),
            StringKind::QuotablePhrase => reader.read_string(),
            StringKind::GreedyPhrase => {
                let text = reader.remaining().to_owned();
                reader.set_cursor(reader.total_len());
                Ok(text)
            }
        }
    }

    fn examples(&self) -> Vec<String> {
        let examples: &[&str] = match self.kind {
            StringKind::SingleWord => &["word", "words_with_underscores"],
            StringKind::QuotablePhrase => &["\"quoted phrase\"", "word", "\"\""],
            StringKind::GreedyPhrase => &["word", "words with spaces", "\"and symbols\""],
        };
        examples.iter().map(|s| (*s).to_owned()).collect()
    }
}
