//! The syntax error type shared by the reader, the node graph and the dispatcher.

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::codes;

/// Number of characters shown before the cursor in a rendered error.
const CONTEXT_AMOUNT: usize = 10;

/// The primitive type a reader or value parser was trying to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `true` or `false`.
    Bool,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
}

impl ValueKind {
    /// Capitalised name used at the start of range messages.
    pub fn title(self) -> &'static str {
        match self {
            ValueKind::Bool => "Bool",
            ValueKind::Integer => "Integer",
            ValueKind::Long => "Long",
            ValueKind::Float => "Float",
            ValueKind::Double => "Double",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Long => write!(f, "long"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Double => write!(f, "double"),
        }
    }
}

fn invalid_value_message(kind: &ValueKind, value: &str) -> String {
    match kind {
        ValueKind::Bool => format!("Invalid bool, expected true or false but found '{value}'"),
        other => format!("Invalid {other} '{value}'"),
    }
}

/// Symbolic reason for a [`SyntaxError`].
///
/// The `Display` impl produces the bare message without cursor context;
/// [`SyntaxError`] adds the position and a snippet of the input.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ErrorKind {
    // -- Numeric bounds --
    /// A numeric value was below the argument's minimum.
    #[error("{} must not be less than {min}, found {found}", .kind.title())]
    TooSmall {
        /// Numeric type of the argument.
        kind: ValueKind,
        /// The value that was parsed.
        found: String,
        /// The inclusive lower bound.
        min: String,
    },

    /// A numeric value was above the argument's maximum.
    #[error("{} must not be more than {max}, found {found}", .kind.title())]
    TooBig {
        /// Numeric type of the argument.
        kind: ValueKind,
        /// The value that was parsed.
        found: String,
        /// The inclusive upper bound.
        max: String,
    },

    // -- Literals --
    /// The token at the cursor is not the expected literal.
    #[error("Expected literal {expected}")]
    LiteralIncorrect {
        /// The literal the node matches.
        expected: String,
    },

    // -- Reader --
    /// A quoted string was expected.
    #[error("Expected quote to start a string")]
    ExpectedStartOfQuote,

    /// A quoted string was never closed.
    #[error("Unclosed quoted string")]
    ExpectedEndOfQuote,

    /// A backslash escaped an unsupported character.
    #[error("Invalid escape sequence '{character}' in quoted string")]
    InvalidEscape {
        /// The escaped character.
        character: char,
    },

    /// A token could not be converted to the requested type.
    #[error("{}", invalid_value_message(.kind, .value))]
    InvalidValue {
        /// The requested type.
        kind: ValueKind,
        /// The offending token text.
        value: String,
    },

    /// No token was present where a typed value was expected.
    #[error("Expected {kind}")]
    ExpectedValue {
        /// The requested type.
        kind: ValueKind,
    },

    /// A specific character was expected at the cursor.
    #[error("Expected '{symbol}'")]
    ExpectedSymbol {
        /// The expected character.
        symbol: char,
    },

    // -- Dispatcher --
    /// No node in the tree matched the input.
    #[error("Unknown command")]
    UnknownCommand,

    /// A prefix matched but trailing input was not consumed.
    #[error("Incorrect argument for command")]
    UnknownArgument,

    /// Two tokens were not separated by whitespace.
    #[error("Expected whitespace to end one argument, but found trailing data")]
    ExpectedSeparator,

    /// Generic wrapper for a node parse failure.
    #[error("Could not parse command: {message}")]
    ParseFailure {
        /// Description of the underlying failure.
        message: String,
    },

    // -- Context lookups --
    /// A handler requested an argument that is not present.
    #[error("No such argument '{name}' exists on this command")]
    NoSuchArgument {
        /// The requested argument name.
        name: String,
    },

    /// A handler requested an argument as the wrong type.
    #[error("Argument '{name}' is not of type {expected}")]
    ArgumentTypeMismatch {
        /// The requested argument name.
        name: String,
        /// The Rust type name that was requested.
        expected: String,
    },

    // -- Handlers --
    /// A handler or modifier failed with its own message.
    #[error("{message}")]
    Custom {
        /// Handler-supplied message.
        message: String,
    },
}

impl ErrorKind {
    /// Stable code for this kind (see [`codes`]).
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::TooSmall { .. } => codes::ARGUMENT_TOO_SMALL,
            ErrorKind::TooBig { .. } => codes::ARGUMENT_TOO_BIG,
            ErrorKind::LiteralIncorrect { .. } => codes::LITERAL_INCORRECT,
            ErrorKind::ExpectedStartOfQuote => codes::READER_EXPECTED_START_OF_QUOTE,
            ErrorKind::ExpectedEndOfQuote => codes::READER_EXPECTED_END_OF_QUOTE,
            ErrorKind::InvalidEscape { .. } => codes::READER_INVALID_ESCAPE,
            ErrorKind::InvalidValue { .. } => codes::READER_INVALID_VALUE,
            ErrorKind::ExpectedValue { .. } => codes::READER_EXPECTED_VALUE,
            ErrorKind::ExpectedSymbol { .. } => codes::READER_EXPECTED_SYMBOL,
            ErrorKind::UnknownCommand => codes::DISPATCHER_UNKNOWN_COMMAND,
            ErrorKind::UnknownArgument => codes::DISPATCHER_UNKNOWN_ARGUMENT,
            ErrorKind::ExpectedSeparator => codes::DISPATCHER_EXPECTED_SEPARATOR,
            ErrorKind::ParseFailure { .. } => codes::DISPATCHER_PARSE_FAILURE,
            ErrorKind::NoSuchArgument { .. } => codes::NO_SUCH_ARGUMENT,
            ErrorKind::ArgumentTypeMismatch { .. } => codes::ARGUMENT_TYPE_MISMATCH,
            ErrorKind::Custom { .. } => codes::COMMAND_FAILED,
        }
    }

    /// Attach the input and cursor this error refers to.
    pub fn at(self, input: impl Into<Arc<str>>, cursor: usize) -> SyntaxError {
        SyntaxError::with_context(self, input, cursor)
    }
}

/// The single error type raised while reading, parsing, or executing a command.
///
/// Carries a symbolic [`ErrorKind`], and optionally the input it was raised
/// against together with a byte cursor. When both are present the rendered
/// message ends with a short snippet of the input up to the cursor:
///
/// ```
/// use cmdgraph_diagnostics::{ErrorKind, SyntaxError};
///
/// let err = ErrorKind::UnknownCommand.at("foo bar", 4);
/// assert_eq!(err.to_string(), "Unknown command at position 4: foo <--[HERE]");
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}{}", self.position_suffix())]
pub struct SyntaxError {
    kind: ErrorKind,
    input: Option<Arc<str>>,
    cursor: Option<usize>,
}

impl SyntaxError {
    /// An error with no positional context.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            input: None,
            cursor: None,
        }
    }

    /// An error pointing at `cursor` within `input`.
    ///
    /// `input` is shared, so errors raised by one reader do not copy it.
    pub fn with_context(kind: ErrorKind, input: impl Into<Arc<str>>, cursor: usize) -> Self {
        Self {
            kind,
            input: Some(input.into()),
            cursor: Some(cursor),
        }
    }

    /// Shorthand for a handler-defined failure.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom {
            message: message.into(),
        })
    }

    /// The symbolic reason.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Stable error code.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// The input this error was raised against, if known.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Byte offset into [`input`](Self::input), if known.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The message without position or snippet.
    pub fn raw_message(&self) -> String {
        self.kind.to_string()
    }

    /// Up to ten characters of input preceding the cursor, followed by a marker.
    ///
    /// Returns `None` when the error carries no input or cursor.
    pub fn context(&self) -> Option<String> {
        let input = self.input.as_deref()?;
        let cursor = self.cursor?.min(input.len());
        let before = input.get(..cursor)?;
        let count = before.chars().count();

        let mut out = String::new();
        if count > CONTEXT_AMOUNT {
            out.push_str("...");
        }
        out.extend(before.chars().skip(count.saturating_sub(CONTEXT_AMOUNT)));
        out.push_str("<--[HERE]");
        Some(out)
    }
}

impl SyntaxError {
    fn position_suffix(&self) -> String {
        match (self.context(), self.cursor) {
            (Some(context), Some(cursor)) => format!(" at position {cursor}: {context}"),
            _ => String::new(),
        }
    }
}

impl From<ErrorKind> for SyntaxError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl Serialize for SyntaxError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("SyntaxError", 5)?;
        s.serialize_field("code", self.code())?;
        s.serialize_field("message", &self.raw_message())?;
        s.serialize_field("kind", &self.kind)?;
        if let Some(input) = &self.input {
            s.serialize_field("input", &**input)?;
        } else {
            s.skip_field("input")?;
        }
        if let Some(cursor) = self.cursor {
            s.serialize_field("cursor", &cursor)?;
        } else {
            s.skip_field("cursor")?;
        }
        s.end()
    }
}
