//! Error code constants.
//!
//! Every [`ErrorKind`](crate::ErrorKind) maps to exactly one code. Codes are
//! grouped by the layer that raises them: `CMD1xxx` for the string reader,
//! `CMD2xxx` for literal and argument nodes, `CMD3xxx` for the dispatcher and
//! `CMD4xxx` for command handlers. Use these instead of string literals to get
//! compile-time typo detection.

/// A quoted string was expected but the next character is not a quote.
pub const READER_EXPECTED_START_OF_QUOTE: &str = "CMD1001";
/// A quoted string ran to end of input without its closing quote.
pub const READER_EXPECTED_END_OF_QUOTE: &str = "CMD1002";
/// A backslash escaped something other than the quote or a backslash.
pub const READER_INVALID_ESCAPE: &str = "CMD1003";
/// A token was read but could not be converted to the requested type.
pub const READER_INVALID_VALUE: &str = "CMD1004";
/// A typed value was expected but no token was present.
pub const READER_EXPECTED_VALUE: &str = "CMD1005";
/// A specific symbol was expected at the cursor.
pub const READER_EXPECTED_SYMBOL: &str = "CMD1006";

/// A numeric argument was below its lower bound.
pub const ARGUMENT_TOO_SMALL: &str = "CMD2001";
/// A numeric argument was above its upper bound.
pub const ARGUMENT_TOO_BIG: &str = "CMD2002";
/// A literal node did not match the token at the cursor.
pub const LITERAL_INCORRECT: &str = "CMD2003";
/// A handler asked for an argument that was never parsed.
pub const NO_SUCH_ARGUMENT: &str = "CMD2004";
/// A handler asked for an argument with the wrong type.
pub const ARGUMENT_TYPE_MISMATCH: &str = "CMD2005";

/// Nothing in the command tree matched the input.
pub const DISPATCHER_UNKNOWN_COMMAND: &str = "CMD3001";
/// A prefix matched but trailing input was left unconsumed.
pub const DISPATCHER_UNKNOWN_ARGUMENT: &str = "CMD3002";
/// Two tokens ran together without a separating space.
pub const DISPATCHER_EXPECTED_SEPARATOR: &str = "CMD3003";
/// A node failed to parse for a reason not covered by another code.
pub const DISPATCHER_PARSE_FAILURE: &str = "CMD3004";

/// A command handler or redirect modifier reported its own failure.
pub const COMMAND_FAILED: &str = "CMD4001";

/// Every code defined in this module, in numeric order.
pub const ALL: &[&str] = &[
    READER_EXPECTED_START_OF_QUOTE,
    READER_EXPECTED_END_OF_QUOTE,
    READER_INVALID_ESCAPE,
    READER_INVALID_VALUE,
    READER_EXPECTED_VALUE,
    READER_EXPECTED_SYMBOL,
    ARGUMENT_TOO_SMALL,
    ARGUMENT_TOO_BIG,
    LITERAL_INCORRECT,
    NO_SUCH_ARGUMENT,
    ARGUMENT_TYPE_MISMATCH,
    DISPATCHER_UNKNOWN_COMMAND,
    DISPATCHER_UNKNOWN_ARGUMENT,
    DISPATCHER_EXPECTED_SEPARATOR,
    DISPATCHER_PARSE_FAILURE,
    COMMAND_FAILED,
];
