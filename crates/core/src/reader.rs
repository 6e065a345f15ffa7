use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use cmdgraph_diagnostics::{ErrorKind, SyntaxError, ValueKind};

/// Escape character inside quoted strings.
pub const SYNTAX_ESCAPE: char = '\\';
/// Double quote delimiter.
pub const SYNTAX_DOUBLE_QUOTE: char = '"';
/// Single quote delimiter.
pub const SYNTAX_SINGLE_QUOTE: char = '\'';

/// A numeric type that [`StringReader::read_number`] can produce.
pub trait ReadableNumber:
    FromStr + Copy + PartialOrd + Display + Send + Sync + 'static
{
    /// Kind reported in errors.
    const KIND: ValueKind;
    /// Canonical example inputs, used for usage hints and ambiguity checks.
    const EXAMPLES: &'static [&'static str];
    /// Smallest representable value.
    const MIN: Self;
    /// Largest representable value.
    const MAX: Self;
}

impl ReadableNumber for i32 {
    const KIND: ValueKind = ValueKind::Integer;
    const EXAMPLES: &'static [&'static str] = &["0", "123", "-123"];
    const MIN: Self = i32::MIN;
    const MAX: Self = i32::MAX;
}

impl ReadableNumber for i64 {
    const KIND: ValueKind = ValueKind::Long;
    const EXAMPLES: &'static [&'static str] = &["0", "123", "-123"];
    const MIN: Self = i64::MIN;
    const MAX: Self = i64::MAX;
}

impl ReadableNumber for f32 {
    const KIND: ValueKind = ValueKind::Float;
    const EXAMPLES: &'static [&'static str] = &["0", "1.2", ".5", "-1", "-.5", "-1234.56"];
    const MIN: Self = f32::MIN;
    const MAX: Self = f32::MAX;
}

impl ReadableNumber for f64 {
    const KIND: ValueKind = ValueKind::Double;
    const EXAMPLES: &'static [&'static str] = &["0", "1.2", ".5", "-1", "-.5", "-1234.56"];
    const MIN: Self = f64::MIN;
    const MAX: Self = f64::MAX;
}

/// Cursor-based scanner over one immutable command string.
///
/// Cloning is cheap: the input is shared and only the cursor is copied, which
/// is how the dispatcher snapshots a position before trying a branch.
///
/// The cursor is a UTF-8 byte offset and always sits on a char boundary.
/// Every read that fails leaves the cursor at the start of the offending
/// token (or on the offending character for escapes), never mid-token.
#[derive(Debug, Clone)]
pub struct StringReader {
    input: Arc<str>,
    cursor: usize,
}

impl StringReader {
    /// A reader positioned at the start of `input`.
    pub fn new(input: impl Into<Arc<str>>) -> Self {
        Self {
            input: input.into(),
            cursor: 0,
        }
    }

    /// The whole input.
    pub fn string(&self) -> &str {
        &self.input
    }

    /// The whole input as a shared handle.
    pub fn shared_string(&self) -> Arc<str> {
        Arc::clone(&self.input)
    }

    /// Current byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor. `cursor` must be a char boundary within the input.
    pub fn set_cursor(&mut self, cursor: usize) {
        debug_assert!(self.input.is_char_boundary(cursor));
        self.cursor = cursor;
    }

    /// Bytes left after the cursor.
    pub fn remaining_len(&self) -> usize {
        self.input.len() - self.cursor
    }

    /// Total input length in bytes.
    pub fn total_len(&self) -> usize {
        self.input.len()
    }

    /// Everything before the cursor.
    pub fn get_read(&self) -> &str {
        &self.input[..self.cursor]
    }

    /// Everything from the cursor on.
    pub fn remaining(&self) -> &str {
        &self.input[self.cursor..]
    }

    /// Whether at least `length` more bytes are available.
    pub fn can_read_n(&self, length: usize) -> bool {
        self.cursor + length <= self.input.len()
    }

    /// Whether anything is left to read.
    pub fn can_read(&self) -> bool {
        self.can_read_n(1)
    }

    /// The character at the cursor.
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// The character `offset` characters past the cursor.
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Advance past one character. No-op at end of input.
    pub fn skip(&mut self) {
        if let Some(c) = self.peek() {
            self.cursor += c.len_utf8();
        }
    }

    /// Consume and return one character.
    pub fn read(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    /// Advance past any whitespace.
    pub fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek()
            && c.is_whitespace()
        {
            self.skip();
        }
    }

    /// An error of `kind` pointing at the current cursor.
    pub fn error(&self, kind: ErrorKind) -> SyntaxError {
        kind.at(Arc::clone(&self.input), self.cursor)
    }

    // ── Character classes ───────────────────────────────────────────────

    /// Characters consumed by [`read_number`](Self::read_number).
    pub fn is_allowed_number(c: char) -> bool {
        c.is_ascii_digit() || c == '.' || c == '-'
    }

    /// Characters that open a quoted string.
    pub fn is_quoted_string_start(c: char) -> bool {
        c == SYNTAX_DOUBLE_QUOTE || c == SYNTAX_SINGLE_QUOTE
    }

    /// Characters allowed in an unquoted string.
    pub fn is_allowed_in_unquoted_string(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+')
    }

    // ── Typed reads ─────────────────────────────────────────────────────

    /// Greedily consume `[0-9.-]` and parse the slice as `T`.
    ///
    /// An empty slice is an "expected" error; an unparsable slice rewinds the
    /// cursor to the start of the number and reports an "invalid" error.
    pub fn read_number<T: ReadableNumber>(&mut self) -> Result<T, SyntaxError> {
        let start = self.cursor;
        while let Some(c) = self.peek()
            && Self::is_allowed_number(c)
        {
            self.skip();
        }
        let number = &self.input[start..self.cursor];
        if number.is_empty() {
            return Err(self.error(ErrorKind::ExpectedValue { kind: T::KIND }));
        }
        match number.parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                let value = number.to_owned();
                self.cursor = start;
                Err(self.error(ErrorKind::InvalidValue {
                    kind: T::KIND,
                    value,
                }))
            }
        }
    }

    /// Read a 32-bit integer.
    pub fn read_int(&mut self) -> Result<i32, SyntaxError> {
        self.read_number()
    }

    /// Read a 64-bit integer.
    pub fn read_long(&mut self) -> Result<i64, SyntaxError> {
        self.read_number()
    }

    /// Read a 32-bit float.
    pub fn read_float(&mut self) -> Result<f32, SyntaxError> {
        self.read_number()
    }

    /// Read a 64-bit float.
    pub fn read_double(&mut self) -> Result<f64, SyntaxError> {
        self.read_number()
    }

    /// Consume characters from the unquoted allow-list. May return `""`.
    pub fn read_unquoted_string(&mut self) -> String {
        let start = self.cursor;
        while let Some(c) = self.peek()
            && Self::is_allowed_in_unquoted_string(c)
        {
            self.skip();
        }
        self.input[start..self.cursor].to_owned()
    }

    /// Read a `"`- or `'`-delimited string. Returns `""` at end of input.
    pub fn read_quoted_string(&mut self) -> Result<String, SyntaxError> {
        let Some(next) = self.peek() else {
            return Ok(String::new());
        };
        if !Self::is_quoted_string_start(next) {
            return Err(self.error(ErrorKind::ExpectedStartOfQuote));
        }
        self.skip();
        self.read_string_until(next)
    }

    /// Read up to and past `terminator`, honouring backslash escapes of the
    /// terminator and of the backslash itself.
    pub fn read_string_until(&mut self, terminator: char) -> Result<String, SyntaxError> {
        let mut result = String::new();
        let mut escaped = false;
        while let Some(c) = self.read() {
            if escaped {
                if c == terminator || c == SYNTAX_ESCAPE {
                    result.push(c);
                    escaped = false;
                } else {
                    self.cursor -= c.len_utf8();
                    return Err(self.error(ErrorKind::InvalidEscape { character: c }));
                }
            } else if c == SYNTAX_ESCAPE {
                escaped = true;
            } else if c == terminator {
                return Ok(result);
            } else {
                result.push(c);
            }
        }
        Err(self.error(ErrorKind::ExpectedEndOfQuote))
    }

    /// Read a quoted string if the next character is a quote, else an
    /// unquoted one.
    pub fn read_string(&mut self) -> Result<String, SyntaxError> {
        let Some(next) = self.peek() else {
            return Ok(String::new());
        };
        if Self::is_quoted_string_start(next) {
            self.skip();
            return self.read_string_until(next);
        }
        Ok(self.read_unquoted_string())
    }

    /// Read `true` or `false` (case-sensitive).
    pub fn read_boolean(&mut self) -> Result<bool, SyntaxError> {
        let start = self.cursor;
        let value = self.read_string()?;
        if value.is_empty() {
            return Err(self.error(ErrorKind::ExpectedValue {
                kind: ValueKind::Bool,
            }));
        }
        match value.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => {
                self.cursor = start;
                Err(self.error(ErrorKind::InvalidValue {
                    kind: ValueKind::Bool,
                    value,
                }))
            }
        }
    }

    /// Consume `c` or fail without moving.
    pub fn expect(&mut self, c: char) -> Result<(), SyntaxError> {
        if self.peek() != Some(c) {
            return Err(self.error(ErrorKind::ExpectedSymbol { symbol: c }));
        }
        self.skip();
        Ok(())
    }
}

/// Quote `input` if it contains characters an unquoted read would stop at.
pub fn escape_if_required(input: &str) -> String {
    if input.chars().all(StringReader::is_allowed_in_unquoted_string) {
        return input.to_owned();
    }
    let mut out = String::with_capacity(input.len() + 2);
    out.push(SYNTAX_DOUBLE_QUOTE);
    for c in input.chars() {
        if c == SYNTAX_ESCAPE || c == SYNTAX_DOUBLE_QUOTE {
            out.push(SYNTAX_ESCAPE);
        }
        out.push(c);
    }
    out.push(SYNTAX_DOUBLE_QUOTE);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(err: &SyntaxError) -> &ErrorKind {
        err.kind()
    }

    // ── Navigation ──────────────────────────────────────────────────────

    #[test]
    fn can_read_tracks_cursor() {
        let mut reader = StringReader::new("abc");
        assert!(reader.can_read());
        reader.skip();
        reader.skip();
        assert!(reader.can_read());
        reader.skip();
        assert!(!reader.can_read());
    }

    #[test]
    fn can_read_n_bounds() {
        let reader = StringReader::new("abc");
        assert!(reader.can_read_n(3));
        assert!(!reader.can_read_n(4));
    }

    #[test]
    fn peek_and_peek_at() {
        let mut reader = StringReader::new("abc");
        assert_eq!(reader.peek(), Some('a'));
        assert_eq!(reader.peek_at(2), Some('c'));
        reader.set_cursor(2);
        assert_eq!(reader.peek(), Some('c'));
        assert_eq!(reader.peek_at(1), None);
    }

    #[test]
    fn read_and_split() {
        let mut reader = StringReader::new("hello world");
        for _ in 0..5 {
            reader.read();
        }
        assert_eq!(reader.get_read(), "hello");
        assert_eq!(reader.remaining(), " world");
        assert_eq!(reader.remaining_len(), 6);
        assert_eq!(reader.total_len(), 11);
    }

    #[test]
    fn skip_whitespace_stops_at_token() {
        let mut reader = StringReader::new(" \t \nHello!");
        reader.skip_whitespace();
        assert_eq!(reader.cursor(), 4);
        reader.skip_whitespace();
        assert_eq!(reader.cursor(), 4);
    }

    #[test]
    fn errors_share_the_reader_input() {
        let mut reader = StringReader::new("abc def");
        let first = reader.read_int().unwrap_err();
        reader.set_cursor(4);
        let second = reader.read_boolean().unwrap_err();
        assert_eq!(first.input().unwrap().as_ptr(), reader.string().as_ptr());
        assert_eq!(second.input().unwrap().as_ptr(), reader.string().as_ptr());
        assert_eq!(second.cursor(), Some(4));
    }

    #[test]
    fn multibyte_characters_advance_by_len() {
        let mut reader = StringReader::new("é!");
        assert_eq!(reader.read(), Some('é'));
        assert_eq!(reader.cursor(), 2);
        assert_eq!(reader.read(), Some('!'));
        assert_eq!(reader.read(), None);
    }

    // ── Strings ─────────────────────────────────────────────────────────

    #[test]
    fn read_unquoted_string_stops_at_space() {
        let mut reader = StringReader::new("hello world");
        assert_eq!(reader.read_unquoted_string(), "hello");
        assert_eq!(reader.remaining(), " world");
    }

    #[test]
    fn read_unquoted_string_empty() {
        let mut reader = StringReader::new(" hello");
        assert_eq!(reader.read_unquoted_string(), "");
        assert_eq!(reader.cursor(), 0);
    }

    #[test]
    fn read_quoted_string_with_escaped_quotes() {
        let mut reader = StringReader::new(r#""hello \"world\"""#);
        assert_eq!(reader.read_quoted_string().unwrap(), r#"hello "world""#);
        assert_eq!(reader.cursor(), reader.total_len());
        assert_eq!(reader.remaining(), "");
    }

    #[test]
    fn read_quoted_string_single_quotes_with_mixed_quotes() {
        let mut reader = StringReader::new(r#"'hello "world"' rest"#);
        assert_eq!(reader.read_quoted_string().unwrap(), r#"hello "world""#);
        assert_eq!(reader.remaining(), " rest");
    }

    #[test]
    fn read_quoted_string_escaped_backslash() {
        let mut reader = StringReader::new(r#""\\o/""#);
        assert_eq!(reader.read_quoted_string().unwrap(), r"\o/");
    }

    #[test]
    fn read_quoted_string_empty_input() {
        let mut reader = StringReader::new("");
        assert_eq!(reader.read_quoted_string().unwrap(), "");
    }

    #[test]
    fn read_quoted_string_no_open() {
        let mut reader = StringReader::new("hello world\"");
        let err = reader.read_quoted_string().unwrap_err();
        assert_eq!(kind_of(&err), &ErrorKind::ExpectedStartOfQuote);
        assert_eq!(err.cursor(), Some(0));
    }

    #[test]
    fn read_quoted_string_no_close() {
        let mut reader = StringReader::new("\"hello world");
        let err = reader.read_quoted_string().unwrap_err();
        assert_eq!(kind_of(&err), &ErrorKind::ExpectedEndOfQuote);
        assert_eq!(err.cursor(), Some(12));
    }

    #[test]
    fn read_quoted_string_invalid_escape_points_at_character() {
        let mut reader = StringReader::new("\"hello\\nworld\"");
        let err = reader.read_quoted_string().unwrap_err();
        assert_eq!(kind_of(&err), &ErrorKind::InvalidEscape { character: 'n' });
        assert_eq!(err.cursor(), Some(7));
    }

    #[test]
    fn read_string_picks_quoted_or_unquoted() {
        let mut reader = StringReader::new("\"quoted\" bare");
        assert_eq!(reader.read_string().unwrap(), "quoted");
        reader.skip();
        assert_eq!(reader.read_string().unwrap(), "bare");
        assert!(!reader.can_read());
    }

    // ── Numbers ─────────────────────────────────────────────────────────

    #[test]
    fn read_int_leaves_remaining() {
        let mut reader = StringReader::new("1234567890 foo");
        assert_eq!(reader.read_int().unwrap(), 1234567890);
        assert_eq!(reader.remaining(), " foo");
    }

    #[test]
    fn read_int_negative() {
        let mut reader = StringReader::new("-1234567890");
        assert_eq!(reader.read_int().unwrap(), -1234567890);
    }

    #[test]
    fn read_int_invalid_rewinds() {
        let mut reader = StringReader::new("12.34");
        let err = reader.read_int().unwrap_err();
        assert_eq!(
            kind_of(&err),
            &ErrorKind::InvalidValue {
                kind: ValueKind::Integer,
                value: "12.34".into()
            }
        );
        assert_eq!(err.cursor(), Some(0));
        assert_eq!(reader.cursor(), 0);
    }

    #[test]
    fn read_int_none() {
        let mut reader = StringReader::new("");
        let err = reader.read_int().unwrap_err();
        assert_eq!(
            kind_of(&err),
            &ErrorKind::ExpectedValue {
                kind: ValueKind::Integer
            }
        );
        assert_eq!(err.cursor(), Some(0));
    }

    #[test]
    fn read_long_beyond_int_range() {
        let mut reader = StringReader::new("9876543210");
        assert_eq!(reader.read_long().unwrap(), 9_876_543_210);
        let mut reader = StringReader::new("9876543210");
        assert!(reader.read_int().is_err());
    }

    #[test]
    fn read_double_with_leading_dot() {
        let mut reader = StringReader::new(".5 rest");
        assert_eq!(reader.read_double().unwrap(), 0.5);
        assert_eq!(reader.remaining(), " rest");
    }

    #[test]
    fn read_float_invalid() {
        let mut reader = StringReader::new("12.34.56 ");
        let err = reader.read_float().unwrap_err();
        assert_eq!(
            kind_of(&err),
            &ErrorKind::InvalidValue {
                kind: ValueKind::Float,
                value: "12.34.56".into()
            }
        );
        assert_eq!(err.cursor(), Some(0));
    }

    // ── Booleans ────────────────────────────────────────────────────────

    #[test]
    fn read_boolean_values() {
        let mut reader = StringReader::new("true false");
        assert!(reader.read_boolean().unwrap());
        reader.skip();
        assert!(!reader.read_boolean().unwrap());
    }

    #[test]
    fn read_boolean_is_case_sensitive() {
        let mut reader = StringReader::new("True");
        let err = reader.read_boolean().unwrap_err();
        assert_eq!(
            kind_of(&err),
            &ErrorKind::InvalidValue {
                kind: ValueKind::Bool,
                value: "True".into()
            }
        );
        assert_eq!(err.cursor(), Some(0));
    }

    #[test]
    fn read_boolean_none() {
        let mut reader = StringReader::new("");
        let err = reader.read_boolean().unwrap_err();
        assert_eq!(
            kind_of(&err),
            &ErrorKind::ExpectedValue {
                kind: ValueKind::Bool
            }
        );
    }

    // ── expect ──────────────────────────────────────────────────────────

    #[test]
    fn expect_consumes_match() {
        let mut reader = StringReader::new("abc");
        reader.expect('a').unwrap();
        assert_eq!(reader.cursor(), 1);
    }

    #[test]
    fn expect_mismatch_keeps_cursor() {
        let mut reader = StringReader::new("bcd");
        let err = reader.expect('a').unwrap_err();
        assert_eq!(kind_of(&err), &ErrorKind::ExpectedSymbol { symbol: 'a' });
        assert_eq!(err.cursor(), Some(0));
        assert_eq!(reader.cursor(), 0);
    }

    // ── escape_if_required ──────────────────────────────────────────────

    #[test]
    fn escape_if_required_quotes_when_needed() {
        assert_eq!(escape_if_required("plain_word"), "plain_word");
        assert_eq!(escape_if_required("two words"), r#""two words""#);
        assert_eq!(escape_if_required(r#"say "hi""#), r#""say \"hi\"""#);
    }

    #[test]
    fn escaped_text_reads_back() {
        let original = r#"a "quoted" \ path"#;
        let mut reader = StringReader::new(escape_if_required(original));
        assert_eq!(reader.read_string().unwrap(), original);
    }
}
