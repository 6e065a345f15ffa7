use std::fmt;

use cmdgraph_diagnostics::{ErrorKind, SyntaxError};

use super::ArgumentType;
use crate::reader::{ReadableNumber, StringReader};

/// Parses a number of type `T` within inclusive bounds.
///
/// Out-of-range values rewind the reader to the start of the number.
#[derive(Clone, Copy, PartialEq)]
pub struct NumberArgumentType<T> {
    min: T,
    max: T,
}

/// 32-bit integer argument.
pub type IntegerArgumentType = NumberArgumentType<i32>;
/// 64-bit integer argument.
pub type LongArgumentType = NumberArgumentType<i64>;
/// 32-bit float argument.
pub type FloatArgumentType = NumberArgumentType<f32>;
/// 64-bit float argument.
pub type DoubleArgumentType = NumberArgumentType<f64>;

impl<T: ReadableNumber> NumberArgumentType<T> {
    /// The full range of `T`.
    pub fn new() -> Self {
        Self::between(T::MIN, T::MAX)
    }

    /// Values in `[min, max]`.
    pub fn between(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Values of at least `min`.
    pub fn at_least(min: T) -> Self {
        Self::between(min, T::MAX)
    }

    /// Lower bound.
    pub fn minimum(&self) -> T {
        self.min
    }

    /// Upper bound.
    pub fn maximum(&self) -> T {
        self.max
    }
}

impl<T: ReadableNumber> Default for NumberArgumentType<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ReadableNumber> fmt::Debug for NumberArgumentType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == T::MIN && self.max == T::MAX {
            write!(f, "{}()", T::KIND)
        } else if self.max == T::MAX {
            write!(f, "{}({})", T::KIND, self.min)
        } else {
            write!(f, "{}({}, {})", T::KIND, self.min, self.max)
        }
    }
}

/// Unbounded `i32` argument.
pub fn integer() -> IntegerArgumentType {
    NumberArgumentType::new()
}

/// Unbounded `i64` argument.
pub fn long() -> LongArgumentType {
    NumberArgumentType::new()
}

/// Unbounded `f32` argument.
pub fn float() -> FloatArgumentType {
    NumberArgumentType::new()
}

/// Unbounded `f64` argument.
pub fn double() -> DoubleArgumentType {
    NumberArgumentType::new()
}

impl<S, T: ReadableNumber> ArgumentType<S> for NumberArgumentType<T> {
    type Value = T;

    fn parse(&self, reader: &mut StringReader) -> Result<T, SyntaxError> {
        let start = reader.cursor();
        let value = reader.read_number::<T>()?;
        if value < self.min {
            reader.set_cursor(start);
            return Err(reader.error(ErrorKind::TooSmall {
                kind: T::KIND,
                found: value.to_string(),
                min: self.min.to_string(),
            }));
        }
        if value > self.max {
            reader.set_cursor(start);
            return Err(reader.error(ErrorKind::TooBig {
                kind: T::KIND,
                found: value.to_string(),
                max: self.max.to_string(),
            }));
        }
        Ok(value)
    }

    fn examples(&self) -> Vec<String> {
        T::EXAMPLES.iter().map(|s| (*s).to_owned()).collect()
    }
}
