//! Pluggable value parsers for argument nodes.
//!
//! An [`ArgumentType`] turns the token at the reader's cursor into a typed
//! value. The tree stores parsers type-erased, and the parsed value is kept
//! in the context as an [`ArgumentValue`] that handlers read back with
//! [`CommandContext::argument`](crate::CommandContext::argument).

mod boolean;
mod number;
mod string;

pub use boolean::{BoolArgumentType, boolean};
pub use number::{
    DoubleArgumentType, FloatArgumentType, IntegerArgumentType, LongArgumentType,
    NumberArgumentType, double, float, integer, long,
};
pub use string::{StringArgumentType, StringKind, greedy_string, string, word};

use std::any::Any;
use std::sync::Arc;

use cmdgraph_diagnostics::SyntaxError;

use crate::command::ARGUMENT_SEPARATOR;
use crate::context::CommandContext;
use crate::reader::StringReader;
use crate::suggestion::{SuggestionFuture, Suggestions, SuggestionsBuilder};

/// A parsed argument value as stored in a context.
pub type ArgumentValue = Arc<dyn Any + Send + Sync>;

/// Converts one token (or the rest of the input) into a typed value.
pub trait ArgumentType<S>: Send + Sync + 'static {
    /// The value produced by a successful parse.
    type Value: Any + Send + Sync;

    /// Parse the token at the cursor. On failure the cursor should be left
    /// at the start of the offending token.
    fn parse(&self, reader: &mut StringReader) -> Result<Self::Value, SyntaxError>;

    /// Source-sensitive parse, used by the dispatcher. Defaults to
    /// [`parse`](Self::parse).
    fn parse_with_source(
        &self,
        reader: &mut StringReader,
        source: &S,
    ) -> Result<Self::Value, SyntaxError> {
        let _ = source;
        self.parse(reader)
    }

    /// Completions for the partial token in `builder`. Defaults to none.
    fn list_suggestions<'a>(
        &'a self,
        context: &'a CommandContext<S>,
        builder: SuggestionsBuilder,
    ) -> SuggestionFuture<'a> {
        let _ = (context, builder);
        Box::pin(futures::future::ready(Ok(Suggestions::empty())))
    }

    /// Canonical inputs this type accepts, for usage hints and ambiguity
    /// detection.
    fn examples(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Object-safe view of an [`ArgumentType`] with its value boxed.
pub(crate) trait ErasedArgumentType<S>: Send + Sync {
    fn parse_value(&self, reader: &mut StringReader) -> Result<ArgumentValue, SyntaxError>;

    fn parse_value_with_source(
        &self,
        reader: &mut StringReader,
        source: &S,
    ) -> Result<ArgumentValue, SyntaxError>;

    fn suggestions<'a>(
        &'a self,
        context: &'a CommandContext<S>,
        builder: SuggestionsBuilder,
    ) -> SuggestionFuture<'a>;

    fn example_inputs(&self) -> Vec<String>;

    fn value_type_name(&self) -> &'static str;
}

impl<S, T: ArgumentType<S>> ErasedArgumentType<S> for T {
    fn parse_value(&self, reader: &mut StringReader) -> Result<ArgumentValue, SyntaxError> {
        let value = self.parse(reader)?;
        Ok(Arc::new(value))
    }

    fn parse_value_with_source(
        &self,
        reader: &mut StringReader,
        source: &S,
    ) -> Result<ArgumentValue, SyntaxError> {
        let value = self.parse_with_source(reader, source)?;
        Ok(Arc::new(value))
    }

    fn suggestions<'a>(
        &'a self,
        context: &'a CommandContext<S>,
        builder: SuggestionsBuilder,
    ) -> SuggestionFuture<'a> {
        self.list_suggestions(context, builder)
    }

    fn example_inputs(&self) -> Vec<String> {
        self.examples()
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T::Value>()
    }
}

/// Whether `input` parses completely (up to a separator) with `parser`.
pub(crate) fn accepts<S>(parser: &dyn ErasedArgumentType<S>, input: &str) -> bool {
    let mut reader = StringReader::new(input);
    parser.parse_value(&mut reader).is_ok()
        && (!reader.can_read() || reader.peek() == Some(ARGUMENT_SEPARATOR))
}

/// Suggest each of `candidates` that starts with the typed remainder,
/// compared case-insensitively.
pub(crate) fn suggest_matching<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    mut builder: SuggestionsBuilder,
) -> Suggestions {
    let remaining = builder.remaining_lower().to_owned();
    for candidate in candidates {
        if candidate.to_lowercase().starts_with(&remaining) {
            builder.suggest(candidate);
        }
    }
    builder.build()
}
