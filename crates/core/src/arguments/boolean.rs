use cmdgraph_diagnostics::SyntaxError;

use super::{ArgumentType, suggest_matching};
use crate::context::CommandContext;
use crate::reader::StringReader;
use crate::suggestion::{SuggestionFuture, SuggestionsBuilder};

/// Parses `true` or `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolArgumentType;

/// A boolean argument.
pub fn boolean() -> BoolArgumentType {
    BoolArgumentType
}

impl<S> ArgumentType<S> for BoolArgumentType {
    type Value = bool;

    fn parse(&self, reader: &mut StringReader) -> Result<bool, SyntaxError> {
        reader.read_boolean()
    }

    fn list_suggestions<'a>(
        &'a self,
        _context: &'a CommandContext<S>,
        builder: SuggestionsBuilder,
    ) -> SuggestionFuture<'a> {
        Box::pin(futures::future::ready(Ok(suggest_matching(
            ["true", "false"],
            builder,
        ))))
    }

    fn examples(&self) -> Vec<String> {
        vec!["true".into(), "false".into()]
    }
}
