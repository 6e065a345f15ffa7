use std::sync::Arc;

use cmdgraph_diagnostics::SyntaxError;

use crate::context::CommandContext;
use crate::suggestion::{SuggestionFuture, SuggestionsBuilder};

/// Separator between tokens.
pub const ARGUMENT_SEPARATOR: char = ' ';

/// The caller-supplied value threaded through parsing and execution.
///
/// Blanket-implemented for every `Clone + Send + Sync + 'static` type; it
/// only exists to keep bounds short.
pub trait Source: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Source for T {}

/// A command handler. Returns an integer result or fails.
pub type Command<S> = Arc<dyn Fn(&CommandContext<S>) -> Result<i32, SyntaxError> + Send + Sync>;

/// Access predicate deciding whether a source may use a node.
pub type Requirement<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Maps the context of a redirecting node to the sources the redirect target
/// is executed with. Returning several sources forks execution.
pub type RedirectModifier<S> =
    Arc<dyn Fn(&CommandContext<S>) -> Result<Vec<S>, SyntaxError> + Send + Sync>;

/// Custom suggestion provider attached to an argument node.
pub type SuggestionProvider<S> = Arc<
    dyn for<'a> Fn(&'a CommandContext<S>, SuggestionsBuilder) -> SuggestionFuture<'a>
        + Send
        + Sync,
>;

/// Observer notified once per executed stage.
///
/// `success` is false when the handler or modifier failed; `result` is the
/// handler's result on success and `0` otherwise. Any
/// `Fn(&CommandContext<S>, bool, i32)` closure is a consumer.
pub trait ResultConsumer<S>: Send + Sync {
    /// Called after a handler or modifier ran against `context`.
    fn on_command_complete(&self, context: &CommandContext<S>, success: bool, result: i32);
}

impl<S, F> ResultConsumer<S> for F
where
    F: Fn(&CommandContext<S>, bool, i32) + Send + Sync,
{
    fn on_command_complete(&self, context: &CommandContext<S>, success: bool, result: i32) {
        self(context, success, result)
    }
}
