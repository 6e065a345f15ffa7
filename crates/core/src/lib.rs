//! cmdgraph core library.
//!
//! Parses single lines of text against a registered tree of literal and
//! typed-argument nodes, executes the matched handler across redirect and
//! fork stages, and produces ranked completions for partial input. The main
//! entry point is [`CommandDispatcher`]: build a tree with [`literal`] and
//! [`argument`], then call [`CommandDispatcher::parse`],
//! [`CommandDispatcher::execute`] or
//! [`CommandDispatcher::get_completion_suggestions`].

#![warn(missing_docs)]

/// Built-in and pluggable value parsers for argument nodes.
pub mod arguments;
/// Handler, requirement, modifier and consumer types.
pub mod command;
/// Parse contexts and the execution chain.
pub mod context;
/// Dispatcher: registration, parsing, execution, usage, completion.
pub mod dispatcher;
/// Cursor-based scanner over a command string.
pub mod reader;
/// Completion suggestions.
pub mod suggestion;
/// The command node graph and its builders.
pub mod tree;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Dispatcher
pub use dispatcher::{CommandDispatcher, ParseResults};

// Tree
pub use tree::{BuildError, CommandNode, CommandTree, NodeBuilder, NodeId, NodeKind, argument, literal};

// Contexts
pub use context::{
    CommandContext, CommandContextBuilder, ContextChain, ParsedArgument, ParsedCommandNode, Stage,
    SuggestionContext,
};

// Callbacks
pub use command::{
    ARGUMENT_SEPARATOR, Command, RedirectModifier, Requirement, ResultConsumer, Source,
    SuggestionProvider,
};

// Reader and values
pub use arguments::{ArgumentType, ArgumentValue};
pub use reader::StringReader;

// Suggestions
pub use suggestion::{Suggestion, SuggestionFuture, SuggestionKind, Suggestions, SuggestionsBuilder};

// Diagnostics (re-exported from the diagnostics crate)
pub use cmdgraph_diagnostics::{ErrorKind, StringRange, SyntaxError, ValueKind, codes};
