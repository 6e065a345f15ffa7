//! Parse contexts: the mutable builder filled in while the dispatcher walks
//! the tree, the immutable [`CommandContext`] snapshot handed to handlers,
//! and the [`ContextChain`] that orders redirect stages for execution.

mod builder;
mod chain;

pub use builder::{CommandContextBuilder, SuggestionContext};
pub use chain::{ContextChain, Stage};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cmdgraph_diagnostics::{ErrorKind, StringRange, SyntaxError};
use indexmap::IndexMap;

use crate::arguments::ArgumentValue;
use crate::command::{Command, RedirectModifier};
use crate::tree::NodeId;

/// A value parsed by an argument node and the input it came from.
#[derive(Clone)]
pub struct ParsedArgument {
    range: StringRange,
    value: ArgumentValue,
}

impl ParsedArgument {
    /// Wrap a parsed value.
    pub fn new(range: StringRange, value: ArgumentValue) -> Self {
        Self { range, value }
    }

    /// Input range the value was parsed from.
    pub fn range(&self) -> StringRange {
        self.range
    }

    /// The type-erased value.
    pub fn value(&self) -> &ArgumentValue {
        &self.value
    }

    /// The value as `T`, if that is its type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for ParsedArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedArgument")
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// A matched node and the input it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommandNode {
    node: NodeId,
    range: StringRange,
}

impl ParsedCommandNode {
    /// Record a match.
    pub fn new(node: NodeId, range: StringRange) -> Self {
        Self { node, range }
    }

    /// The matched node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The consumed input.
    pub fn range(&self) -> StringRange {
        self.range
    }
}

/// Immutable result of a parse, handed to handlers and modifiers.
///
/// A context covers the input matched from one root (or redirect target)
/// until the next redirect; a followed redirect continues in
/// [`child`](Self::child).
pub struct CommandContext<S> {
    pub(crate) source: S,
    pub(crate) input: Arc<str>,
    pub(crate) arguments: IndexMap<String, ParsedArgument>,
    pub(crate) command: Option<Command<S>>,
    pub(crate) root_node: NodeId,
    pub(crate) nodes: Vec<ParsedCommandNode>,
    pub(crate) range: StringRange,
    pub(crate) child: Option<Arc<CommandContext<S>>>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
}

impl<S: Clone> Clone for CommandContext<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            input: Arc::clone(&self.input),
            arguments: self.arguments.clone(),
            command: self.command.clone(),
            root_node: self.root_node,
            nodes: self.nodes.clone(),
            range: self.range,
            child: self.child.clone(),
            modifier: self.modifier.clone(),
            forks: self.forks,
        }
    }
}

impl<S: Clone> CommandContext<S> {
    /// This context with a different source.
    pub fn copy_for(&self, source: S) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }
}

impl<S> CommandContext<S> {
    /// The source this context executes with.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The full input string.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Read a parsed argument as `T`.
    ///
    /// Fails with `NoSuchArgument` if no argument of that name was parsed and
    /// with `ArgumentTypeMismatch` if it was parsed as another type.
    pub fn argument<T: Any>(&self, name: &str) -> Result<&T, SyntaxError> {
        let parsed = self.arguments.get(name).ok_or_else(|| {
            SyntaxError::new(ErrorKind::NoSuchArgument {
                name: name.to_owned(),
            })
        })?;
        parsed.downcast::<T>().ok_or_else(|| {
            SyntaxError::new(ErrorKind::ArgumentTypeMismatch {
                name: name.to_owned(),
                expected: std::any::type_name::<T>().to_owned(),
            })
        })
    }

    /// Whether an argument of that name was parsed.
    pub fn has_argument(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// The raw parsed argument.
    pub fn parsed_argument(&self, name: &str) -> Option<&ParsedArgument> {
        self.arguments.get(name)
    }

    /// All parsed arguments in match order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &ParsedArgument)> {
        self.arguments.iter().map(|(name, arg)| (name.as_str(), arg))
    }

    /// The handler resolved for this context.
    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    /// Node parsing of this context started from.
    pub fn root_node(&self) -> NodeId {
        self.root_node
    }

    /// Matched nodes in order.
    pub fn nodes(&self) -> &[ParsedCommandNode] {
        &self.nodes
    }

    /// Whether any node was matched.
    pub fn has_nodes(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Input covered by this context's nodes.
    pub fn range(&self) -> StringRange {
        self.range
    }

    /// Context of the followed redirect, if any.
    pub fn child(&self) -> Option<&CommandContext<S>> {
        self.child.as_deref()
    }

    /// The innermost context of the redirect chain.
    pub fn last_child(&self) -> &CommandContext<S> {
        let mut result = self;
        while let Some(child) = result.child() {
            result = child;
        }
        result
    }

    /// Modifier inherited from the last matched node.
    pub fn redirect_modifier(&self) -> Option<&RedirectModifier<S>> {
        self.modifier.as_ref()
    }

    /// Whether the last matched node forks.
    pub fn is_forked(&self) -> bool {
        self.forks
    }
}

impl<S: fmt::Debug> fmt::Debug for CommandContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("source", &self.source)
            .field("input", &self.input)
            .field("arguments", &self.arguments)
            .field("executable", &self.command.is_some())
            .field("root_node", &self.root_node)
            .field("nodes", &self.nodes)
            .field("range", &self.range)
            .field("child", &self.child)
            .field("forks", &self.forks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CommandContext<u8> {
        let mut arguments = IndexMap::new();
        arguments.insert(
            "count".to_owned(),
            ParsedArgument::new(StringRange::new(5, 7), Arc::new(42_i32)),
        );
        CommandContext {
            source: 1,
            input: Arc::from("give 42"),
            arguments,
            command: None,
            root_node: NodeId::ROOT,
            nodes: Vec::new(),
            range: StringRange::new(0, 7),
            child: None,
            modifier: None,
            forks: false,
        }
    }

    #[test]
    fn typed_argument_lookup() {
        let ctx = context();
        assert_eq!(*ctx.argument::<i32>("count").unwrap(), 42);
        assert_eq!(ctx.parsed_argument("count").unwrap().range(), StringRange::new(5, 7));
    }

    #[test]
    fn missing_argument_is_an_error() {
        let err = context().argument::<i32>("nope").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NoSuchArgument { name } if name == "nope"));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let err = context().argument::<String>("count").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ArgumentTypeMismatch { .. }));
    }

    #[test]
    fn copy_for_replaces_only_source() {
        let ctx = context();
        let copy = ctx.copy_for(9);
        assert_eq!(*copy.source(), 9);
        assert_eq!(copy.input(), "give 42");
        assert!(copy.has_argument("count"));
    }

    #[test]
    fn last_child_walks_chain() {
        let mut outer = context();
        let mut inner = context();
        inner.source = 3;
        outer.child = Some(Arc::new(inner));
        assert_eq!(*outer.last_child().source(), 3);
        assert_eq!(*context().last_child().source(), 1);
    }
}
