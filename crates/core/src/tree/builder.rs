use std::sync::Arc;

use cmdgraph_diagnostics::SyntaxError;

use super::{NodeId, NodeKind};
use crate::arguments::{ArgumentType, ErasedArgumentType};
use crate::command::{Command, RedirectModifier, Requirement, SuggestionProvider};
use crate::context::CommandContext;
use crate::suggestion::{SuggestionFuture, SuggestionsBuilder};

/// Rejected registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A literal keyword or argument name was empty.
    #[error("node names must not be empty")]
    EmptyName,

    /// A node both redirects and has children.
    #[error("node '{name}' redirects and cannot also have children")]
    RedirectWithChildren {
        /// The offending node.
        name: String,
    },

    /// A redirect points at a node that does not exist.
    #[error("node '{name}' redirects to unknown node #{target}")]
    UnknownTarget {
        /// The redirecting node.
        name: String,
        /// The missing target's index.
        target: usize,
    },

    /// Only literals can be registered as top-level commands.
    #[error("top-level command '{name}' must be a literal")]
    NotALiteral {
        /// The offending argument name.
        name: String,
    },

    /// The root cannot be redirected.
    #[error("the root node cannot redirect")]
    RootNode,
}

pub(crate) enum PendingKind<S> {
    Literal(String),
    Argument {
        name: String,
        parser: Arc<dyn ErasedArgumentType<S>>,
    },
}

impl<S> PendingKind<S> {
    pub(crate) fn name(&self) -> &str {
        match self {
            PendingKind::Literal(literal) => literal,
            PendingKind::Argument { name, .. } => name,
        }
    }

    pub(crate) fn is_literal(&self) -> bool {
        matches!(self, PendingKind::Literal(_))
    }

    pub(crate) fn into_node_kind(self, suggestions: Option<SuggestionProvider<S>>) -> NodeKind<S> {
        match self {
            PendingKind::Literal(literal) => NodeKind::literal(literal),
            PendingKind::Argument { name, parser } => NodeKind::argument(name, parser, suggestions),
        }
    }
}

/// Fluent description of a node and its subtree, turned into real nodes by
/// [`CommandDispatcher::register`](crate::CommandDispatcher::register).
///
/// ```
/// use cmdgraph_core::{CommandDispatcher, arguments::integer, argument, literal};
///
/// let mut dispatcher = CommandDispatcher::new();
/// dispatcher
///     .register(
///         literal("add").then(
///             argument("a", integer()).then(
///                 argument("b", integer()).executes(|ctx| {
///                     Ok(ctx.argument::<i32>("a")? + ctx.argument::<i32>("b")?)
///                 }),
///             ),
///         ),
///     )
///     .unwrap();
/// assert_eq!(dispatcher.execute("add 2 3", ()).unwrap(), 5);
/// ```
pub struct NodeBuilder<S> {
    pub(crate) kind: PendingKind<S>,
    pub(crate) children: Vec<NodeBuilder<S>>,
    pub(crate) command: Option<Command<S>>,
    pub(crate) requirement: Option<Requirement<S>>,
    pub(crate) target: Option<NodeId>,
    pub(crate) modifier: Option<RedirectModifier<S>>,
    pub(crate) forks: bool,
    pub(crate) suggestions: Option<SuggestionProvider<S>>,
}

/// A node matching the keyword `literal`.
pub fn literal<S>(literal: impl Into<String>) -> NodeBuilder<S> {
    NodeBuilder::new(PendingKind::Literal(literal.into()))
}

/// A node parsing one `T` and storing it as `name`.
pub fn argument<S, T: ArgumentType<S>>(name: impl Into<String>, parser: T) -> NodeBuilder<S> {
    NodeBuilder::new(PendingKind::Argument {
        name: name.into(),
        parser: Arc::new(parser),
    })
}

impl<S> NodeBuilder<S> {
    fn new(kind: PendingKind<S>) -> Self {
        Self {
            kind,
            children: Vec::new(),
            command: None,
            requirement: None,
            target: None,
            modifier: None,
            forks: false,
            suggestions: None,
        }
    }

    /// Keyword or argument name.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Whether this builds a literal node.
    pub fn is_literal(&self) -> bool {
        self.kind.is_literal()
    }

    /// Add a child subtree.
    #[must_use]
    pub fn then(mut self, child: NodeBuilder<S>) -> Self {
        self.children.push(child);
        self
    }

    /// Run `command` when the input ends at this node.
    #[must_use]
    pub fn executes<F>(mut self, command: F) -> Self
    where
        F: Fn(&CommandContext<S>) -> Result<i32, SyntaxError> + Send + Sync + 'static,
    {
        self.command = Some(Arc::new(command));
        self
    }

    /// Use a prepared handler.
    #[must_use]
    pub fn executes_with(mut self, command: Command<S>) -> Self {
        self.command = Some(command);
        self
    }

    /// Only sources satisfying `requirement` may use this node.
    #[must_use]
    pub fn requires<F>(mut self, requirement: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.requirement = Some(Arc::new(requirement));
        self
    }

    /// Continue parsing at `target` with the same source.
    #[must_use]
    pub fn redirect(self, target: NodeId) -> Self {
        self.forward(target, None, false)
    }

    /// Continue parsing at `target`, executing with the source `modifier`
    /// derives from this node's context.
    #[must_use]
    pub fn redirect_with<F>(self, target: NodeId, modifier: F) -> Self
    where
        S: 'static,
        F: Fn(&CommandContext<S>) -> Result<S, SyntaxError> + Send + Sync + 'static,
    {
        let modifier: RedirectModifier<S> =
            Arc::new(move |ctx: &CommandContext<S>| modifier(ctx).map(|s| vec![s]));
        self.forward(target, Some(modifier), false)
    }

    /// Continue parsing at `target`, executing once per source `modifier`
    /// returns. Failures are isolated per source.
    #[must_use]
    pub fn fork<F>(self, target: NodeId, modifier: F) -> Self
    where
        F: Fn(&CommandContext<S>) -> Result<Vec<S>, SyntaxError> + Send + Sync + 'static,
    {
        self.forward(target, Some(Arc::new(modifier)), true)
    }

    /// General form of [`redirect`](Self::redirect), [`redirect_with`](Self::redirect_with)
    /// and [`fork`](Self::fork).
    #[must_use]
    pub fn forward(
        mut self,
        target: NodeId,
        modifier: Option<RedirectModifier<S>>,
        fork: bool,
    ) -> Self {
        self.target = Some(target);
        self.modifier = modifier;
        self.forks = fork;
        self
    }

    /// Replace the value parser's suggestions. Literal nodes ignore this.
    #[must_use]
    pub fn suggests<F>(mut self, provider: F) -> Self
    where
        F: for<'a> Fn(&'a CommandContext<S>, SuggestionsBuilder) -> SuggestionFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.suggestions = Some(Arc::new(provider));
        self
    }

    /// Use a prepared suggestion provider.
    #[must_use]
    pub fn suggests_with(mut self, provider: SuggestionProvider<S>) -> Self {
        self.suggestions = Some(provider);
        self
    }
}
