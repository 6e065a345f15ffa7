//! The command node graph.
//!
//! Nodes live in an arena owned by [`CommandTree`] and are addressed by
//! [`NodeId`]. Child edges form a tree; redirect edges are plain ids into the
//! same arena and may point anywhere, including back at the root.

mod builder;

pub use builder::{BuildError, NodeBuilder, argument, literal};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use cmdgraph_diagnostics::{ErrorKind, StringRange, SyntaxError};
use indexmap::IndexMap;

use crate::arguments::{ErasedArgumentType, accepts};
use crate::command::{
    ARGUMENT_SEPARATOR, Command, RedirectModifier, Requirement, Source, SuggestionProvider,
};
use crate::context::{CommandContext, CommandContextBuilder, ParsedArgument};
use crate::reader::StringReader;
use crate::suggestion::{SuggestionFuture, Suggestions, SuggestionsBuilder};

/// Handle to a node in a [`CommandTree`].
///
/// Only meaningful for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Node kinds ──────────────────────────────────────────────────────────

/// A literal node's keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralNode {
    literal: String,
    literal_lower: String,
}

impl LiteralNode {
    fn new(literal: String) -> Self {
        let literal_lower = literal.to_lowercase();
        Self {
            literal,
            literal_lower,
        }
    }

    /// The exact keyword.
    pub fn literal(&self) -> &str {
        &self.literal
    }
}

/// An argument node's name and value parser.
pub struct ArgumentNode<S> {
    name: String,
    parser: Arc<dyn ErasedArgumentType<S>>,
    custom_suggestions: Option<SuggestionProvider<S>>,
}

impl<S> ArgumentNode<S> {
    /// Name the parsed value is stored under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rust type name of the parsed value.
    pub fn value_type(&self) -> &'static str {
        self.parser.value_type_name()
    }

    /// Whether a custom suggestion provider overrides the parser's.
    pub fn has_custom_suggestions(&self) -> bool {
        self.custom_suggestions.is_some()
    }
}

/// What a node matches.
pub enum NodeKind<S> {
    /// The unnamed entry point. Never matched against input.
    Root,
    /// One fixed keyword.
    Literal(LiteralNode),
    /// One typed value.
    Argument(ArgumentNode<S>),
}

// ── CommandNode ─────────────────────────────────────────────────────────

/// One node of the graph plus the data shared by every kind.
pub struct CommandNode<S> {
    kind: NodeKind<S>,
    children: IndexMap<String, NodeId>,
    literals: HashMap<String, NodeId>,
    arguments: IndexMap<String, NodeId>,
    command: Option<Command<S>>,
    requirement: Option<Requirement<S>>,
    redirect: Option<NodeId>,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S> CommandNode<S> {
    fn root() -> Self {
        Self::with_kind(NodeKind::Root)
    }

    fn with_kind(kind: NodeKind<S>) -> Self {
        Self {
            kind,
            children: IndexMap::new(),
            literals: HashMap::new(),
            arguments: IndexMap::new(),
            command: None,
            requirement: None,
            redirect: None,
            modifier: None,
            forks: false,
        }
    }

    /// Root, literal or argument.
    pub fn kind(&self) -> &NodeKind<S> {
        &self.kind
    }

    /// Key in the parent's child map. Empty for the root.
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Root => "",
            NodeKind::Literal(literal) => &literal.literal,
            NodeKind::Argument(argument) => &argument.name,
        }
    }

    /// How the node appears in usage strings: the keyword, `<name>`, or
    /// nothing for the root.
    pub fn usage_text(&self) -> String {
        match &self.kind {
            NodeKind::Root => String::new(),
            NodeKind::Literal(literal) => literal.literal.clone(),
            NodeKind::Argument(argument) => format!("<{}>", argument.name),
        }
    }

    /// Canonical inputs this node accepts.
    pub fn examples(&self) -> Vec<String> {
        match &self.kind {
            NodeKind::Root => Vec::new(),
            NodeKind::Literal(literal) => vec![literal.literal.clone()],
            NodeKind::Argument(argument) => argument.parser.example_inputs(),
        }
    }

    /// Whether `input` is fully matched by this node, up to a separator.
    pub fn is_valid_input(&self, input: &str) -> bool {
        match &self.kind {
            NodeKind::Root => false,
            NodeKind::Literal(literal) => {
                let mut reader = StringReader::new(input);
                match_literal(&literal.literal, &mut reader).is_some()
            }
            NodeKind::Argument(argument) => accepts(argument.parser.as_ref(), input),
        }
    }

    /// Children in registration order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    /// Child with the given name.
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Handler run when input ends at this node.
    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    /// Node parsing continues at after this one, instead of its children.
    pub fn redirect(&self) -> Option<NodeId> {
        self.redirect
    }

    /// Modifier applied when execution crosses this node's redirect.
    pub fn redirect_modifier(&self) -> Option<&RedirectModifier<S>> {
        self.modifier.as_ref()
    }

    /// Whether crossing the redirect forks execution.
    pub fn is_fork(&self) -> bool {
        self.forks
    }

    /// Whether a requirement other than "always" is attached.
    pub fn is_restricted(&self) -> bool {
        self.requirement.is_some()
    }

    /// Evaluate the access predicate for `source`.
    pub fn can_use(&self, source: &S) -> bool {
        self.requirement.as_ref().is_none_or(|requirement| requirement(source))
    }
}

impl<S: Source> CommandNode<S> {
    /// Consume this node's token from `reader` and record it in `context`.
    pub(crate) fn parse(
        &self,
        id: NodeId,
        reader: &mut StringReader,
        context: &mut CommandContextBuilder<S>,
    ) -> Result<(), SyntaxError> {
        let start = reader.cursor();
        match &self.kind {
            NodeKind::Root => Ok(()),
            NodeKind::Literal(literal) => match match_literal(&literal.literal, reader) {
                Some(end) => {
                    context.with_node(id, self, StringRange::new(start, end));
                    Ok(())
                }
                None => Err(reader.error(ErrorKind::LiteralIncorrect {
                    expected: literal.literal.clone(),
                })),
            },
            NodeKind::Argument(argument) => {
                let value = argument
                    .parser
                    .parse_value_with_source(reader, context.source())?;
                let range = StringRange::new(start, reader.cursor());
                context.with_argument(argument.name.clone(), ParsedArgument::new(range, value));
                context.with_node(id, self, range);
                Ok(())
            }
        }
    }

    /// Completions this node offers for the partial token in `builder`.
    pub(crate) fn list_suggestions<'a>(
        &'a self,
        context: &'a CommandContext<S>,
        mut builder: SuggestionsBuilder,
    ) -> SuggestionFuture<'a> {
        match &self.kind {
            NodeKind::Root => Box::pin(futures::future::ready(Ok(Suggestions::empty()))),
            NodeKind::Literal(literal) => {
                if literal.literal_lower.starts_with(builder.remaining_lower()) {
                    builder.suggest(literal.literal.as_str());
                    builder.build_future()
                } else {
                    Box::pin(futures::future::ready(Ok(Suggestions::empty())))
                }
            }
            NodeKind::Argument(argument) => match &argument.custom_suggestions {
                Some(provider) => provider(context, builder),
                None => argument.parser.suggestions(context, builder),
            },
        }
    }
}

impl<S> fmt::Debug for CommandNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Root => "root",
            NodeKind::Literal(_) => "literal",
            NodeKind::Argument(_) => "argument",
        };
        f.debug_struct("CommandNode")
            .field("kind", &kind)
            .field("name", &self.name())
            .field("children", &self.children)
            .field("executable", &self.command.is_some())
            .field("redirect", &self.redirect)
            .field("forks", &self.forks)
            .finish()
    }
}

/// Match `literal` at the cursor, followed by end of input or a separator.
/// Returns the end offset and leaves the cursor there; otherwise the cursor
/// is unchanged.
fn match_literal(literal: &str, reader: &mut StringReader) -> Option<usize> {
    let start = reader.cursor();
    if !reader.remaining().starts_with(literal) {
        return None;
    }
    let end = start + literal.len();
    reader.set_cursor(end);
    if !reader.can_read() || reader.peek() == Some(ARGUMENT_SEPARATOR) {
        return Some(end);
    }
    reader.set_cursor(start);
    None
}

// ── CommandTree ─────────────────────────────────────────────────────────

/// Arena of command nodes rooted at [`NodeId::ROOT`].
///
/// Mutated only while commands are registered; read-only afterwards.
pub struct CommandTree<S> {
    nodes: Vec<CommandNode<S>>,
}

impl<S> Default for CommandTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for CommandTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.nodes).finish()
    }
}

impl<S> CommandTree<S> {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![CommandNode::root()],
        }
    }

    /// The root id.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The node behind `id`.
    ///
    /// Panics if `id` was issued by a different tree.
    pub fn node(&self, id: NodeId) -> &CommandNode<S> {
        &self.nodes[id.0]
    }

    /// The node behind `id`, if it exists.
    pub fn get(&self, id: NodeId) -> Option<&CommandNode<S>> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Validate and insert `builder` under `parent`, merging with an
    /// existing child of the same name.
    pub fn add_child(&mut self, parent: NodeId, builder: NodeBuilder<S>) -> Result<NodeId, BuildError> {
        self.check(Some(parent), &builder)?;
        Ok(self.insert(parent, builder))
    }

    /// Point an existing childless node at `target`.
    ///
    /// Used when the target could not be known while the node was built,
    /// such as a redirect to a command registered later.
    pub fn set_redirect(
        &mut self,
        node: NodeId,
        target: NodeId,
        modifier: Option<RedirectModifier<S>>,
        forks: bool,
    ) -> Result<(), BuildError> {
        if node == NodeId::ROOT {
            return Err(BuildError::RootNode);
        }
        let name = self.node(node).name().to_owned();
        if self.get(target).is_none() {
            return Err(BuildError::UnknownTarget {
                name,
                target: target.0,
            });
        }
        let entry = &mut self.nodes[node.0];
        if !entry.children.is_empty() {
            return Err(BuildError::RedirectWithChildren { name });
        }
        entry.redirect = Some(target);
        entry.modifier = modifier;
        entry.forks = forks;
        Ok(())
    }

    /// Candidate children of `parent` for the token at the reader's cursor.
    ///
    /// A literal whose keyword equals the next token is the only candidate;
    /// otherwise every argument child is.
    pub(crate) fn relevant_nodes(&self, parent: NodeId, reader: &StringReader) -> Vec<NodeId> {
        let node = self.node(parent);
        if !node.literals.is_empty() {
            let token = reader
                .remaining()
                .split(ARGUMENT_SEPARATOR)
                .next()
                .unwrap_or_default();
            if let Some(&id) = node.literals.get(token) {
                return vec![id];
            }
        }
        node.arguments.values().copied().collect()
    }

    fn check(&self, parent: Option<NodeId>, builder: &NodeBuilder<S>) -> Result<(), BuildError> {
        let name = builder.name();
        if name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        if let Some(target) = builder.target {
            if !builder.children.is_empty() {
                return Err(BuildError::RedirectWithChildren { name: name.to_owned() });
            }
            if self.get(target).is_none() {
                return Err(BuildError::UnknownTarget {
                    name: name.to_owned(),
                    target: target.0,
                });
            }
        }
        let existing = parent.and_then(|p| self.node(p).child(name));
        if let Some(existing) = existing
            && self.node(existing).redirect.is_some()
            && !builder.children.is_empty()
        {
            return Err(BuildError::RedirectWithChildren { name: name.to_owned() });
        }
        for child in &builder.children {
            self.check(existing, child)?;
        }
        Ok(())
    }

    fn insert(&mut self, parent: NodeId, builder: NodeBuilder<S>) -> NodeId {
        let NodeBuilder {
            kind,
            children,
            command,
            requirement,
            target,
            modifier,
            forks,
            suggestions,
        } = builder;

        let name = kind.name().to_owned();
        if let Some(existing) = self.node(parent).child(&name) {
            if command.is_some() {
                self.nodes[existing.0].command = command;
            }
            for child in children {
                self.insert(existing, child);
            }
            return existing;
        }

        let id = NodeId(self.nodes.len());
        let is_literal = kind.is_literal();
        let mut node = CommandNode::with_kind(kind.into_node_kind(suggestions));
        node.command = command;
        node.requirement = requirement;
        node.redirect = target;
        node.modifier = modifier;
        node.forks = forks;
        self.nodes.push(node);

        let parent_node = &mut self.nodes[parent.0];
        parent_node.children.insert(name.clone(), id);
        if is_literal {
            parent_node.literals.insert(name, id);
        } else {
            parent_node.arguments.insert(name, id);
        }

        for child in children {
            self.insert(id, child);
        }
        id
    }
}

impl<S> NodeKind<S> {
    pub(crate) fn literal(literal: String) -> Self {
        NodeKind::Literal(LiteralNode::new(literal))
    }

    pub(crate) fn argument(
        name: String,
        parser: Arc<dyn ErasedArgumentType<S>>,
        custom_suggestions: Option<SuggestionProvider<S>>,
    ) -> Self {
        NodeKind::Argument(ArgumentNode {
            name,
            parser,
            custom_suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::integer;

    fn tree() -> CommandTree<()> {
        let mut tree = CommandTree::new();
        tree.add_child(
            NodeId::ROOT,
            literal("foo")
                .then(literal("bar").executes(|_| Ok(1)))
                .then(argument("n", integer()).executes(|_| Ok(2))),
        )
        .unwrap();
        tree
    }

    #[test]
    fn new_tree_has_root_only() {
        let tree: CommandTree<()> = CommandTree::new();
        assert!(tree.is_empty());
        assert!(matches!(tree.node(tree.root()).kind(), NodeKind::Root));
        assert_eq!(tree.node(tree.root()).name(), "");
    }

    #[test]
    fn children_are_indexed_by_kind() {
        let tree = tree();
        let foo = tree.node(NodeId::ROOT).child("foo").unwrap();
        let node = tree.node(foo);
        assert_eq!(node.child_count(), 2);
        assert_eq!(node.literals.len(), 1);
        assert_eq!(node.arguments.len(), 1);
    }

    #[test]
    fn merge_keeps_existing_node() {
        let mut tree = tree();
        let first = tree.node(NodeId::ROOT).child("foo").unwrap();
        let second = tree
            .add_child(NodeId::ROOT, literal("foo").then(literal("baz")))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.node(first).child_count(), 3);
        assert!(tree.node(first).command().is_none());
    }

    #[test]
    fn merge_overwrites_command_only_when_present() {
        let mut tree = tree();
        let foo = tree.add_child(NodeId::ROOT, literal("foo").executes(|_| Ok(7))).unwrap();
        assert!(tree.node(foo).command().is_some());
        tree.add_child(NodeId::ROOT, literal("foo")).unwrap();
        assert!(tree.node(foo).command().is_some());
    }

    #[test]
    fn relevant_nodes_prefers_literal() {
        let tree = tree();
        let foo = tree.node(NodeId::ROOT).child("foo").unwrap();
        let bar = tree.node(foo).child("bar").unwrap();
        let n = tree.node(foo).child("n").unwrap();
        assert_eq!(tree.relevant_nodes(foo, &StringReader::new("bar 1")), vec![bar]);
        assert_eq!(tree.relevant_nodes(foo, &StringReader::new("12")), vec![n]);
        assert_eq!(tree.relevant_nodes(foo, &StringReader::new("barx")), vec![n]);
    }

    #[test]
    fn literal_requires_boundary() {
        let mut reader = StringReader::new("foobar");
        assert_eq!(match_literal("foo", &mut reader), None);
        assert_eq!(reader.cursor(), 0);

        let mut reader = StringReader::new("foo bar");
        assert_eq!(match_literal("foo", &mut reader), Some(3));
        assert_eq!(reader.cursor(), 3);
    }

    #[test]
    fn is_valid_input_per_kind() {
        let tree = tree();
        let foo = tree.node(NodeId::ROOT).child("foo").unwrap();
        let n = tree.node(foo).child("n").unwrap();
        assert!(tree.node(foo).is_valid_input("foo"));
        assert!(!tree.node(foo).is_valid_input("food"));
        assert!(tree.node(n).is_valid_input("42"));
        assert!(!tree.node(n).is_valid_input("x"));
        assert!(!tree.node(NodeId::ROOT).is_valid_input(""));
    }

    #[test]
    fn redirect_with_children_is_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        let err = tree
            .add_child(
                NodeId::ROOT,
                literal("a").then(literal("b").redirect(NodeId::ROOT).then(literal("c"))),
            )
            .unwrap_err();
        assert_eq!(err, BuildError::RedirectWithChildren { name: "b".into() });
        assert!(tree.is_empty());
    }

    #[test]
    fn children_under_existing_redirect_are_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.add_child(NodeId::ROOT, literal("a").redirect(NodeId::ROOT))
            .unwrap();
        let err = tree
            .add_child(NodeId::ROOT, literal("a").then(literal("b")))
            .unwrap_err();
        assert_eq!(err, BuildError::RedirectWithChildren { name: "a".into() });
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        assert_eq!(tree.add_child(NodeId::ROOT, literal("")).unwrap_err(), BuildError::EmptyName);
    }

    #[test]
    fn set_redirect_checks_target_and_children() {
        let mut tree = tree();
        let foo = tree.node(NodeId::ROOT).child("foo").unwrap();
        assert_eq!(
            tree.set_redirect(foo, NodeId::ROOT, None, false).unwrap_err(),
            BuildError::RedirectWithChildren { name: "foo".into() }
        );
        let bar = tree.node(foo).child("bar").unwrap();
        assert!(matches!(
            tree.set_redirect(bar, NodeId(99), None, false),
            Err(BuildError::UnknownTarget { target: 99, .. })
        ));
        tree.set_redirect(bar, NodeId::ROOT, None, true).unwrap();
        assert_eq!(tree.node(bar).redirect(), Some(NodeId::ROOT));
        assert!(tree.node(bar).is_fork());
        assert_eq!(tree.set_redirect(NodeId::ROOT, foo, None, false).unwrap_err(), BuildError::RootNode);
    }
}
