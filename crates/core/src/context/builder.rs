use std::sync::Arc;

use cmdgraph_diagnostics::StringRange;
use indexmap::IndexMap;

use super::{CommandContext, ParsedArgument, ParsedCommandNode};
use crate::command::{Command, RedirectModifier};
use crate::tree::{CommandNode, NodeId};

/// Where completion should happen: the node whose children are asked, and
/// the input offset their suggestions replace from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionContext {
    /// Node whose children provide suggestions.
    pub parent: NodeId,
    /// Offset where the completed token starts.
    pub start_pos: usize,
}

/// Accumulates matches while the dispatcher descends the tree.
///
/// Cloning gives an independent copy; the dispatcher clones before every
/// branch so a failed sibling leaves no trace.
pub struct CommandContextBuilder<S> {
    source: S,
    root_node: NodeId,
    arguments: IndexMap<String, ParsedArgument>,
    nodes: Vec<ParsedCommandNode>,
    range: StringRange,
    command: Option<Command<S>>,
    child: Option<Box<CommandContextBuilder<S>>>,
    modifier: Option<RedirectModifier<S>>,
    forks: bool,
}

impl<S: Clone> Clone for CommandContextBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            root_node: self.root_node,
            arguments: self.arguments.clone(),
            nodes: self.nodes.clone(),
            range: self.range,
            command: self.command.clone(),
            child: self.child.clone(),
            modifier: self.modifier.clone(),
            forks: self.forks,
        }
    }
}

impl<S> CommandContextBuilder<S> {
    /// An empty builder starting at `start` from `root_node`.
    pub fn new(source: S, root_node: NodeId, start: usize) -> Self {
        Self {
            source,
            root_node,
            arguments: IndexMap::new(),
            nodes: Vec::new(),
            range: StringRange::at(start),
            command: None,
            child: None,
            modifier: None,
            forks: false,
        }
    }

    /// Replace the source.
    #[must_use]
    pub fn with_source(mut self, source: S) -> Self {
        self.source = source;
        self
    }

    /// The source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Node this builder started from.
    pub fn root_node(&self) -> NodeId {
        self.root_node
    }

    /// Record a parsed argument.
    pub fn with_argument(&mut self, name: impl Into<String>, argument: ParsedArgument) -> &mut Self {
        self.arguments.insert(name.into(), argument);
        self
    }

    /// Parsed arguments so far.
    pub fn arguments(&self) -> &IndexMap<String, ParsedArgument> {
        &self.arguments
    }

    /// Set the handler; `None` clears it.
    pub fn with_command(&mut self, command: Option<Command<S>>) -> &mut Self {
        self.command = command;
        self
    }

    /// Record a matched node, widen the range, and adopt the node's
    /// modifier and fork flag.
    pub fn with_node(&mut self, id: NodeId, node: &CommandNode<S>, range: StringRange) -> &mut Self {
        self.nodes.push(ParsedCommandNode::new(id, range));
        self.range = StringRange::encompassing(self.range, range);
        self.modifier = node.redirect_modifier().cloned();
        self.forks = node.is_fork();
        self
    }

    /// Attach the builder of a followed redirect.
    pub fn with_child(&mut self, child: CommandContextBuilder<S>) -> &mut Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Builder of the followed redirect.
    pub fn child(&self) -> Option<&CommandContextBuilder<S>> {
        self.child.as_deref()
    }

    /// Innermost builder of the redirect chain.
    pub fn last_child(&self) -> &CommandContextBuilder<S> {
        let mut result = self;
        while let Some(child) = result.child() {
            result = child;
        }
        result
    }

    /// The handler.
    pub fn command(&self) -> Option<&Command<S>> {
        self.command.as_ref()
    }

    /// Matched nodes in order.
    pub fn nodes(&self) -> &[ParsedCommandNode] {
        &self.nodes
    }

    /// Input covered so far.
    pub fn range(&self) -> StringRange {
        self.range
    }

    /// Locate the node completion at `cursor` should ask for children.
    ///
    /// Returns `None` when the cursor lies before this builder's range.
    pub fn find_suggestion_context(&self, cursor: usize) -> Option<SuggestionContext> {
        if self.range.start > cursor {
            return None;
        }
        if self.range.end < cursor {
            if let Some(child) = &self.child {
                return child.find_suggestion_context(cursor);
            }
            if let Some(last) = self.nodes.last() {
                return Some(SuggestionContext {
                    parent: last.node(),
                    start_pos: last.range().end + 1,
                });
            }
            return Some(SuggestionContext {
                parent: self.root_node,
                start_pos: self.range.start,
            });
        }

        let mut prev = self.root_node;
        for node in &self.nodes {
            let range = node.range();
            if range.start <= cursor && cursor <= range.end {
                return Some(SuggestionContext {
                    parent: prev,
                    start_pos: range.start,
                });
            }
            prev = node.node();
        }
        Some(SuggestionContext {
            parent: prev,
            start_pos: self.range.start,
        })
    }
}

impl<S: Clone> CommandContextBuilder<S> {
    /// Freeze into a [`CommandContext`] over `input`, child builders included.
    pub fn build(&self, input: impl Into<Arc<str>>) -> CommandContext<S> {
        self.build_shared(&input.into())
    }

    fn build_shared(&self, input: &Arc<str>) -> CommandContext<S> {
        CommandContext {
            source: self.source.clone(),
            input: Arc::clone(input),
            arguments: self.arguments.clone(),
            command: self.command.clone(),
            root_node: self.root_node,
            nodes: self.nodes.clone(),
            range: self.range,
            child: self
                .child
                .as_ref()
                .map(|child| Arc::new(child.build_shared(input))),
            modifier: self.modifier.clone(),
            forks: self.forks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{CommandTree, literal};

    fn tree() -> (CommandTree<()>, NodeId, NodeId) {
        let mut tree = CommandTree::new();
        let foo = tree
            .add_child(NodeId::ROOT, literal("foo").then(literal("bar")))
            .unwrap();
        let bar = tree.node(foo).child("bar").unwrap();
        (tree, foo, bar)
    }

    #[test]
    fn with_node_widens_range() {
        let (tree, foo, bar) = tree();
        let mut builder = CommandContextBuilder::new((), NodeId::ROOT, 0);
        builder.with_node(foo, tree.node(foo), StringRange::new(0, 3));
        builder.with_node(bar, tree.node(bar), StringRange::new(4, 7));
        assert_eq!(builder.range(), StringRange::new(0, 7));
        assert_eq!(builder.nodes().len(), 2);
    }

    #[test]
    fn clones_are_independent() {
        let (tree, foo, _) = tree();
        let original = CommandContextBuilder::new((), NodeId::ROOT, 0);
        let mut copy = original.clone();
        copy.with_node(foo, tree.node(foo), StringRange::new(0, 3));
        assert!(original.nodes().is_empty());
        assert_eq!(copy.nodes().len(), 1);
    }

    #[test]
    fn build_carries_child() {
        let mut outer = CommandContextBuilder::new((), NodeId::ROOT, 0);
        outer.with_child(CommandContextBuilder::new((), NodeId::ROOT, 4));
        let ctx = outer.build("a b");
        assert_eq!(ctx.child().unwrap().range(), StringRange::at(4));
        assert_eq!(ctx.child().unwrap().input(), "a b");
    }

    #[test]
    fn suggestion_context_inside_node() {
        let (tree, foo, bar) = tree();
        let mut builder = CommandContextBuilder::new((), NodeId::ROOT, 0);
        builder.with_node(foo, tree.node(foo), StringRange::new(0, 3));
        builder.with_node(bar, tree.node(bar), StringRange::new(4, 7));

        assert_eq!(
            builder.find_suggestion_context(1),
            Some(SuggestionContext { parent: NodeId::ROOT, start_pos: 0 })
        );
        assert_eq!(
            builder.find_suggestion_context(5),
            Some(SuggestionContext { parent: foo, start_pos: 4 })
        );
    }

    #[test]
    fn suggestion_context_past_end() {
        let (tree, foo, _) = tree();
        let mut builder = CommandContextBuilder::new((), NodeId::ROOT, 0);
        builder.with_node(foo, tree.node(foo), StringRange::new(0, 3));
        assert_eq!(
            builder.find_suggestion_context(4),
            Some(SuggestionContext { parent: foo, start_pos: 4 })
        );
    }

    #[test]
    fn suggestion_context_follows_child() {
        let mut builder = CommandContextBuilder::new((), NodeId::ROOT, 0);
        builder.range = StringRange::new(0, 3);
        builder.with_child(CommandContextBuilder::new((), NodeId::ROOT, 4));
        assert_eq!(
            builder.find_suggestion_context(6),
            Some(SuggestionContext { parent: NodeId::ROOT, start_pos: 4 })
        );
    }

    #[test]
    fn suggestion_context_before_start() {
        let builder = CommandContextBuilder::new((), NodeId::ROOT, 5);
        assert_eq!(builder.find_suggestion_context(2), None);
    }
}
