//! The dispatcher: registration, backtracking parse, and execution.
//!
//! Parsing tries every candidate child at each position on a private copy
//! of the reader and context, records per-node failures, and keeps the best
//! complete-looking result. Execution flattens the finished context into a
//! [`ContextChain`] and runs it.

mod completion;
mod paths;
mod usage;

use std::fmt;
use std::sync::Arc;

use cmdgraph_diagnostics::{ErrorKind, SyntaxError};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::command::{ARGUMENT_SEPARATOR, RedirectModifier, ResultConsumer, Source};
use crate::context::{CommandContext, CommandContextBuilder, ContextChain};
use crate::reader::StringReader;
use crate::tree::{BuildError, CommandNode, CommandTree, NodeBuilder, NodeId};

/// Outcome of [`CommandDispatcher::parse`]: the accumulated context, the
/// reader where parsing stopped, and the failures recorded for candidate
/// nodes at that position.
pub struct ParseResults<S> {
    context: CommandContextBuilder<S>,
    reader: StringReader,
    exceptions: IndexMap<NodeId, SyntaxError>,
}

impl<S: Clone> Clone for ParseResults<S> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            reader: self.reader.clone(),
            exceptions: self.exceptions.clone(),
        }
    }
}

impl<S> ParseResults<S> {
    /// The context builder of the chosen parse.
    pub fn context(&self) -> &CommandContextBuilder<S> {
        &self.context
    }

    /// Reader positioned where parsing stopped.
    pub fn reader(&self) -> &StringReader {
        &self.reader
    }

    /// Failures of the candidates tried at the stopping position, in the
    /// order they were tried.
    pub fn exceptions(&self) -> &IndexMap<NodeId, SyntaxError> {
        &self.exceptions
    }

    /// Whether the whole input was consumed.
    pub fn is_complete(&self) -> bool {
        !self.reader.can_read()
    }

    /// The error [`CommandDispatcher::execute_parsed`] would report for
    /// unconsumed input, if any.
    pub fn error(&self) -> Option<SyntaxError> {
        if !self.reader.can_read() {
            return None;
        }
        if self.exceptions.len() == 1 {
            return self.exceptions.values().next().cloned();
        }
        let kind = if self.context.range().is_empty() {
            ErrorKind::UnknownCommand
        } else {
            ErrorKind::UnknownArgument
        };
        Some(self.reader.error(kind))
    }
}

/// Owns a command tree and runs input against it.
///
/// The tree is built by [`register`](Self::register) during setup and only
/// read afterwards, so parsing, execution and completion all take `&self`.
pub struct CommandDispatcher<S> {
    tree: CommandTree<S>,
    consumer: Arc<dyn ResultConsumer<S>>,
}

impl<S> fmt::Debug for CommandDispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("tree", &self.tree)
            .finish_non_exhaustive()
    }
}

impl<S: Source> Default for CommandDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Source> CommandDispatcher<S> {
    /// An empty dispatcher with a no-op result consumer.
    pub fn new() -> Self {
        Self {
            tree: CommandTree::new(),
            consumer: Arc::new(|_: &CommandContext<S>, _: bool, _: i32| {}),
        }
    }

    /// Add a top-level literal command, merging with an existing one of the
    /// same name. Returns the id of the (possibly merged) node.
    pub fn register(&mut self, command: NodeBuilder<S>) -> Result<NodeId, BuildError> {
        if !command.is_literal() {
            return Err(BuildError::NotALiteral {
                name: command.name().to_owned(),
            });
        }
        let id = self.tree.add_child(NodeId::ROOT, command)?;
        debug!(node = %id, name = self.tree.node(id).name(), "registered command");
        Ok(id)
    }

    /// Point an existing childless node at `target`. See
    /// [`CommandTree::set_redirect`].
    pub fn set_redirect(
        &mut self,
        node: NodeId,
        target: NodeId,
        modifier: Option<RedirectModifier<S>>,
        forks: bool,
    ) -> Result<(), BuildError> {
        self.tree.set_redirect(node, target, modifier, forks)
    }

    /// Observe every handler and modifier outcome.
    pub fn set_consumer(&mut self, consumer: impl ResultConsumer<S> + 'static) {
        self.consumer = Arc::new(consumer);
    }

    /// [`set_consumer`](Self::set_consumer) for a plain closure.
    pub fn set_consumer_fn<F>(&mut self, consumer: F)
    where
        F: Fn(&CommandContext<S>, bool, i32) + Send + Sync + 'static,
    {
        self.consumer = Arc::new(consumer);
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// The node behind `id`.
    pub fn node(&self, id: NodeId) -> &CommandNode<S> {
        self.tree.node(id)
    }

    /// The underlying tree.
    pub fn tree(&self) -> &CommandTree<S> {
        &self.tree
    }

    // ── Parsing ─────────────────────────────────────────────────────────

    /// Parse `input` for `source` without executing.
    pub fn parse(&self, input: &str, source: S) -> ParseResults<S> {
        self.parse_reader(StringReader::new(input), source)
    }

    /// Parse from the reader's current position.
    pub fn parse_reader(&self, reader: StringReader, source: S) -> ParseResults<S> {
        let context = CommandContextBuilder::new(source, NodeId::ROOT, reader.cursor());
        let result = self.parse_nodes(NodeId::ROOT, &reader, &context);
        debug!(
            input = reader.string(),
            consumed = result.reader.cursor(),
            errors = result.exceptions.len(),
            "parsed command"
        );
        result
    }

    fn parse_nodes(
        &self,
        node: NodeId,
        original: &StringReader,
        context_so_far: &CommandContextBuilder<S>,
    ) -> ParseResults<S> {
        let source = context_so_far.source();
        let mut errors = IndexMap::new();
        let mut potentials = Vec::new();

        for child_id in self.tree.relevant_nodes(node, original) {
            let child = self.tree.node(child_id);
            if !child.can_use(source) {
                continue;
            }
            let mut context = context_so_far.clone();
            let mut reader = original.clone();

            let parsed = child.parse(child_id, &mut reader, &mut context).and_then(|()| {
                if reader.can_read() && reader.peek() != Some(ARGUMENT_SEPARATOR) {
                    Err(reader.error(ErrorKind::ExpectedSeparator))
                } else {
                    Ok(())
                }
            });
            if let Err(err) = parsed {
                trace!(node = %child_id, error = %err, "candidate rejected");
                errors.insert(child_id, err);
                continue;
            }

            context.with_command(child.command().cloned());
            let required = if child.redirect().is_some() { 1 } else { 2 };
            if reader.can_read_n(required) {
                reader.skip();
                if let Some(target) = child.redirect() {
                    let child_context =
                        CommandContextBuilder::new(source.clone(), target, reader.cursor());
                    let parse = self.parse_nodes(target, &reader, &child_context);
                    context.with_child(parse.context);
                    return ParseResults {
                        context,
                        reader: parse.reader,
                        exceptions: parse.exceptions,
                    };
                }
                potentials.push(self.parse_nodes(child_id, &reader, &context));
            } else {
                potentials.push(ParseResults {
                    context,
                    reader,
                    exceptions: IndexMap::new(),
                });
            }
        }

        // Fully consumed beats leftover input, then error-free beats errors;
        // remaining ties go to the earliest registered candidate.
        potentials
            .into_iter()
            .min_by_key(|p| (p.reader.can_read(), !p.exceptions.is_empty()))
            .unwrap_or_else(|| ParseResults {
                context: context_so_far.clone(),
                reader: original.clone(),
                exceptions: errors,
            })
    }

    // ── Execution ───────────────────────────────────────────────────────

    /// Parse and execute `input` for `source`.
    pub fn execute(&self, input: &str, source: S) -> Result<i32, SyntaxError> {
        let parse = self.parse(input, source);
        self.execute_parsed(&parse)
    }

    /// Execute an earlier parse.
    ///
    /// Unconsumed input fails with the single recorded candidate error if
    /// there is exactly one, `UnknownCommand` if nothing matched, and
    /// `UnknownArgument` otherwise.
    pub fn execute_parsed(&self, parse: &ParseResults<S>) -> Result<i32, SyntaxError> {
        if let Some(err) = parse.error() {
            debug!(error = %err, "command did not parse");
            return Err(err);
        }

        let original = parse.context.build(parse.reader.shared_string());
        let Some(chain) = ContextChain::try_flatten(&original) else {
            self.consumer.on_command_complete(&original, false, 0);
            return Err(parse.reader.error(ErrorKind::UnknownCommand));
        };

        let result = chain.execute_all(original.source().clone(), self.consumer.as_ref());
        match &result {
            Ok(value) => debug!(input = parse.reader.string(), result = value, "executed command"),
            Err(err) => debug!(input = parse.reader.string(), error = %err, "command failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::{integer, word};
    use crate::tree::{argument, literal};

    #[test]
    fn register_rejects_arguments() {
        let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
        let err = dispatcher.register(argument("x", word())).unwrap_err();
        assert_eq!(err, BuildError::NotALiteral { name: "x".into() });
    }

    #[test]
    fn debug_lists_registered_nodes() {
        let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
        dispatcher.register(literal("foo").executes(|_| Ok(1))).unwrap();
        let rendered = format!("{dispatcher:?}");
        assert!(rendered.starts_with("CommandDispatcher"), "{rendered}");
        assert!(rendered.contains("\"foo\""), "{rendered}");
    }

    #[test]
    fn parse_records_candidate_errors() {
        let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
        dispatcher
            .register(literal("foo").then(argument("n", integer()).executes(|_| Ok(1))))
            .unwrap();
        let parse = dispatcher.parse("foo x", ());
        assert_eq!(parse.reader().cursor(), 4);
        assert_eq!(parse.exceptions().len(), 1);
        assert!(!parse.is_complete());
    }

    #[test]
    fn separator_is_required_after_argument() {
        let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
        dispatcher
            .register(literal("foo").then(argument("n", integer()).executes(|_| Ok(1))))
            .unwrap();
        let err = dispatcher.execute("foo 12x", ()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ExpectedSeparator);
        assert_eq!(err.cursor(), Some(6));
    }

    #[test]
    fn trailing_space_is_unknown_argument() {
        let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
        dispatcher.register(literal("foo").executes(|_| Ok(1))).unwrap();
        let err = dispatcher.execute("foo ", ()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnknownArgument);
        assert_eq!(err.cursor(), Some(3));
    }

    #[test]
    fn parse_error_is_none_when_complete() {
        let mut dispatcher: CommandDispatcher<()> = CommandDispatcher::new();
        dispatcher.register(literal("foo").executes(|_| Ok(1))).unwrap();
        assert!(dispatcher.parse("foo", ()).error().is_none());
    }
}
