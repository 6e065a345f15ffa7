use futures::future::join_all;
use tracing::debug;

use super::{CommandDispatcher, ParseResults};
use crate::command::Source;
use crate::context::SuggestionContext;
use crate::suggestion::{Suggestions, SuggestionsBuilder};

impl<S: Source> CommandDispatcher<S> {
    /// Completions for the end of the parsed input.
    pub async fn get_completion_suggestions(&self, parse: &ParseResults<S>) -> Suggestions {
        self.get_completion_suggestions_at(parse, parse.reader().total_len())
            .await
    }

    /// Completions at `cursor`.
    ///
    /// Every child of the node before the cursor is asked concurrently; a
    /// child whose provider fails contributes nothing. Results are merged
    /// into one sorted list.
    pub async fn get_completion_suggestions_at(
        &self,
        parse: &ParseResults<S>,
        cursor: usize,
    ) -> Suggestions {
        let context = parse.context();
        let Some(SuggestionContext { parent, start_pos }) = context.find_suggestion_context(cursor)
        else {
            return Suggestions::empty();
        };

        let full_input = parse.reader().string();
        let Some(truncated) = full_input.get(..cursor) else {
            return Suggestions::empty();
        };
        let truncated_lower = truncated.to_lowercase();
        let start = start_pos.min(cursor);
        let built = context.build(truncated);
        let built = &built;

        let tasks = self.tree.node(parent).children().map(|child_id| {
            let node = self.tree.node(child_id);
            let builder = SuggestionsBuilder::with_lower(truncated, truncated_lower.as_str(), start);
            async move {
                match node.list_suggestions(built, builder).await {
                    Ok(suggestions) => suggestions,
                    Err(err) => {
                        debug!(node = %child_id, error = %err, "suggestion provider failed");
                        Suggestions::empty()
                    }
                }
            }
        });
        let results = join_all(tasks).await;
        Suggestions::merge(full_input, results)
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use crate::CommandDispatcher;
    use crate::arguments::integer;
    use crate::tree::{argument, literal};

    fn dispatcher() -> CommandDispatcher<()> {
        let mut d = CommandDispatcher::new();
        d.register(literal("foo")).unwrap();
        d.register(literal("bar")).unwrap();
        d.register(literal("baz")).unwrap();
        d.register(literal("count").then(argument("n", integer()))).unwrap();
        d
    }

    #[test]
    fn root_suggests_all_literals() {
        let d = dispatcher();
        let parse = d.parse("", ());
        let result = block_on(d.get_completion_suggestions(&parse));
        assert_eq!(result.texts(), vec!["bar", "baz", "count", "foo"]);
    }

    #[test]
    fn partial_literal_is_filtered() {
        let d = dispatcher();
        let parse = d.parse("b", ());
        let result = block_on(d.get_completion_suggestions(&parse));
        assert_eq!(result.texts(), vec!["bar", "baz"]);
        assert_eq!(result.range().start, 0);
        assert_eq!(result.range().end, 1);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let d = dispatcher();
        let parse = d.parse("BA", ());
        let result = block_on(d.get_completion_suggestions(&parse));
        assert_eq!(result.texts(), vec!["bar", "baz"]);
    }

    #[test]
    fn cursor_inside_input() {
        let d = dispatcher();
        let parse = d.parse("ba xyz", ());
        let result = block_on(d.get_completion_suggestions_at(&parse, 1));
        assert_eq!(result.texts(), vec!["bar", "baz"]);
        assert_eq!(result.range().start, 0);
        assert_eq!(result.range().end, 1);
    }

    #[test]
    fn argument_without_provider_suggests_nothing() {
        let d = dispatcher();
        let parse = d.parse("count ", ());
        assert!(block_on(d.get_completion_suggestions(&parse)).is_empty());
    }

    #[test]
    fn cursor_off_char_boundary_is_empty() {
        let mut d: CommandDispatcher<()> = CommandDispatcher::new();
        d.register(literal("é")).unwrap();
        let parse = d.parse("é", ());
        assert!(block_on(d.get_completion_suggestions_at(&parse, 1)).is_empty());
    }
}
