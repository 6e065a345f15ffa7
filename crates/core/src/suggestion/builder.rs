use cmdgraph_diagnostics::StringRange;

use super::{Suggestion, SuggestionFuture, Suggestions};

/// Collects suggestions for the input between `start` and the end of `input`.
///
/// Providers receive one of these per request, add candidates with the
/// `suggest*` methods, and finish with [`build`](Self::build) or
/// [`build_future`](Self::build_future).
#[derive(Debug, Clone)]
pub struct SuggestionsBuilder {
    input: String,
    input_lower: String,
    start: usize,
    remaining: String,
    remaining_lower: String,
    result: Vec<Suggestion>,
}

impl SuggestionsBuilder {
    /// A builder replacing everything from `start` to the end of `input`.
    pub fn new(input: impl Into<String>, start: usize) -> Self {
        let input = input.into();
        let input_lower = input.to_lowercase();
        Self::with_lower(input, input_lower, start)
    }

    /// As [`new`](Self::new), with a precomputed lowercase form of `input`.
    pub fn with_lower(input: impl Into<String>, input_lower: impl Into<String>, start: usize) -> Self {
        let input = input.into();
        let remaining = input.get(start..).unwrap_or("").to_owned();
        let remaining_lower = remaining.to_lowercase();
        Self {
            input,
            input_lower: input_lower.into(),
            start,
            remaining,
            remaining_lower,
            result: Vec::new(),
        }
    }

    /// The full (possibly truncated) input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Lowercase form of [`input`](Self::input).
    pub fn input_lower(&self) -> &str {
        &self.input_lower
    }

    /// Offset where suggestions start replacing.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Text typed so far for the token being completed.
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    /// Lowercase form of [`remaining`](Self::remaining).
    pub fn remaining_lower(&self) -> &str {
        &self.remaining_lower
    }

    fn range(&self) -> StringRange {
        StringRange::new(self.start, self.input.len())
    }

    /// Suggest `text`, unless it is exactly what was already typed.
    pub fn suggest(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if text != self.remaining {
            self.result.push(Suggestion::new(self.range(), text, None));
        }
        self
    }

    /// Suggest `text` with a tooltip.
    pub fn suggest_with_tooltip(
        &mut self,
        text: impl Into<String>,
        tooltip: impl Into<String>,
    ) -> &mut Self {
        let text = text.into();
        if text != self.remaining {
            self.result
                .push(Suggestion::new(self.range(), text, Some(tooltip.into())));
        }
        self
    }

    /// Suggest an integer; integers sort numerically.
    pub fn suggest_integer(&mut self, value: i32) -> &mut Self {
        self.result
            .push(Suggestion::integer(self.range(), value, None));
        self
    }

    /// Suggest an integer with a tooltip.
    pub fn suggest_integer_with_tooltip(
        &mut self,
        value: i32,
        tooltip: impl Into<String>,
    ) -> &mut Self {
        self.result
            .push(Suggestion::integer(self.range(), value, Some(tooltip.into())));
        self
    }

    /// Pull in everything collected by another builder.
    pub fn add(&mut self, other: &SuggestionsBuilder) -> &mut Self {
        self.result.extend(other.result.iter().cloned());
        self
    }

    /// A fresh builder over the same input starting at `start`.
    pub fn create_offset(&self, start: usize) -> SuggestionsBuilder {
        SuggestionsBuilder::with_lower(self.input.clone(), self.input_lower.clone(), start)
    }

    /// A fresh builder over the same input and start.
    pub fn restart(&self) -> SuggestionsBuilder {
        self.create_offset(self.start)
    }

    /// Normalize the collected suggestions.
    pub fn build(self) -> Suggestions {
        Suggestions::create(&self.input, self.result)
    }

    /// [`build`](Self::build), wrapped as an already-completed future.
    pub fn build_future<'a>(self) -> SuggestionFuture<'a> {
        Box::pin(futures::future::ready(Ok(self.build())))
    }
}
