//! Completion suggestions and the merge step that combines them.

mod builder;

pub use builder::SuggestionsBuilder;

use std::cmp::Ordering;

use cmdgraph_diagnostics::{StringRange, SyntaxError};
use futures::future::BoxFuture;
use indexmap::IndexSet;
use serde::Serialize;

/// Future returned by suggestion providers.
///
/// Failures are caught at the task boundary by the dispatcher and turned
/// into an empty result for that node.
pub type SuggestionFuture<'a> = BoxFuture<'a, Result<Suggestions, SyntaxError>>;

/// What a suggestion's text represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// Plain text, ordered case-insensitively.
    Text,
    /// An integer, ordered numerically against other integers.
    Integer(i32),
}

/// One replacement: put `text` in place of `range` of the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Suggestion {
    range: StringRange,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
    kind: SuggestionKind,
}

impl Suggestion {
    /// A text suggestion.
    pub fn new(range: StringRange, text: impl Into<String>, tooltip: Option<String>) -> Self {
        Self {
            range,
            text: text.into(),
            tooltip,
            kind: SuggestionKind::Text,
        }
    }

    /// An integer suggestion whose text is the decimal rendering of `value`.
    pub fn integer(range: StringRange, value: i32, tooltip: Option<String>) -> Self {
        Self {
            range,
            text: value.to_string(),
            tooltip,
            kind: SuggestionKind::Integer(value),
        }
    }

    /// The range of input this suggestion replaces.
    pub fn range(&self) -> StringRange {
        self.range
    }

    /// Replacement text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Optional tooltip.
    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Text or integer.
    pub fn kind(&self) -> SuggestionKind {
        self.kind
    }

    /// Apply the replacement to `input`.
    pub fn apply(&self, input: &str) -> String {
        if self.range.start == 0 && self.range.end == input.len() {
            return self.text.clone();
        }
        let mut result = String::with_capacity(input.len() + self.text.len());
        result.push_str(StringRange::new(0, self.range.start).get(input));
        result.push_str(&self.text);
        if self.range.end < input.len() {
            result.push_str(&input[self.range.end..]);
        }
        result
    }

    /// Widen this suggestion to `range`, padding the text with the original
    /// input characters on whichever side it did not cover.
    ///
    /// `range` must contain this suggestion's range.
    pub fn expand(&self, command: &str, range: StringRange) -> Suggestion {
        if range == self.range {
            return self.clone();
        }
        let mut result = String::new();
        if range.start < self.range.start {
            result.push_str(StringRange::new(range.start, self.range.start).get(command));
        }
        result.push_str(&self.text);
        if range.end > self.range.end {
            result.push_str(StringRange::new(self.range.end, range.end).get(command));
        }
        Suggestion::new(range, result, self.tooltip.clone())
    }

    /// Order integers numerically against integers; everything else by
    /// case-insensitive text.
    pub fn compare(&self, other: &Suggestion) -> Ordering {
        match (self.kind, other.kind) {
            (SuggestionKind::Integer(a), SuggestionKind::Integer(b)) => a.cmp(&b),
            _ => self.compare_ignore_case(other),
        }
    }

    /// Case-insensitive text comparison.
    pub fn compare_ignore_case(&self, other: &Suggestion) -> Ordering {
        self.text.to_lowercase().cmp(&other.text.to_lowercase())
    }
}

/// A normalized, sorted, de-duplicated set of suggestions sharing one range.
///
/// Produced only by [`Suggestions::create`], [`Suggestions::merge`] or a
/// [`SuggestionsBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Suggestions {
    range: StringRange,
    suggestions: Vec<Suggestion>,
}

impl Suggestions {
    /// No suggestions at position zero.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Range every suggestion replaces.
    pub fn range(&self) -> StringRange {
        self.range
    }

    /// The ordered suggestions.
    pub fn list(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Whether there is nothing to suggest.
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Suggestion texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.suggestions.iter().map(Suggestion::text).collect()
    }

    /// Combine the results of several providers for the same input.
    ///
    /// Zero inputs yield [`Suggestions::empty`] and a single input is returned
    /// unchanged; otherwise everything is normalized through
    /// [`Suggestions::create`].
    pub fn merge(command: &str, input: Vec<Suggestions>) -> Suggestions {
        match input.len() {
            0 => Suggestions::empty(),
            1 => input.into_iter().next().unwrap_or_default(),
            _ => {
                let all: Vec<Suggestion> = input.into_iter().flat_map(|s| s.suggestions).collect();
                Suggestions::create(command, all)
            }
        }
    }

    /// Normalize a raw list: widen every suggestion to the union of all
    /// ranges, drop duplicates (first occurrence wins), then stable-sort.
    pub fn create(command: &str, suggestions: Vec<Suggestion>) -> Suggestions {
        let Some(first) = suggestions.first() else {
            return Suggestions::empty();
        };
        let range = suggestions
            .iter()
            .fold(first.range, |acc, s| StringRange::encompassing(acc, s.range));

        let unique: IndexSet<Suggestion> = suggestions
            .iter()
            .map(|s| s.expand(command, range))
            .collect();
        let mut sorted: Vec<Suggestion> = unique.into_iter().collect();
        sorted.sort_by(Suggestion::compare);

        Suggestions {
            range,
            suggestions: sorted,
        }
    }
}
