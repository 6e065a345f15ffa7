//! Declarative command grammars for cmdgraph.
//!
//! A grammar is a JSON document describing a command tree: literals,
//! typed arguments, permission checks, redirects and canned handlers.
//! [`load_grammar_from_str`] parses and validates it, and
//! [`build_dispatcher`] turns it into a ready
//! [`CommandDispatcher`](cmdgraph_core::CommandDispatcher) over
//! [`GrammarSource`].

mod builder;
mod schema;
mod source;

pub use builder::{build_dispatcher, load_dispatcher_from_str};
pub use schema::{Action, ArgType, Bounds, Grammar, Modifier, NodeSpec, NodeSpecKind};
pub use source::GrammarSource;

use cmdgraph_core::{ARGUMENT_SEPARATOR, BuildError};
use thiserror::Error;

/// The only accepted schema major version.
pub const SCHEMA_MAJOR: u32 = 1;

/// Errors raised while loading a grammar or building a dispatcher from it.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// JSON deserialization failed.
    #[error("invalid grammar JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value breaks a grammar rule.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Location of the field, e.g. `commands[0].children[1].type`.
        field: String,
        /// A human-readable explanation.
        reason: String,
    },

    /// A redirect path names no node once every command is registered.
    #[error("redirect at '{from}' targets unknown path '{target}'")]
    UnresolvedRedirect {
        /// Names leading to the redirecting node.
        from: String,
        /// The target path as written.
        target: String,
    },

    /// The dispatcher rejected a node.
    #[error("cannot register '{path}': {source}")]
    Build {
        /// Names leading to the rejected node.
        path: String,
        /// Underlying registration error.
        #[source]
        source: BuildError,
    },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> GrammarError {
    GrammarError::InvalidField {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Load and validate a [`Grammar`] from a JSON string.
///
/// Structural checks performed after deserialization:
/// - `schema_version` must have major version [`SCHEMA_MAJOR`]
/// - top-level commands must be literals
/// - names must be non-empty; literals must not contain spaces
/// - numeric bounds must satisfy `min <= max`
/// - redirecting nodes may not have children
/// - `fork` and `modifier` require a `redirect`
/// - `suggestions` are only allowed on arguments
///
/// Redirect targets are resolved later, by [`build_dispatcher`].
pub fn load_grammar_from_str(s: &str) -> Result<Grammar, GrammarError> {
    let grammar: Grammar = serde_json::from_str(s)?;

    let version = grammar.schema_version.trim();
    if version.is_empty() {
        return Err(invalid("schema_version", "must not be empty"));
    }
    let major = version.split('.').next().and_then(|m| m.parse::<u32>().ok());
    if major != Some(SCHEMA_MAJOR) {
        return Err(invalid(
            "schema_version",
            format!("unsupported version '{version}' (expected {SCHEMA_MAJOR}.x)"),
        ));
    }

    for (index, command) in grammar.commands.iter().enumerate() {
        let field = format!("commands[{index}]");
        if !command.is_literal() {
            return Err(invalid(field, "top-level commands must be literals"));
        }
        validate_node(command, &field)?;
    }

    Ok(grammar)
}

fn validate_node(node: &NodeSpec, field: &str) -> Result<(), GrammarError> {
    // -- Names --
    let name = node.name();
    if name.trim().is_empty() {
        return Err(invalid(field, "name must not be empty"));
    }
    if node.is_literal() && name.contains(ARGUMENT_SEPARATOR) {
        return Err(invalid(field, format!("literal '{name}' must not contain spaces")));
    }

    // -- Types --
    if let NodeSpecKind::Argument { ty, .. } = &node.kind {
        validate_type(ty, &format!("{field}.type"))?;
    } else if !node.suggestions.is_empty() {
        return Err(invalid(
            format!("{field}.suggestions"),
            "only argument nodes take suggestions",
        ));
    }

    // -- Redirects --
    if node.redirect.is_some() {
        if !node.children.is_empty() {
            return Err(invalid(
                format!("{field}.redirect"),
                format!("'{name}' cannot redirect and have children"),
            ));
        }
    } else if node.fork {
        return Err(invalid(format!("{field}.fork"), "requires a redirect"));
    } else if node.modifier.is_some() {
        return Err(invalid(format!("{field}.modifier"), "requires a redirect"));
    }

    for (index, child) in node.children.iter().enumerate() {
        validate_node(child, &format!("{field}.children[{index}]"))?;
    }
    Ok(())
}

fn validate_type(ty: &ArgType, field: &str) -> Result<(), GrammarError> {
    match ty {
        ArgType::Integer(bounds) => check_bounds(bounds, field),
        ArgType::Long(bounds) => check_bounds(bounds, field),
        ArgType::Float(bounds) => check_bounds(bounds, field),
        ArgType::Double(bounds) => check_bounds(bounds, field),
        ArgType::Bool | ArgType::Word | ArgType::String | ArgType::Greedy => Ok(()),
    }
}

fn check_bounds<T: PartialOrd + std::fmt::Display>(
    bounds: &Bounds<T>,
    field: &str,
) -> Result<(), GrammarError> {
    if let (Some(min), Some(max)) = (&bounds.min, &bounds.max)
        && min > max
    {
        return Err(invalid(field, format!("min ({min}) > max ({max})")));
    }
    Ok(())
}
