//! Turning a validated [`Grammar`] into a [`CommandDispatcher`].
//!
//! Registration happens in two passes. The first registers every command
//! with redirecting nodes left as plain leaves, so that a redirect may name
//! a command declared later in the file (or its own ancestor). The second
//! resolves each redirect path against the finished tree and attaches it.

use std::sync::Arc;

use cmdgraph_core::arguments::{
    NumberArgumentType, boolean, greedy_string, string, word,
};
use cmdgraph_core::reader::ReadableNumber;
use cmdgraph_core::{
    Command, CommandContext, CommandDispatcher, ErrorKind, NodeBuilder, ParsedArgument,
    RedirectModifier, SyntaxError, argument, literal,
};
use tracing::{debug, trace};

use crate::{
    Action, ArgType, Bounds, Grammar, GrammarError, GrammarSource, Modifier, NodeSpec,
    NodeSpecKind, load_grammar_from_str,
};

/// A redirect recorded during the first pass.
struct PendingRedirect {
    from: Vec<String>,
    target: Vec<String>,
    modifier: Option<RedirectModifier<GrammarSource>>,
    fork: bool,
}

/// Build a dispatcher from an already loaded grammar.
pub fn build_dispatcher(
    grammar: &Grammar,
) -> Result<CommandDispatcher<GrammarSource>, GrammarError> {
    let mut dispatcher = CommandDispatcher::new();
    let mut pending = Vec::new();

    for command in &grammar.commands {
        let mut path = Vec::new();
        let node = node_builder(command, &mut path, &mut pending);
        dispatcher
            .register(node)
            .map_err(|source| GrammarError::Build {
                path: command.name().to_owned(),
                source,
            })?;
    }

    let redirects = pending.len();
    for redirect in pending {
        let from = redirect.from.join(" ");
        let Some(node) = dispatcher.find_node(&redirect.from) else {
            return Err(GrammarError::UnresolvedRedirect {
                from,
                target: redirect.target.join(" "),
            });
        };
        let Some(target) = dispatcher.find_node(&redirect.target) else {
            return Err(GrammarError::UnresolvedRedirect {
                from,
                target: redirect.target.join(" "),
            });
        };
        trace!(%from, %target, fork = redirect.fork, "resolved redirect");
        dispatcher
            .set_redirect(node, target, redirect.modifier, redirect.fork)
            .map_err(|source| GrammarError::Build { path: from, source })?;
    }

    debug!(
        commands = grammar.commands.len(),
        nodes = dispatcher.tree().len(),
        redirects,
        "built dispatcher from grammar"
    );
    Ok(dispatcher)
}

/// Load, validate and build in one step.
pub fn load_dispatcher_from_str(
    s: &str,
) -> Result<CommandDispatcher<GrammarSource>, GrammarError> {
    build_dispatcher(&load_grammar_from_str(s)?)
}

fn node_builder(
    spec: &NodeSpec,
    path: &mut Vec<String>,
    pending: &mut Vec<PendingRedirect>,
) -> NodeBuilder<GrammarSource> {
    path.push(spec.name().to_owned());

    let mut builder = match &spec.kind {
        NodeSpecKind::Literal { literal: name } => literal(name.as_str()),
        NodeSpecKind::Argument { argument: name, ty } => argument_node(name, ty),
    };

    if let Some(action) = &spec.executes {
        builder = builder.executes_with(action_command(action));
    }
    if let Some(permission) = &spec.requires {
        let permission = permission.clone();
        builder = builder.requires(move |source: &GrammarSource| source.has_permission(&permission));
    }
    if !spec.suggestions.is_empty() {
        let values: Arc<[String]> = spec.suggestions.as_slice().into();
        builder = builder.suggests(move |_, mut suggestions| {
            for value in values.iter() {
                if value.to_lowercase().starts_with(suggestions.remaining_lower()) {
                    suggestions.suggest(value.as_str());
                }
            }
            suggestions.build_future()
        });
    }
    if let Some(target) = &spec.redirect {
        pending.push(PendingRedirect {
            from: path.clone(),
            target: target.clone(),
            modifier: spec.modifier.as_ref().map(modifier_fn),
            fork: spec.fork,
        });
    }
    for child in &spec.children {
        builder = builder.then(node_builder(child, path, pending));
    }

    path.pop();
    builder
}

fn argument_node(name: &str, ty: &ArgType) -> NodeBuilder<GrammarSource> {
    match ty {
        ArgType::Bool => argument(name, boolean()),
        ArgType::Word => argument(name, word()),
        ArgType::String => argument(name, string()),
        ArgType::Greedy => argument(name, greedy_string()),
        ArgType::Integer(bounds) => argument(name, bounded(bounds)),
        ArgType::Long(bounds) => argument(name, bounded(bounds)),
        ArgType::Float(bounds) => argument(name, bounded(bounds)),
        ArgType::Double(bounds) => argument(name, bounded(bounds)),
    }
}

fn bounded<T: ReadableNumber>(bounds: &Bounds<T>) -> NumberArgumentType<T> {
    NumberArgumentType::between(bounds.min.unwrap_or(T::MIN), bounds.max.unwrap_or(T::MAX))
}

// ── Actions ─────────────────────────────────────────────────────────────

fn action_command(action: &Action) -> Command<GrammarSource> {
    match action.clone() {
        Action::Return(value) => {
            Arc::new(move |_: &CommandContext<GrammarSource>| -> Result<i32, SyntaxError> {
                Ok(value)
            })
        }
        Action::Argument(name) => {
            Arc::new(move |ctx: &CommandContext<GrammarSource>| -> Result<i32, SyntaxError> {
                numeric_value(lookup(ctx, &name)?, &name)
            })
        }
        Action::Fail(message) => {
            Arc::new(move |_: &CommandContext<GrammarSource>| -> Result<i32, SyntaxError> {
                Err(SyntaxError::custom(message.as_str()))
            })
        }
    }
}

fn lookup<'a>(
    ctx: &'a CommandContext<GrammarSource>,
    name: &str,
) -> Result<&'a ParsedArgument, SyntaxError> {
    ctx.parsed_argument(name).ok_or_else(|| {
        SyntaxError::new(ErrorKind::NoSuchArgument {
            name: name.to_owned(),
        })
    })
}

/// Integers as-is (saturating), floats truncated, booleans as 0/1, strings
/// as their character count.
fn numeric_value(parsed: &ParsedArgument, name: &str) -> Result<i32, SyntaxError> {
    if let Some(&value) = parsed.downcast::<i32>() {
        return Ok(value);
    }
    if let Some(&value) = parsed.downcast::<i64>() {
        return Ok(i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX }));
    }
    if let Some(&value) = parsed.downcast::<f32>() {
        return Ok(value as i32);
    }
    if let Some(&value) = parsed.downcast::<f64>() {
        return Ok(value as i32);
    }
    if let Some(&value) = parsed.downcast::<bool>() {
        return Ok(i32::from(value));
    }
    if let Some(value) = parsed.downcast::<String>() {
        return Ok(i32::try_from(value.chars().count()).unwrap_or(i32::MAX));
    }
    Err(SyntaxError::new(ErrorKind::ArgumentTypeMismatch {
        name: name.to_owned(),
        expected: "number".into(),
    }))
}

// ── Modifiers ───────────────────────────────────────────────────────────

fn modifier_fn(modifier: &Modifier) -> RedirectModifier<GrammarSource> {
    match modifier.clone() {
        Modifier::Split(name) => Arc::new(
            move |ctx: &CommandContext<GrammarSource>| -> Result<Vec<GrammarSource>, SyntaxError> {
                let list = ctx.argument::<String>(&name)?;
                Ok(list
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| ctx.source().renamed(part))
                    .collect())
            },
        ),
        Modifier::As(name) => Arc::new(
            move |ctx: &CommandContext<GrammarSource>| -> Result<Vec<GrammarSource>, SyntaxError> {
                let parsed = lookup(ctx, &name)?;
                let text = match parsed.downcast::<String>() {
                    Some(value) => value.clone(),
                    None => parsed.range().get(ctx.input()).to_owned(),
                };
                Ok(vec![ctx.source().renamed(text)])
            },
        ),
    }
}
