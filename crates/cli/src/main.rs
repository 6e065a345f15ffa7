mod render;

use std::fs;
use std::io;
use std::process;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cmdgraph_core::{CommandContextBuilder, CommandDispatcher, StringRange};
use cmdgraph_diagnostics as diag;
use cmdgraph_grammar::{GrammarSource, load_dispatcher_from_str};
use futures::executor::block_on;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::render::{Format, render_error};

// ── Embedded grammar ────────────────────────────────────────────────────

/// Demo grammar baked into the binary at compile time.
/// Present when `data/demo.json` existed during `cargo build`.
#[cfg(has_embedded_grammar)]
const EMBEDDED_GRAMMAR_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/demo.json"));

#[cfg(not(has_embedded_grammar))]
const EMBEDDED_GRAMMAR_JSON: &str = "";

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cmdgraph",
    version,
    about = "Parse, execute and complete command lines against a declarative grammar"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Path to a grammar JSON file. When omitted, uses the demo grammar
    /// embedded at compile time.
    #[arg(long, global = true)]
    grammar: Option<String>,

    /// Name of the source commands run as.
    #[arg(long = "as", global = true, default_value = "console")]
    source_name: String,

    /// Permission granted to the source. Repeatable.
    #[arg(long = "permission", short = 'p', global = true)]
    permissions: Vec<String>,

    /// Log dispatcher activity to stderr (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    // ── Command lines ───────────────────────────────────────────────
    /// Parse and execute a command line.
    Run { input: String },

    /// Parse a command line and show what matched, without executing.
    Parse { input: String },

    /// List completions for a command line.
    Suggest {
        input: String,
        /// Byte offset to complete at. Defaults to the end of the input.
        #[arg(long)]
        cursor: Option<usize>,
    },

    // ── Grammar inspection ──────────────────────────────────────────
    /// Show usage for the node at PATH (the root when empty).
    Usage {
        path: Vec<String>,
        /// One compact line per child instead of every full path.
        #[arg(long)]
        smart: bool,
        /// Include nodes the source lacks permission for.
        #[arg(long)]
        unrestricted: bool,
    },

    /// Report sibling nodes that accept the same input.
    Ambiguities,

    // ── Reference ───────────────────────────────────────────────────
    /// Explain an error code (e.g. CMD3001).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = dispatch(cli, format) {
        report_failure(format, &err);
        process::exit(1);
    }
}

fn dispatch(cli: Cli, format: Format) -> Result<()> {
    let source = GrammarSource {
        name: cli.source_name,
        permissions: cli.permissions.into_iter().collect(),
    };

    if let Cmd::Explain { id } = &cli.cmd {
        return cmd_explain(id, format);
    }

    let mut dispatcher = load_dispatcher(cli.grammar.as_deref())?;
    match cli.cmd {
        Cmd::Run { input } => cmd_run(&mut dispatcher, &input, source, format),
        Cmd::Parse { input } => cmd_parse(&dispatcher, &input, source, format),
        Cmd::Suggest { input, cursor } => cmd_suggest(&dispatcher, &input, cursor, source, format),
        Cmd::Usage {
            path,
            smart,
            unrestricted,
        } => cmd_usage(&dispatcher, &path, smart, unrestricted, &source, format),
        Cmd::Ambiguities => cmd_ambiguities(&dispatcher, format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

/// One result-consumer notification.
#[derive(Debug, Clone, Serialize)]
struct Notification {
    source: String,
    success: bool,
    result: i32,
}

fn cmd_run(
    dispatcher: &mut CommandDispatcher<GrammarSource>,
    input: &str,
    source: GrammarSource,
    format: Format,
) -> Result<()> {
    let seen: Arc<Mutex<Vec<Notification>>> = Arc::default();
    let sink = Arc::clone(&seen);
    dispatcher.set_consumer_fn(move |ctx, success, result| {
        if let Ok(mut seen) = sink.lock() {
            seen.push(Notification {
                source: ctx.source().name.clone(),
                success,
                result,
            });
        }
    });

    let outcome = dispatcher.execute(input, source);
    let notifications = seen.lock().map(|n| n.clone()).unwrap_or_default();

    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            render_error(input, &err, format)?;
            process::exit(1);
        }
    };

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": true,
                "result": result,
                "notifications": notifications,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Per-source outcomes only matter when execution forked.
            if notifications.len() > 1 {
                for n in &notifications {
                    if n.success {
                        eprintln!("{}: {}", n.source, n.result);
                    } else {
                        eprintln!("{}: failed", n.source);
                    }
                }
            }
            println!("{result}");
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct NodeReport {
    name: String,
    range: StringRange,
}

#[derive(Debug, Serialize)]
struct ArgumentReport {
    name: String,
    text: String,
    range: StringRange,
}

/// What one redirect hop matched.
#[derive(Debug, Serialize)]
struct HopReport {
    range: StringRange,
    executable: bool,
    nodes: Vec<NodeReport>,
    arguments: Vec<ArgumentReport>,
}

fn hop_reports(
    dispatcher: &CommandDispatcher<GrammarSource>,
    input: &str,
    context: &CommandContextBuilder<GrammarSource>,
) -> Vec<HopReport> {
    let mut hops = Vec::new();
    let mut current = Some(context);
    while let Some(ctx) = current {
        hops.push(HopReport {
            range: ctx.range(),
            executable: ctx.command().is_some(),
            nodes: ctx
                .nodes()
                .iter()
                .map(|parsed| NodeReport {
                    name: dispatcher.node(parsed.node()).name().to_owned(),
                    range: parsed.range(),
                })
                .collect(),
            arguments: ctx
                .arguments()
                .iter()
                .map(|(name, argument)| ArgumentReport {
                    name: name.clone(),
                    text: argument.range().get(input).to_owned(),
                    range: argument.range(),
                })
                .collect(),
        });
        current = ctx.child();
    }
    hops
}

fn cmd_parse(
    dispatcher: &CommandDispatcher<GrammarSource>,
    input: &str,
    source: GrammarSource,
    format: Format,
) -> Result<()> {
    let parse = dispatcher.parse(input, source);
    let hops = hop_reports(dispatcher, input, parse.context());
    let error = parse.error();

    match format {
        Format::Json => {
            let candidates: Vec<_> = parse
                .exceptions()
                .iter()
                .map(|(id, err)| {
                    serde_json::json!({ "node": dispatcher.node(*id).name(), "error": err })
                })
                .collect();
            let out = serde_json::json!({
                "complete": parse.is_complete(),
                "consumed": parse.reader().cursor(),
                "hops": hops,
                "candidate_errors": candidates,
                "error": error,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for (index, hop) in hops.iter().enumerate() {
                let nodes: Vec<&str> = hop.nodes.iter().map(|n| n.name.as_str()).collect();
                let marker = if hop.executable { " (executable)" } else { "" };
                println!("hop {index} {}: {}{marker}", hop.range, nodes.join(" "));
                for argument in &hop.arguments {
                    println!("  {} = {} {}", argument.name, argument.text, argument.range);
                }
            }
            if let Some(err) = &error {
                render_error(input, err, format)?;
            }
        }
    }

    if error.is_some() {
        process::exit(1);
    }
    Ok(())
}

fn cmd_suggest(
    dispatcher: &CommandDispatcher<GrammarSource>,
    input: &str,
    cursor: Option<usize>,
    source: GrammarSource,
    format: Format,
) -> Result<()> {
    let cursor = cursor.unwrap_or(input.len());
    if cursor > input.len() {
        bail!(
            "cursor {cursor} is past the end of the input ({} bytes)",
            input.len()
        );
    }

    let parse = dispatcher.parse(input, source);
    let suggestions = block_on(dispatcher.get_completion_suggestions_at(&parse, cursor));
    debug!(count = suggestions.list().len(), cursor, "collected suggestions");

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "input": input,
                "cursor": cursor,
                "range": suggestions.range(),
                "suggestions": suggestions.list(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            if suggestions.is_empty() {
                eprintln!("no suggestions");
            }
            for suggestion in suggestions.list() {
                match suggestion.tooltip() {
                    Some(tooltip) => println!("{}  ({tooltip})", suggestion.text()),
                    None => println!("{}", suggestion.text()),
                }
            }
        }
    }
    Ok(())
}

fn cmd_usage(
    dispatcher: &CommandDispatcher<GrammarSource>,
    path: &[String],
    smart: bool,
    unrestricted: bool,
    source: &GrammarSource,
    format: Format,
) -> Result<()> {
    let node = dispatcher
        .find_node(path)
        .with_context(|| format!("no node at path '{}'", path.join(" ")))?;
    let restricted = !unrestricted;
    let usage: Vec<String> = if smart {
        dispatcher
            .get_smart_usage(node, source, restricted)
            .into_values()
            .collect()
    } else {
        dispatcher.get_all_usage(node, source, restricted)
    };

    match format {
        Format::Json => {
            let out = serde_json::json!({ "path": path, "usage": usage });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            let prefix = path.join(" ");
            for line in &usage {
                if prefix.is_empty() {
                    println!("{line}");
                } else if line.is_empty() {
                    println!("{prefix}");
                } else {
                    println!("{prefix} {line}");
                }
            }
        }
    }
    Ok(())
}

/// Two siblings that both accept `inputs`.
#[derive(Debug, Serialize)]
struct Ambiguity {
    parent: Vec<String>,
    child: String,
    sibling: String,
    inputs: Vec<String>,
}

fn cmd_ambiguities(dispatcher: &CommandDispatcher<GrammarSource>, format: Format) -> Result<()> {
    let mut found = Vec::new();
    dispatcher.find_ambiguities(|parent, child, sibling, inputs| {
        found.push(Ambiguity {
            parent: dispatcher.get_path(parent),
            child: dispatcher.node(child).usage_text(),
            sibling: dispatcher.node(sibling).usage_text(),
            inputs: inputs.to_vec(),
        });
    });

    match format {
        Format::Json => {
            let out = serde_json::json!({ "ambiguities": found });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            if found.is_empty() {
                eprintln!("no ambiguities");
            }
            for a in &found {
                let parent = if a.parent.is_empty() {
                    "<root>".to_owned()
                } else {
                    a.parent.join(" ")
                };
                println!(
                    "{parent}: {} and {} both accept {}",
                    a.child,
                    a.sibling,
                    a.inputs.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let text = diag::explain(id);
            let out = serde_json::json!({
                "id": id,
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // The explanation is the output, so stdout.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// `RUST_LOG` decides the level unless `--verbose` forces `debug`; the
/// default is `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Build the dispatcher from (in priority order):
///   1. Explicit `--grammar` path
///   2. The grammar embedded into the binary
fn load_dispatcher(explicit_path: Option<&str>) -> Result<CommandDispatcher<GrammarSource>> {
    let (json, origin) = match explicit_path {
        Some(path) => (
            fs::read_to_string(path)
                .with_context(|| format!("failed to read grammar file '{path}'"))?,
            path,
        ),
        None if !EMBEDDED_GRAMMAR_JSON.is_empty() => {
            (EMBEDDED_GRAMMAR_JSON.to_owned(), "<embedded>")
        }
        None => bail!("this build has no embedded grammar; use --grammar <PATH>"),
    };
    let dispatcher = load_dispatcher_from_str(&json)
        .with_context(|| format!("failed to load grammar file '{origin}'"))?;
    debug!(grammar = origin, nodes = dispatcher.tree().len(), "loaded grammar");
    Ok(dispatcher)
}

/// Report a failure that is not a command-line syntax error.
fn report_failure(format: Format, err: &anyhow::Error) {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "success": false,
                "error": "command_failed",
                "message": format!("{err:#}"),
            });
            println!("{out:#}");
        }
        Format::Pretty => eprintln!("error: {err:#}"),
    }
}
