//! Pretty error rendering using ariadne.
//!
//! Converts a [`SyntaxError`] into an ariadne [`Report`] pointing at the
//! cursor inside the command line. Falls back to structured JSON when the
//! output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use cmdgraph_diagnostics::{self as diag, SyntaxError};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for results and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pick by whether stdout is a TTY.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render `err` against the command line it was raised for, to stderr.
///
/// Errors without a cursor (handler failures) are printed as a single
/// line.
pub(crate) fn render_error_pretty(input: &str, err: &SyntaxError) {
    let Some(cursor) = err.cursor() else {
        eprintln!("error[{}]: {}", err.code(), err.raw_message());
        if let Some(explanation) = diag::explain(err.code()) {
            eprintln!("  = help: {explanation}");
        }
        return;
    };

    // Highlight the character at the cursor, or a zero-width point at the end.
    let start = cursor.min(input.len());
    let end = input
        .get(start..)
        .and_then(|rest| rest.chars().next())
        .map_or(start, |c| start + c.len_utf8());

    let mut builder = Report::build(ReportKind::Error, ("input", start..end))
        .with_code(err.code())
        .with_message(err.raw_message())
        .with_config(
            Config::default()
                .with_compact(false)
                .with_index_type(IndexType::Byte),
        )
        .with_label(
            Label::new(("input", start..end))
                .with_message(format!("at position {cursor}"))
                .with_color(Color::Red),
        );
    if let Some(explanation) = diag::explain(err.code()) {
        builder = builder.with_help(explanation);
    }
    let mut cache = ("input", Source::from(input));
    builder.finish().eprint(&mut cache).ok();
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// The `{"ok": false, "error": ...}` object for a failed command line.
pub(crate) fn error_json(err: &SyntaxError) -> serde_json::Value {
    serde_json::json!({
        "ok": false,
        "error": err,
    })
}

// ── Unified entry point ─────────────────────────────────────────────────

/// Render a command-line error in the given format.
///
/// - `Pretty` → coloured report on stderr.
/// - `Json`   → error object on stdout.
pub(crate) fn render_error(input: &str, err: &SyntaxError, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Pretty => render_error_pretty(input, err),
        Format::Json => println!("{}", serde_json::to_string_pretty(&error_json(err))?),
    }
    Ok(())
}
