//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::cli::output::{self, HumanLayout, OutputFormat};
use crate::error::Result;

pub mod activity;
pub mod class;
pub mod config;
pub mod doc;
pub mod doctor;
pub mod resync;
pub mod skill;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Doc(args) => doc::run(ctx, args),
        Commands::Class(args) => class::run(ctx, args),
        Commands::Skill(args) => skill::run(ctx, args),
        Commands::Activity(args) => activity::run(ctx, args),
        Commands::Resync(args) => resync::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
        Commands::Doctor(args) => doctor::run(ctx, args),
    }
}

/// Emit a single record in the context's output format.
pub(crate) fn emit_record<T, F>(ctx: &AppContext, value: &T, render: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&mut HumanLayout),
{
    match ctx.output_format {
        OutputFormat::Json => emit_json_payload(ctx, value),
        OutputFormat::Jsonl => output::emit_jsonl(std::slice::from_ref(value)),
        OutputFormat::Human | OutputFormat::Plain | OutputFormat::Tsv => {
            let mut layout = HumanLayout::for_format(ctx.output_format);
            render(&mut layout);
            output::emit_human(layout);
            Ok(())
        }
    }
}

/// Emit a list of records; TSV gets one row per item.
pub(crate) fn emit_list<T, R, F>(
    ctx: &AppContext,
    items: &[T],
    headers: &[&str],
    row: R,
    render: F,
) -> Result<()>
where
    T: Serialize,
    R: Fn(&T) -> Vec<String>,
    F: FnOnce(&mut HumanLayout),
{
    match ctx.output_format {
        OutputFormat::Json => emit_json_payload(ctx, &items),
        OutputFormat::Jsonl => output::emit_jsonl(items),
        OutputFormat::Tsv => {
            output::emit_tsv(headers, items, row);
            Ok(())
        }
        OutputFormat::Human | OutputFormat::Plain => {
            let mut layout = HumanLayout::for_format(ctx.output_format);
            render(&mut layout);
            output::emit_human(layout);
            Ok(())
        }
    }
}

fn emit_json_payload<T: Serialize>(ctx: &AppContext, value: &T) -> Result<()> {
    if ctx.config.output.include_metadata {
        output::emit_json(&output::robot_ok(value))
    } else {
        output::emit_json(value)
    }
}

/// clap value parser for `YYYY-MM-DD` dates.
pub(crate) fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

pub(crate) fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}
