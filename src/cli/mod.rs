//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;

/// Tree guardian documentation and class skill tracking
#[derive(Parser, Debug)]
#[command(name = "tg")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub robot: bool,

    /// Output format (human, json, jsonl, plain, tsv)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: <root>/config.toml)
    #[arg(long, global = true, env = "TG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory holding the database
    #[arg(long, global = true, env = "TG_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format from flags alone.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_args(self.robot, self.output_format)
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, edit and inspect documentation entries
    Doc(commands::doc::DocArgs),

    /// Inspect class skill aggregates
    Class(commands::class::ClassArgs),

    /// Inspect the skill catalog and register custom skills
    Skill(commands::skill::SkillArgs),

    /// Manage activities
    Activity(commands::activity::ActivityArgs),

    /// Rebuild every class aggregate from documentation entries
    Resync(commands::resync::ResyncArgs),

    /// Show or change configuration
    Config(commands::config::ConfigArgs),

    /// Check database integrity and class key health
    Doctor(commands::doctor::DoctorArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn robot_flag_forces_json() {
        let cli = Cli::try_parse_from(["tg", "-m", "class", "list"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Json);

        let cli = Cli::try_parse_from(["tg", "--output-format", "tsv", "doc", "list"]).unwrap();
        assert_eq!(cli.output_format(), OutputFormat::Tsv);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["tg", "-vv", "skill", "list"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
