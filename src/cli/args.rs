// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for applytrack

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::formatter::OutputFormat;
use crate::template::SyntaxChoice;

#[derive(Parser, Debug)]
#[command(name = "applytrack")]
#[command(about = "Fill job search documents and summarize application outcomes")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill a template's placeholders with values
    Render {
        #[arg(help = "Template path or builtin:<name>")]
        template: String,

        #[arg(
            short = 'V',
            long = "var",
            help = "Placeholder value (key=value), repeatable"
        )]
        vars: Vec<String>,

        #[arg(long, help = "YAML or JSON file of placeholder values")]
        vars_file: Option<PathBuf>,

        #[arg(long, default_value = "auto", help = "Placeholder syntax: auto, mustache or bracket")]
        syntax: SyntaxChoice,

        #[arg(long, help = "Fail when any placeholder is left unfilled")]
        strict: bool,

        #[arg(short, long, help = "Output file (stdout when absent)")]
        output: Option<PathBuf>,
    },

    /// List the placeholders in a template
    Scan {
        #[arg(help = "Template path or builtin:<name>")]
        template: String,

        #[arg(long, default_value = "auto", help = "Placeholder syntax: auto, mustache or bracket")]
        syntax: SyntaxChoice,

        #[arg(long, default_value = "text", help = "Output format: text, json or yaml")]
        format: OutputFormat,
    },

    /// Check a template's placeholders for structural problems
    Lint {
        #[arg(help = "Template path or builtin:<name>")]
        template: String,

        #[arg(long, default_value = "auto", help = "Placeholder syntax: auto, mustache or bracket")]
        syntax: SyntaxChoice,

        #[arg(long, help = "Treat warnings as failures")]
        strict: bool,

        #[arg(long, default_value = "text", help = "Output format: text, json or yaml")]
        format: OutputFormat,
    },

    /// Browse the built-in documents
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },

    /// Write a built-in document to a new file
    Init {
        #[arg(help = "Name of the document to create")]
        name: String,

        #[arg(short, long, help = "Output directory", default_value = ".")]
        output_dir: PathBuf,

        #[arg(long, help = "Built-in document to copy", default_value = "weekly-report")]
        document: String,
    },

    /// Compute market aggregates from a tracker CSV
    Market {
        #[arg(help = "Path to the application tracker CSV")]
        tracker: PathBuf,

        #[arg(short, long, help = "Directory for the JSON aggregate files")]
        output_dir: Option<PathBuf>,

        #[arg(long, help = "Reference date (YYYY-MM-DD), defaults to today")]
        as_of: Option<NaiveDate>,

        #[arg(long, help = "Decay half-life in days")]
        half_life: Option<f64>,
    },

    /// Render the weekly report from a tracker CSV
    Report {
        #[arg(help = "Path to the application tracker CSV")]
        tracker: PathBuf,

        #[arg(long, help = "Template path or builtin:<name>", default_value = "builtin:weekly-report")]
        template: String,

        #[arg(
            short = 'V',
            long = "var",
            help = "Override a report value (key=value), repeatable"
        )]
        vars: Vec<String>,

        #[arg(long, help = "Reference date (YYYY-MM-DD), defaults to today")]
        as_of: Option<NaiveDate>,

        #[arg(long, help = "Fail when any placeholder is left unfilled")]
        strict: bool,

        #[arg(short, long, help = "Output file (stdout when absent)")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List the built-in documents
    List,

    /// Print a built-in document
    Show {
        #[arg(help = "Document name")]
        name: String,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
