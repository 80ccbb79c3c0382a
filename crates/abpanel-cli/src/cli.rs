//! CLI argument definitions.

use std::path::PathBuf;

use abpanel_model::REFERENCE_CELL_COUNT;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use abpanel_cli::selection::ReagentRef;

#[derive(Parser)]
#[command(
    name = "abpanel",
    version,
    about = "Antibody panel builder - track conjugated antibody stock and run staining panels",
    long_about = "Track metal-conjugated antibody stock for mass cytometry.\n\n\
                  Plan a staining panel, check that every reagent has enough stock,\n\
                  and deduct the scaled volumes with a history entry when it runs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Operator name stamped on executed panels.
    #[arg(long = "user", default_value = "operator", global = true)]
    pub user: String,

    /// Load the inventory from this CSV instead of the starter reagents.
    #[arg(long = "inventory", value_name = "CSV", global = true)]
    pub inventory: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the reagent inventory.
    Inventory(InventoryArgs),

    /// Price a panel and check stock without changing anything.
    Plan(PanelArgs),

    /// Run a panel: deduct stock and record it in the history.
    Execute(ExecuteArgs),
}

#[derive(Args)]
pub struct InventoryArgs {
    /// Only reagents whose antigen, metal or clone contains this text.
    #[arg(long = "search", value_name = "QUERY", default_value = "")]
    pub search: String,

    /// Only reagents at or below their alert threshold.
    #[arg(long = "low-stock")]
    pub low_stock: bool,
}

#[derive(Args)]
pub struct PanelArgs {
    /// Panel name; must be unique among executed panels.
    #[arg(long = "name", default_value = "")]
    pub name: String,

    /// Cell count in millions.
    #[arg(long = "cells", default_value_t = REFERENCE_CELL_COUNT)]
    pub cells: f64,

    /// Reagent by id, ANTIGEN or ANTIGEN:METAL. Repeat for each reagent.
    #[arg(long = "reagent", short = 'r', value_name = "REAGENT")]
    pub reagents: Vec<ReagentRef>,
}

#[derive(Args)]
pub struct ExecuteArgs {
    #[command(flatten)]
    pub panel: PanelArgs,

    /// Skip the confirmation prompt.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Write the updated inventory CSV here after a successful run. The file
    /// keeps stain types and can be passed back with --inventory.
    #[arg(long = "inventory-out", value_name = "PATH")]
    pub inventory_out: Option<PathBuf>,

    /// Write the panel history CSV here after a successful run.
    #[arg(long = "history-out", value_name = "PATH")]
    pub history_out: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
