use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use abpanel_cli::selection::resolve_all;
use abpanel_core::{
    AutoConfirm, Confirm, ExecutionOutcome, ExecutionPlan, Session, filter_inventory,
};
use abpanel_model::{LabOptions, PanelError};
use abpanel_report::{export_history, load_inventory, save_inventory};

use crate::cli::{Cli, ExecuteArgs, InventoryArgs, PanelArgs};
use crate::summary::{print_entry, print_inventory, print_panel, print_shortfalls};

/// How a command ended, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Done,
    /// The operator declined the confirmation prompt.
    Cancelled,
    /// Stock or name checks refused the panel.
    Blocked,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Done | RunStatus::Cancelled => 0,
            RunStatus::Blocked => 2,
        }
    }
}

pub fn open_session(cli: &Cli) -> Result<Session> {
    let options = LabOptions::new().with_seed_inventory(cli.inventory.is_none());
    let session = Session::new(&cli.user, options).context("start session")?;
    match &cli.inventory {
        Some(path) => {
            let ledger = load_inventory(path)
                .with_context(|| format!("load inventory from {}", path.display()))?;
            Ok(session.with_ledger(ledger))
        }
        None => Ok(session),
    }
}

pub fn run_inventory(args: &InventoryArgs, session: &Session) -> Result<RunStatus> {
    let records = filter_inventory(session.ledger.records(), &args.search, args.low_stock);
    print_inventory(&records, session.ledger.alert_count());
    Ok(RunStatus::Done)
}

pub fn run_plan(args: &PanelArgs, session: &mut Session) -> Result<RunStatus> {
    compose(args, session)?;
    print_panel(&session.summary());
    match session.prepare() {
        Ok(plan) => {
            println!(
                "Ready: {} reagents, {:.2} µL total.",
                plan.deductions.len(),
                plan.total_volume()
            );
            Ok(RunStatus::Done)
        }
        Err(error) => blocked(error),
    }
}

pub fn run_execute(args: &ExecuteArgs, session: &mut Session) -> Result<RunStatus> {
    compose(&args.panel, session)?;
    print_panel(&session.summary());
    let confirm: &dyn Confirm = if args.yes { &AutoConfirm } else { &StdinConfirm };
    let entry = match session.execute(confirm) {
        Ok(ExecutionOutcome::Committed(entry)) => entry,
        Ok(ExecutionOutcome::Cancelled) => {
            println!("Cancelled; nothing changed.");
            return Ok(RunStatus::Cancelled);
        }
        Err(error) => return blocked(error),
    };
    print_entry(&entry);

    let alerts = session.ledger.alert_count();
    if alerts > 0 {
        warn!(alerts, "reagents at or below their alert threshold");
        println!("{alerts} reagent(s) now at or below their alert threshold.");
    }
    if let Some(path) = &args.inventory_out {
        save_inventory(&session.ledger, path)
            .with_context(|| format!("write inventory to {}", path.display()))?;
        println!("Inventory: {}", path.display());
    }
    if let Some(path) = &args.history_out {
        export_history(&session.history, path)
            .with_context(|| format!("write history to {}", path.display()))?;
        println!("History: {}", path.display());
    }
    Ok(RunStatus::Done)
}

/// Loads the command-line panel into the session composer.
fn compose(args: &PanelArgs, session: &mut Session) -> Result<()> {
    let ids = resolve_all(&args.reagents, &session.ledger)?;
    let composer = &mut session.composer;
    composer.clear();
    composer.set_name(args.name.as_str());
    composer.set_cell_count(args.cells);
    for id in ids {
        composer.toggle(id);
    }
    info!(
        panel = composer.name(),
        reagents = composer.selected().len(),
        "panel composed"
    );
    Ok(())
}

/// Refusals the operator can fix are reported; anything else is an error.
fn blocked(error: PanelError) -> Result<RunStatus> {
    match error {
        PanelError::InsufficientStock(shortfalls) => {
            print_shortfalls(&shortfalls);
            Ok(RunStatus::Blocked)
        }
        PanelError::EmptySelection
        | PanelError::MissingName
        | PanelError::DuplicateName { .. }
        | PanelError::Validation { .. } => {
            eprintln!("Blocked: {error}");
            Ok(RunStatus::Blocked)
        }
        other => Err(other.into()),
    }
}

/// Asks on the terminal before committing.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, plan: &ExecutionPlan) -> bool {
        print!(
            "Execute '{}' for {} million cells, deducting {:.2} µL across {} reagents? [y/N] ",
            plan.panel_name,
            plan.cell_count,
            plan.total_volume(),
            plan.deductions.len()
        );
        if let Err(error) = io::stdout().flush() {
            warn!(%error, "could not flush prompt");
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(error) => {
                warn!(%error, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
