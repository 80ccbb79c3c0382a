//! Per-operator session context.
//!
//! The [`Session`] bundles everything an operator works with:
//!
//! - **Identity**: the current user name stamped on saved panels and history
//! - **Inventory**: the [`InventoryLedger`]
//! - **Selection**: the [`PanelComposer`] being built
//! - **Templates**: the [`SavedPanelStore`]
//! - **Audit trail**: the [`HistoryLog`]
//! - **Options**: session defaults ([`LabOptions`])
//!
//! There is no ambient state; every operation goes through a session.

use abpanel_model::{
    EntryId, HistoryEntry, LabOptions, PanelError, PanelId, RecordKind, Result, SavedPanel,
};
use tracing::info;

use crate::composer::{PanelComposer, PanelSummary};
use crate::engine::{Confirm, ExecutionEngine, ExecutionOutcome, ExecutionPlan};
use crate::history::{HistoryLog, UndoReport};
use crate::ledger::InventoryLedger;
use crate::saved::SavedPanelStore;

#[derive(Debug, Clone)]
pub struct Session {
    user: String,
    pub options: LabOptions,
    pub ledger: InventoryLedger,
    pub composer: PanelComposer,
    pub saved: SavedPanelStore,
    pub history: HistoryLog,
    pub engine: ExecutionEngine,
}

impl Session {
    /// Starts a session for `user`, which must not be blank.
    pub fn new(user: &str, options: LabOptions) -> Result<Self> {
        let user = user.trim();
        if user.is_empty() {
            return Err(PanelError::validation("user", "user name is required"));
        }
        let ledger = if options.seed_inventory {
            InventoryLedger::seeded()
        } else {
            InventoryLedger::new()
        }
        .with_default_alert_threshold(options.default_alert_threshold);
        info!(user, reagents = ledger.len(), "session started");
        Ok(Self {
            user: user.to_string(),
            composer: PanelComposer::new(options.default_cell_count),
            ledger,
            saved: SavedPanelStore::new(),
            history: HistoryLog::new(),
            engine: ExecutionEngine::new(),
            options,
        })
    }

    /// Replaces the inventory, keeping the session's alert default.
    pub fn with_ledger(mut self, ledger: InventoryLedger) -> Self {
        self.ledger = ledger.with_default_alert_threshold(self.options.default_alert_threshold);
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn summary(&self) -> PanelSummary<'_> {
        self.composer.summary(&self.ledger)
    }

    /// Saves the current selection as a template under the composer's name.
    pub fn save_selection(&mut self) -> Result<SavedPanel> {
        self.saved
            .save(self.composer.name(), self.composer.selected(), &self.user)
    }

    /// Loads a saved template into the composer.
    pub fn load_saved(&mut self, id: PanelId) -> Result<()> {
        let panel = self
            .saved
            .get(id)
            .ok_or_else(|| PanelError::not_found(RecordKind::SavedPanel, id.get()))?;
        self.composer.load(panel, &self.ledger);
        Ok(())
    }

    /// Validation only; nothing is mutated.
    pub fn prepare(&mut self) -> Result<ExecutionPlan> {
        self.engine
            .prepare(&self.composer, &self.ledger, &self.history)
    }

    /// Commits a plan produced by [`Session::prepare`] and clears the composer.
    pub fn commit(&mut self, plan: ExecutionPlan) -> Result<HistoryEntry> {
        let entry = self
            .engine
            .commit(plan, &mut self.ledger, &mut self.history, &self.user)?;
        self.composer.clear();
        Ok(entry)
    }

    /// Validates, asks `confirm`, and commits. The composer is cleared only
    /// when the panel was committed.
    pub fn execute(&mut self, confirm: &dyn Confirm) -> Result<ExecutionOutcome> {
        let outcome = self.engine.execute(
            &self.composer,
            &mut self.ledger,
            &mut self.history,
            &self.user,
            confirm,
        )?;
        if matches!(outcome, ExecutionOutcome::Committed(_)) {
            self.composer.clear();
        }
        Ok(outcome)
    }

    pub fn undo(&mut self, id: EntryId) -> Result<UndoReport> {
        self.history.undo(id, &mut self.ledger)
    }
}
