//! Panel execution: validate, confirm, then deduct and record.
//!
//! Execution is split in two phases. [`ExecutionEngine::prepare`] runs every
//! check and fixes the per-reagent volumes into an [`ExecutionPlan`] without
//! touching state. [`ExecutionEngine::commit`] applies exactly those volumes.
//! A [`Confirm`] implementation sits between the two.
//!
//! Commit re-checks the plan against current stock and history before any
//! mutation, so a plan that went stale while waiting for confirmation is
//! rejected with a fresh shortfall report rather than driving stock negative.

use abpanel_model::{
    AntibodyUsage, ExecutionState, HistoryEntry, NameScope, PanelError, ReagentId, Result,
    Shortfall,
};
use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, info_span, warn};

use crate::composer::PanelComposer;
use crate::history::HistoryLog;
use crate::ledger::InventoryLedger;
use crate::volume::required_volume;

/// One reagent's deduction, fixed at validation time.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDeduction {
    pub reagent_id: ReagentId,
    pub antigen: String,
    pub metal: String,
    pub required: f64,
    /// Stock seen when the plan was made.
    pub available: f64,
}

/// A validated panel awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub panel_name: String,
    pub cell_count: f64,
    pub deductions: Vec<PlannedDeduction>,
}

impl ExecutionPlan {
    pub fn total_volume(&self) -> f64 {
        self.deductions.iter().map(|line| line.required).sum()
    }
}

/// Caller decision between a successful validation and the commit.
pub trait Confirm {
    fn confirm(&self, plan: &ExecutionPlan) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&ExecutionPlan) -> bool,
{
    fn confirm(&self, plan: &ExecutionPlan) -> bool {
        self(plan)
    }
}

/// Confirms every plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _plan: &ExecutionPlan) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Committed(HistoryEntry),
    /// Confirmation was declined; nothing changed.
    Cancelled,
}

impl ExecutionOutcome {
    pub fn entry(&self) -> Option<&HistoryEntry> {
        match self {
            ExecutionOutcome::Committed(entry) => Some(entry),
            ExecutionOutcome::Cancelled => None,
        }
    }
}

/// Drives the execution state machine.
#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    state: ExecutionState,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Checks the selection and builds a plan. Never mutates the ledger or log.
    ///
    /// Order of checks: empty selection, blank name, name already executed,
    /// cell count, then stock. Every short reagent is reported, not just the first.
    pub fn prepare(
        &mut self,
        composer: &PanelComposer,
        ledger: &InventoryLedger,
        history: &HistoryLog,
    ) -> Result<ExecutionPlan> {
        self.state = ExecutionState::Validating;
        let result = plan_selection(composer, ledger, history);
        self.state = match &result {
            Ok(_) => ExecutionState::AwaitingConfirmation,
            Err(_) => ExecutionState::Blocked,
        };
        if let Err(error) = &result {
            warn!(panel = composer.name(), %error, "execution blocked");
        }
        result
    }

    /// Applies a plan: deducts every planned volume and appends the entry.
    ///
    /// Uses the plan's volumes and cell count verbatim. Re-validates first;
    /// on failure nothing is mutated.
    pub fn commit(
        &mut self,
        plan: ExecutionPlan,
        ledger: &mut InventoryLedger,
        history: &mut HistoryLog,
        user: &str,
    ) -> Result<HistoryEntry> {
        self.commit_at(plan, ledger, history, user, Local::now().naive_local())
    }

    pub fn commit_at(
        &mut self,
        plan: ExecutionPlan,
        ledger: &mut InventoryLedger,
        history: &mut HistoryLog,
        user: &str,
        timestamp: NaiveDateTime,
    ) -> Result<HistoryEntry> {
        let span = info_span!("commit", panel = %plan.panel_name);
        let _guard = span.enter();

        if let Err(error) = recheck(&plan, ledger, history) {
            self.state = ExecutionState::Blocked;
            warn!(%error, "plan is stale; nothing committed");
            return Err(error);
        }

        let entry = HistoryEntry {
            id: history.next_id(),
            timestamp,
            user: user.to_string(),
            panel_name: plan.panel_name.clone(),
            cell_count: plan.cell_count,
            usages: plan
                .deductions
                .iter()
                .map(|line| AntibodyUsage {
                    antigen: line.antigen.clone(),
                    metal: line.metal.clone(),
                    volume_used: line.required,
                })
                .collect(),
        };
        // Claims the panel name before any stock moves.
        history.append(entry.clone())?;

        for line in &plan.deductions {
            ledger.deduct(line.reagent_id, line.required);
            debug!(
                reagent_id = %line.reagent_id,
                antigen = %line.antigen,
                volume = line.required,
                "stock deducted"
            );
        }
        self.state = ExecutionState::Committed;
        info!(
            entry_id = %entry.id,
            reagents = entry.usages.len(),
            total_volume = entry.total_volume(),
            "panel executed"
        );
        Ok(entry)
    }

    /// Prepare, ask `confirm`, commit. Declining leaves everything untouched.
    ///
    /// Does not clear the composer; see [`crate::Session::execute`].
    pub fn execute(
        &mut self,
        composer: &PanelComposer,
        ledger: &mut InventoryLedger,
        history: &mut HistoryLog,
        user: &str,
        confirm: &dyn Confirm,
    ) -> Result<ExecutionOutcome> {
        let span = info_span!("execute", panel = composer.name());
        let _guard = span.enter();

        let plan = self.prepare(composer, ledger, history)?;
        if !confirm.confirm(&plan) {
            self.state = ExecutionState::Idle;
            info!("execution cancelled");
            return Ok(ExecutionOutcome::Cancelled);
        }
        self.commit(plan, ledger, history, user)
            .map(ExecutionOutcome::Committed)
    }

    /// Back to idle after a commit has been acknowledged.
    pub fn reset(&mut self) {
        self.state = ExecutionState::Idle;
    }
}

fn plan_selection(
    composer: &PanelComposer,
    ledger: &InventoryLedger,
    history: &HistoryLog,
) -> Result<ExecutionPlan> {
    if composer.is_empty() {
        return Err(PanelError::EmptySelection);
    }
    let name = composer.name().trim();
    if name.is_empty() {
        return Err(PanelError::MissingName);
    }
    check_name(name, history)?;

    let cell_count = composer.cell_count();
    if !cell_count.is_finite() || cell_count <= 0.0 {
        return Err(PanelError::validation(
            "cell count",
            format!("cell count must be a positive number, got {cell_count}"),
        ));
    }
    let mut deductions = Vec::with_capacity(composer.selected().len());
    let mut shortfalls = Vec::new();
    for id in composer.selected() {
        let Some(reagent) = ledger.get(*id) else {
            // Removed from the inventory after it was selected.
            continue;
        };
        let required = required_volume(reagent, cell_count);
        let available = reagent.stock_volume;
        if required > available {
            shortfalls.push(Shortfall {
                antigen: reagent.antigen.clone(),
                metal: reagent.metal.clone(),
                required,
                available,
            });
        }
        deductions.push(PlannedDeduction {
            reagent_id: reagent.id,
            antigen: reagent.antigen.clone(),
            metal: reagent.metal.clone(),
            required,
            available,
        });
    }
    if !shortfalls.is_empty() {
        return Err(PanelError::InsufficientStock(shortfalls));
    }
    if deductions.is_empty() {
        return Err(PanelError::EmptySelection);
    }
    debug!(
        panel = name,
        cell_count,
        reagents = deductions.len(),
        "execution plan ready"
    );
    Ok(ExecutionPlan {
        panel_name: name.to_string(),
        cell_count,
        deductions,
    })
}

fn check_name(name: &str, history: &HistoryLog) -> Result<()> {
    if history.contains_name(name) {
        return Err(PanelError::DuplicateName {
            name: name.to_string(),
            scope: NameScope::History,
        });
    }
    Ok(())
}

fn recheck(plan: &ExecutionPlan, ledger: &InventoryLedger, history: &HistoryLog) -> Result<()> {
    check_name(&plan.panel_name, history)?;
    let shortfalls: Vec<Shortfall> = plan
        .deductions
        .iter()
        .filter_map(|line| {
            let available = ledger
                .get(line.reagent_id)
                .map_or(0.0, |reagent| reagent.stock_volume);
            (line.required > available).then(|| Shortfall {
                antigen: line.antigen.clone(),
                metal: line.metal.clone(),
                required: line.required,
                available,
            })
        })
        .collect();
    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(PanelError::InsufficientStock(shortfalls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abpanel_model::ReagentDraft;

    fn selection(ledger: &InventoryLedger, name: &str, cells: f64) -> PanelComposer {
        let mut composer = PanelComposer::default();
        for record in ledger.records() {
            composer.toggle(record.id);
        }
        composer.set_name(name);
        composer.set_cell_count(cells);
        composer
    }

    #[test]
    fn rejects_non_positive_cell_count() {
        let ledger = InventoryLedger::seeded();
        let history = HistoryLog::new();
        let mut engine = ExecutionEngine::new();
        for cells in [0.0, -4.0, f64::NAN] {
            let composer = selection(&ledger, "Bad", cells);
            let error = engine.prepare(&composer, &ledger, &history).unwrap_err();
            assert!(matches!(error, PanelError::Validation { field: "cell count", .. }));
            assert_eq!(engine.state(), ExecutionState::Blocked);
        }
    }

    #[test]
    fn prepare_checks_in_order() {
        let ledger = InventoryLedger::seeded();
        let history = HistoryLog::new();
        let mut engine = ExecutionEngine::new();

        let empty = PanelComposer::default();
        assert_eq!(
            engine.prepare(&empty, &ledger, &history),
            Err(PanelError::EmptySelection)
        );
        let unnamed = selection(&ledger, "  ", 4.0);
        assert_eq!(
            engine.prepare(&unnamed, &ledger, &history),
            Err(PanelError::MissingName)
        );
        assert_eq!(engine.state(), ExecutionState::Blocked);
    }

    #[test]
    fn prepare_reports_every_shortfall() {
        let ledger = InventoryLedger::seeded();
        let history = HistoryLog::new();
        let mut engine = ExecutionEngine::new();
        // 2.0 µL/test at 4M cells; 500M cells needs 250 µL of each.
        let composer = selection(&ledger, "Big", 500.0);
        let error = engine.prepare(&composer, &ledger, &history).unwrap_err();
        let shortfalls = error.shortfalls().unwrap();
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].antigen, "CD8");
        assert_eq!(shortfalls[0].required, 250.0);
        assert_eq!(shortfalls[0].available, 35.0);

        let composer = selection(&ledger, "Huge", 1000.0);
        let error = engine.prepare(&composer, &ledger, &history).unwrap_err();
        assert_eq!(error.shortfalls().map(<[Shortfall]>::len), Some(2));
    }

    #[test]
    fn exact_stock_is_enough() {
        let mut ledger = InventoryLedger::new();
        let id = ledger
            .add(&ReagentDraft::new("CD19", "2").with_volume_per_test("2"))
            .unwrap();
        let mut history = HistoryLog::new();
        let mut composer = PanelComposer::default();
        composer.toggle(id);
        composer.set_name("B");
        let mut engine = ExecutionEngine::new();
        let outcome = engine
            .execute(&composer, &mut ledger, &mut history, "amy", &AutoConfirm)
            .unwrap();
        assert!(outcome.entry().is_some());
        assert_eq!(ledger.get(id).unwrap().stock_volume, 0.0);
    }

    #[test]
    fn declined_confirmation_changes_nothing() {
        let mut ledger = InventoryLedger::seeded();
        let mut history = HistoryLog::new();
        let composer = selection(&ledger, "PanelA", 4.0);
        let mut engine = ExecutionEngine::new();
        let decline = |_: &ExecutionPlan| false;
        let outcome = engine
            .execute(&composer, &mut ledger, &mut history, "amy", &decline)
            .unwrap();
        assert_eq!(outcome, ExecutionOutcome::Cancelled);
        assert_eq!(engine.state(), ExecutionState::Idle);
        assert_eq!(ledger.total_stock(), 985.0);
        assert!(history.is_empty());
    }

    #[test]
    fn stale_plan_is_rejected_at_commit() {
        let mut ledger = InventoryLedger::seeded();
        let mut history = HistoryLog::new();
        let composer = selection(&ledger, "PanelA", 40.0);
        let mut engine = ExecutionEngine::new();
        let plan = engine.prepare(&composer, &ledger, &history).unwrap();
        assert_eq!(engine.state(), ExecutionState::AwaitingConfirmation);

        // Another operator drains CD8 between validation and commit.
        let cd8 = ledger.find_by_identity("CD8", "146Nd").unwrap().id;
        ledger.deduct(cd8, 30.0);
        let before = ledger.total_stock();

        let error = engine
            .commit(plan, &mut ledger, &mut history, "amy")
            .unwrap_err();
        let shortfalls = error.shortfalls().unwrap();
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].available, 5.0);
        assert_eq!(ledger.total_stock(), before);
        assert!(history.is_empty());
    }

    #[test]
    fn name_taken_while_waiting_leaves_stock_untouched() {
        let mut ledger = InventoryLedger::seeded();
        let mut history = HistoryLog::new();
        let composer = selection(&ledger, "PanelA", 4.0);
        let mut engine = ExecutionEngine::new();
        let first = engine.prepare(&composer, &ledger, &history).unwrap();
        let second = engine.prepare(&composer, &ledger, &history).unwrap();

        engine
            .commit(first, &mut ledger, &mut history, "amy")
            .unwrap();
        let after_first = ledger.total_stock();

        let error = engine
            .commit(second, &mut ledger, &mut history, "bo")
            .unwrap_err();
        assert!(matches!(
            error,
            PanelError::DuplicateName {
                scope: NameScope::History,
                ..
            }
        ));
        assert_eq!(ledger.total_stock(), after_first);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn commit_uses_planned_volumes() {
        let mut ledger = InventoryLedger::seeded();
        let mut history = HistoryLog::new();
        let mut composer = selection(&ledger, "PanelA", 8.0);
        let mut engine = ExecutionEngine::new();
        let plan = engine.prepare(&composer, &ledger, &history).unwrap();
        // Cell count changes after validation must not leak into the commit.
        composer.set_cell_count(400.0);
        let entry = engine
            .commit(plan, &mut ledger, &mut history, "amy")
            .unwrap();
        assert_eq!(entry.cell_count, 8.0);
        assert!(entry.usages.iter().all(|usage| usage.volume_used == 4.0));
        assert_eq!(engine.state(), ExecutionState::Committed);
    }
}
