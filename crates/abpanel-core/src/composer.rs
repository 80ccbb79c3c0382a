//! In-progress panel selection.

use abpanel_model::{REFERENCE_CELL_COUNT, ReagentId, ReagentRecord, SavedPanel};

use crate::ledger::InventoryLedger;
use crate::volume::required_volume;

/// One selected reagent with the volume it will consume.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine<'a> {
    pub reagent: &'a ReagentRecord,
    pub required: f64,
}

/// Priced view of the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSummary<'a> {
    pub name: String,
    pub cell_count: f64,
    pub lines: Vec<SummaryLine<'a>>,
}

impl PanelSummary<'_> {
    pub fn total_volume(&self) -> f64 {
        self.lines.iter().map(|line| line.required).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Name, cell count and reagent set of the panel being built.
///
/// Setters do no validation; saving and executing check the values.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelComposer {
    name: String,
    cell_count: f64,
    selection: Vec<ReagentId>,
    default_cell_count: f64,
}

impl Default for PanelComposer {
    fn default() -> Self {
        Self::new(REFERENCE_CELL_COUNT)
    }
}

impl PanelComposer {
    pub fn new(default_cell_count: f64) -> Self {
        Self {
            name: String::new(),
            cell_count: default_cell_count,
            selection: Vec::new(),
            default_cell_count,
        }
    }

    /// Selects the reagent if absent, deselects it if present.
    /// Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: ReagentId) -> bool {
        if let Some(index) = self.selection.iter().position(|selected| *selected == id) {
            self.selection.remove(index);
            false
        } else {
            self.selection.push(id);
            true
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_cell_count(&mut self, cells: f64) {
        self.cell_count = cells;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell_count(&self) -> f64 {
        self.cell_count
    }

    /// Selected ids in selection order.
    pub fn selected(&self) -> &[ReagentId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ReagentId) -> bool {
        self.selection.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Pairs every selected reagent still in the ledger with its volume.
    pub fn summary<'a>(&self, ledger: &'a InventoryLedger) -> PanelSummary<'a> {
        let lines = self
            .selection
            .iter()
            .filter_map(|id| ledger.get(*id))
            .map(|reagent| SummaryLine {
                reagent,
                required: required_volume(reagent, self.cell_count),
            })
            .collect();
        PanelSummary {
            name: self.name.clone(),
            cell_count: self.cell_count,
            lines,
        }
    }

    /// Replaces the selection with a saved template.
    ///
    /// Takes the template's name and the ids that still exist in the ledger.
    /// The cell count is left as is.
    pub fn load(&mut self, panel: &SavedPanel, ledger: &InventoryLedger) {
        self.name.clone_from(&panel.name);
        self.selection = ledger
            .records()
            .iter()
            .filter(|record| panel.contains(record.id))
            .map(|record| record.id)
            .collect();
    }

    /// Empties the selection and resets name and cell count.
    pub fn clear(&mut self) {
        self.name.clear();
        self.cell_count = self.default_cell_count;
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_membership() {
        let mut composer = PanelComposer::default();
        let id = ReagentId::new(1);
        assert!(composer.toggle(id));
        assert!(composer.is_selected(id));
        assert!(!composer.toggle(id));
        assert!(composer.is_empty());
    }

    #[test]
    fn summary_prices_each_selected_reagent() {
        let ledger = InventoryLedger::seeded();
        let mut composer = PanelComposer::default();
        for record in ledger.records() {
            composer.toggle(record.id);
        }
        composer.set_cell_count(8.0);
        let summary = composer.summary(&ledger);
        assert_eq!(summary.lines.len(), 3);
        assert!(summary.lines.iter().all(|line| line.required == 4.0));
        assert_eq!(summary.total_volume(), 12.0);
    }

    #[test]
    fn clear_resets_defaults() {
        let mut composer = PanelComposer::new(6.0);
        composer.toggle(ReagentId::new(3));
        composer.set_name("Myeloid");
        composer.set_cell_count(12.0);
        composer.clear();
        assert!(composer.is_empty());
        assert_eq!(composer.name(), "");
        assert_eq!(composer.cell_count(), 6.0);
    }
}
