//! Panel composition and execution engine for an antibody inventory.

pub mod composer;
pub mod engine;
pub mod history;
pub mod ledger;
pub mod saved;
pub mod search;
pub mod session;
pub mod shared;
pub mod volume;

pub use composer::{PanelComposer, PanelSummary, SummaryLine};
pub use engine::{
    AutoConfirm, Confirm, ExecutionEngine, ExecutionOutcome, ExecutionPlan, PlannedDeduction,
};
pub use history::{HistoryLog, UndoReport};
pub use ledger::InventoryLedger;
pub use saved::SavedPanelStore;
pub use search::{
    StainGroups, filter_inventory, group_by_stain, matches_query, numeric_prefix, sort_key,
    sort_records,
};
pub use session::Session;
pub use shared::SharedSession;
pub use volume::{INTRACELLULAR_FACTOR, required_volume};
