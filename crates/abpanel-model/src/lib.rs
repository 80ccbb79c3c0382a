pub mod error;
pub mod execution;
pub mod history;
pub mod ids;
pub mod options;
pub mod panel;
pub mod reagent;

pub use error::{NameScope, PanelError, RecordKind, Result};
pub use execution::{ExecutionState, Shortfall};
pub use history::{AntibodyUsage, HistoryEntry};
pub use ids::{EntryId, IdSequence, PanelId, ReagentId};
pub use options::{DEFAULT_ALERT_THRESHOLD, LabOptions, REFERENCE_CELL_COUNT};
pub use panel::SavedPanel;
pub use reagent::{EditOutcome, ReagentDraft, ReagentField, ReagentRecord, StainType};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_lists_every_shortfall() {
        let error = PanelError::InsufficientStock(vec![
            Shortfall {
                antigen: "CD8".to_string(),
                metal: "146Nd".to_string(),
                required: 5.0,
                available: 1.5,
            },
            Shortfall {
                antigen: "CD4".to_string(),
                metal: "145Nd".to_string(),
                required: 5.0,
                available: 0.0,
            },
        ]);
        let message = error.to_string();
        assert!(message.contains("CD8 (146Nd) needs 5.00 µL, only 1.50 µL available"));
        assert!(message.contains("CD4 (145Nd)"));
        assert_eq!(error.shortfalls().map(<[Shortfall]>::len), Some(2));
    }

    #[test]
    fn duplicate_name_mentions_scope() {
        let error = PanelError::DuplicateName {
            name: "PanelA".to_string(),
            scope: NameScope::History,
        };
        assert_eq!(
            error.to_string(),
            "a panel named 'PanelA' already exists in executed panels"
        );
    }
}
