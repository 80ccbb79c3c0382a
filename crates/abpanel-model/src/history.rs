//! Immutable records of executed panels.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::EntryId;

/// Volume deducted from one reagent, captured when the panel ran.
///
/// Stores the human-facing identity (antigen, metal) rather than a reagent id
/// so the entry stays meaningful after inventory churn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntibodyUsage {
    pub antigen: String,
    pub metal: String,
    /// µL
    pub volume_used: f64,
}

impl AntibodyUsage {
    /// "CD3(170Er)"
    pub fn token(&self) -> String {
        format!("{}({})", self.antigen, self.metal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub timestamp: NaiveDateTime,
    pub user: String,
    pub panel_name: String,
    /// Millions of cells.
    pub cell_count: f64,
    pub usages: Vec<AntibodyUsage>,
}

impl HistoryEntry {
    pub fn total_volume(&self) -> f64 {
        self.usages.iter().map(|usage| usage.volume_used).sum()
    }

    /// Usage tokens joined with "; ".
    pub fn antibody_list(&self) -> String {
        self.usages
            .iter()
            .map(AntibodyUsage::token)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
