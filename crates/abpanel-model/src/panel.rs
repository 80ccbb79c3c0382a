use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{PanelId, ReagentId};

/// A reusable, named panel template.
///
/// Holds reagent ids by reference: later edits or deletions in the inventory
/// change what the template shows, never the id list itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPanel {
    pub id: PanelId,
    pub name: String,
    pub reagent_ids: Vec<ReagentId>,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl SavedPanel {
    pub fn contains(&self, reagent: ReagentId) -> bool {
        self.reagent_ids.contains(&reagent)
    }
}
