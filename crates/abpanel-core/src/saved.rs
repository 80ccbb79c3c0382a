//! Named, reusable panel templates.

use std::collections::HashMap;

use abpanel_model::{
    IdSequence, NameScope, PanelError, PanelId, RecordKind, ReagentId, ReagentRecord, Result,
    SavedPanel,
};
use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::ledger::InventoryLedger;
use crate::search::name_key;

/// Saved panels plus a lowercase-name index that keeps names unique.
#[derive(Debug, Clone, Default)]
pub struct SavedPanelStore {
    panels: Vec<SavedPanel>,
    names: HashMap<String, PanelId>,
    ids: IdSequence,
}

impl SavedPanelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a template stamped with the current local time.
    pub fn save(&mut self, name: &str, reagent_ids: &[ReagentId], creator: &str) -> Result<SavedPanel> {
        self.save_at(name, reagent_ids, creator, Local::now().naive_local())
    }

    /// Saves a template with an explicit creation time.
    ///
    /// Fails on an empty selection, a blank name, or a name that matches an
    /// existing template case-insensitively.
    pub fn save_at(
        &mut self,
        name: &str,
        reagent_ids: &[ReagentId],
        creator: &str,
        created_at: NaiveDateTime,
    ) -> Result<SavedPanel> {
        if reagent_ids.is_empty() {
            return Err(PanelError::EmptySelection);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(PanelError::MissingName);
        }
        let key = name_key(name);
        if self.names.contains_key(&key) {
            return Err(PanelError::DuplicateName {
                name: name.to_string(),
                scope: NameScope::SavedPanels,
            });
        }

        let mut unique_ids = Vec::with_capacity(reagent_ids.len());
        for id in reagent_ids {
            if !unique_ids.contains(id) {
                unique_ids.push(*id);
            }
        }
        let panel = SavedPanel {
            id: PanelId::new(self.ids.take()),
            name: name.to_string(),
            reagent_ids: unique_ids,
            created_by: creator.to_string(),
            created_at,
        };
        self.names.insert(key, panel.id);
        self.panels.push(panel.clone());
        info!(panel_id = %panel.id, name, reagents = panel.reagent_ids.len(), "panel saved");
        Ok(panel)
    }

    pub fn delete(&mut self, id: PanelId) -> Result<SavedPanel> {
        let index = self
            .panels
            .iter()
            .position(|panel| panel.id == id)
            .ok_or_else(|| PanelError::not_found(RecordKind::SavedPanel, id.get()))?;
        let removed = self.panels.remove(index);
        self.names.remove(&name_key(&removed.name));
        info!(panel_id = %id, name = %removed.name, "saved panel deleted");
        Ok(removed)
    }

    /// Name and reagent ids of a template.
    pub fn load(&self, id: PanelId) -> Result<(String, Vec<ReagentId>)> {
        let panel = self.require(id)?;
        Ok((panel.name.clone(), panel.reagent_ids.clone()))
    }

    pub fn get(&self, id: PanelId) -> Option<&SavedPanel> {
        self.panels.iter().find(|panel| panel.id == id)
    }

    /// Reagents of a template that still exist, in inventory order.
    pub fn resolve<'a>(&self, id: PanelId, ledger: &'a InventoryLedger) -> Result<Vec<&'a ReagentRecord>> {
        let panel = self.require(id)?;
        Ok(ledger
            .records()
            .iter()
            .filter(|record| panel.contains(record.id))
            .collect())
    }

    /// Case-insensitive substring match on name, sorted by name.
    /// Equal names keep insertion order.
    pub fn search(&self, query: &str) -> Vec<&SavedPanel> {
        let query = query.to_lowercase();
        let mut found: Vec<&SavedPanel> = self
            .panels
            .iter()
            .filter(|panel| panel.name.to_lowercase().contains(&query))
            .collect();
        found.sort_by_key(|panel| panel.name.to_lowercase());
        found
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(&name_key(name))
    }

    /// Templates in insertion order.
    pub fn panels(&self) -> &[SavedPanel] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    fn require(&self, id: PanelId) -> Result<&SavedPanel> {
        self.get(id)
            .ok_or_else(|| PanelError::not_found(RecordKind::SavedPanel, id.get()))
    }
}
