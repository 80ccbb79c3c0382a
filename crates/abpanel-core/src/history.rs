//! Executed-panel audit trail and undo.

use std::collections::HashMap;

use abpanel_model::{
    AntibodyUsage, EntryId, HistoryEntry, IdSequence, NameScope, PanelError, RecordKind, Result,
};
use tracing::{info, info_span, warn};

use crate::ledger::InventoryLedger;
use crate::search::name_key;

/// What an undo managed to put back.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoReport {
    pub entry: HistoryEntry,
    pub restored: Vec<AntibodyUsage>,
    /// Usages whose (antigen, metal) no longer exists in the ledger.
    pub skipped: Vec<AntibodyUsage>,
}

impl UndoReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// History entries in insertion order, with a lowercase panel-name index.
///
/// The name index is separate from [`crate::SavedPanelStore`]'s.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    names: HashMap<String, EntryId>,
    ids: IdSequence,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the id for the next entry.
    pub fn next_id(&mut self) -> EntryId {
        EntryId::new(self.ids.take())
    }

    /// Appends an entry. Rejects a panel name already in the log.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<EntryId> {
        let key = name_key(&entry.panel_name);
        if self.names.contains_key(&key) {
            return Err(PanelError::DuplicateName {
                name: entry.panel_name,
                scope: NameScope::History,
            });
        }
        self.ids.bump_past(entry.id.get());
        let id = entry.id;
        self.names.insert(key, id);
        self.entries.push(entry);
        Ok(id)
    }

    /// Removes an entry without touching stock.
    pub fn delete_by_id(&mut self, id: EntryId) -> Result<HistoryEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| PanelError::not_found(RecordKind::HistoryEntry, id.get()))?;
        let removed = self.entries.remove(index);
        self.names.remove(&name_key(&removed.panel_name));
        info!(entry_id = %id, panel = %removed.panel_name, "history entry deleted");
        Ok(removed)
    }

    /// Puts an entry's volumes back into the ledger and removes the entry.
    ///
    /// Each usage is matched on (antigen, metal), not on a reagent id. Usages
    /// with no matching reagent are skipped; the entry is removed regardless.
    pub fn undo(&mut self, id: EntryId, ledger: &mut InventoryLedger) -> Result<UndoReport> {
        let span = info_span!("undo", entry_id = %id);
        let _guard = span.enter();

        let entry = self
            .get(id)
            .cloned()
            .ok_or_else(|| PanelError::not_found(RecordKind::HistoryEntry, id.get()))?;

        let mut restored = Vec::new();
        let mut skipped = Vec::new();
        for usage in &entry.usages {
            if ledger.restore(&usage.antigen, &usage.metal, usage.volume_used) {
                restored.push(usage.clone());
            } else {
                warn!(
                    antigen = %usage.antigen,
                    metal = %usage.metal,
                    volume_used = usage.volume_used,
                    "no matching reagent; volume not restored"
                );
                skipped.push(usage.clone());
            }
        }

        let entry = self.delete_by_id(id)?;
        info!(
            panel = %entry.panel_name,
            restored = restored.len(),
            skipped = skipped.len(),
            "panel undone"
        );
        Ok(UndoReport {
            entry,
            restored,
            skipped,
        })
    }

    pub fn get(&self, id: EntryId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&HistoryEntry> {
        let id = self.names.get(&name_key(name))?;
        self.get(*id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(&name_key(name))
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Newest entry first.
    pub fn recent_first(&self) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().collect()
    }

    /// Alphabetical by panel name, case-insensitive.
    pub fn sorted_by_name(&self) -> Vec<&HistoryEntry> {
        self.search("")
    }

    /// Case-insensitive substring match on panel name, alphabetical.
    pub fn search(&self, query: &str) -> Vec<&HistoryEntry> {
        let query = query.to_lowercase();
        let mut found: Vec<&HistoryEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.panel_name.to_lowercase().contains(&query))
            .collect();
        found.sort_by_key(|entry| entry.panel_name.to_lowercase());
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn entry(log: &mut HistoryLog, name: &str, usages: Vec<AntibodyUsage>) -> HistoryEntry {
        HistoryEntry {
            id: log.next_id(),
            timestamp: NaiveDateTime::default(),
            user: "amy".to_string(),
            panel_name: name.to_string(),
            cell_count: 4.0,
            usages,
        }
    }

    fn usage(antigen: &str, metal: &str, volume_used: f64) -> AntibodyUsage {
        AntibodyUsage {
            antigen: antigen.to_string(),
            metal: metal.to_string(),
            volume_used,
        }
    }

    #[test]
    fn append_rejects_duplicate_name() {
        let mut log = HistoryLog::new();
        let first = entry(&mut log, "PanelA", vec![]);
        log.append(first).unwrap();
        let second = entry(&mut log, "panela", vec![]);
        assert!(matches!(
            log.append(second),
            Err(PanelError::DuplicateName {
                scope: NameScope::History,
                ..
            })
        ));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn delete_does_not_restore_stock() {
        let mut ledger = InventoryLedger::seeded();
        let mut log = HistoryLog::new();
        let e = entry(&mut log, "PanelA", vec![usage("CD3", "170Er", 10.0)]);
        let id = log.append(e).unwrap();
        log.delete_by_id(id).unwrap();
        assert_eq!(ledger.records()[0].stock_volume, 500.0);
        assert!(log.is_empty());
        assert!(matches!(
            log.undo(id, &mut ledger),
            Err(PanelError::NotFound { .. })
        ));
    }

    #[test]
    fn undo_restores_by_identity_and_skips_missing() {
        let mut ledger = InventoryLedger::seeded();
        let mut log = HistoryLog::new();
        let e = entry(
            &mut log,
            "PanelA",
            vec![usage("CD3", "170Er", 10.0), usage("CD99", "89Y", 3.0)],
        );
        let id = log.append(e).unwrap();
        let report = log.undo(id, &mut ledger).unwrap();
        assert_eq!(ledger.records()[0].stock_volume, 510.0);
        assert_eq!(report.restored.len(), 1);
        assert_eq!(report.skipped, vec![usage("CD99", "89Y", 3.0)]);
        assert!(!report.is_complete());
        assert!(log.is_empty());
        assert!(!log.contains_name("PanelA"));
    }

    #[test]
    fn views_order_entries() {
        let mut log = HistoryLog::new();
        for name in ["zeta", "Alpha", "beta"] {
            let e = entry(&mut log, name, vec![]);
            log.append(e).unwrap();
        }
        let sorted: Vec<&str> = log.sorted_by_name().iter().map(|e| e.panel_name.as_str()).collect();
        assert_eq!(sorted, ["Alpha", "beta", "zeta"]);
        let recent: Vec<&str> = log.recent_first().iter().map(|e| e.panel_name.as_str()).collect();
        assert_eq!(recent, ["beta", "Alpha", "zeta"]);
        assert_eq!(log.search("ET").len(), 2);
        assert_eq!(log.find_by_name("ALPHA").map(|e| e.id), Some(EntryId::new(2)));
    }
}
