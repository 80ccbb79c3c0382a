//! Reagent inventory and stock volumes.
//!
//! The ledger owns every [`ReagentRecord`]. Stock volume changes through
//! panel execution and undo (crate-internal), through an explicit edit of
//! the stock field, or disappears with the record on removal.

use abpanel_model::{
    DEFAULT_ALERT_THRESHOLD, EditOutcome, IdSequence, PanelError, RecordKind, ReagentDraft,
    ReagentField, ReagentId, ReagentRecord, Result, StainType,
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct InventoryLedger {
    records: Vec<ReagentRecord>,
    ids: IdSequence,
    default_alert_threshold: f64,
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            ids: IdSequence::default(),
            default_alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }

    /// A ledger holding the three starter reagents (CD3, CD4, CD8).
    pub fn seeded() -> Self {
        let mut ledger = Self::new();
        for (antigen, clone, metal, stock, notes, date) in [
            ("CD3", "UCHT1", "170Er", 500.0, "Core marker", "2024-10-15"),
            ("CD4", "RPA-T4", "145Nd", 450.0, "T-helper cells", "2024-10-12"),
            ("CD8", "SK1", "146Nd", 35.0, "Cytotoxic T cells", "2024-09-20"),
        ] {
            let id = ReagentId::new(ledger.ids.take());
            ledger.records.push(ReagentRecord {
                id,
                antigen: antigen.to_string(),
                clone: clone.to_string(),
                metal: metal.to_string(),
                concentration: 0.5,
                antibody_per_test: 1.0,
                volume_per_test: 2.0,
                stock_volume: stock,
                notes: notes.to_string(),
                date_conjugated: date.to_string(),
                alert_threshold: DEFAULT_ALERT_THRESHOLD,
                stain_type: StainType::Extracellular,
            });
        }
        ledger
    }

    /// Sets the threshold used when a draft leaves the alert threshold blank.
    pub fn with_default_alert_threshold(mut self, threshold: f64) -> Self {
        self.default_alert_threshold = threshold;
        self
    }

    /// Parses a draft and appends it under a fresh id.
    ///
    /// Antigen and stock volume are required. Blank optional numbers become
    /// 0 (alert threshold falls back to the ledger default); anything that
    /// does not parse is a validation error and nothing is added.
    pub fn add(&mut self, draft: &ReagentDraft) -> Result<ReagentId> {
        let antigen = draft.antigen.trim();
        if antigen.is_empty() {
            return Err(PanelError::validation("antigen", "antigen is required"));
        }
        let stock = draft.stock_volume.trim();
        if stock.is_empty() {
            return Err(PanelError::validation(
                "stock volume",
                "stock volume is required",
            ));
        }
        let stock_volume = parse_quantity("stock volume", stock)?;
        if stock_volume < 0.0 {
            return Err(PanelError::validation(
                "stock volume",
                format!("'{stock}' is negative"),
            ));
        }
        let concentration = parse_optional("concentration", &draft.concentration, 0.0)?;
        let antibody_per_test =
            parse_optional("antibody per test", &draft.antibody_per_test, 0.0)?;
        let volume_per_test = parse_optional("volume per test", &draft.volume_per_test, 0.0)?;
        let alert_threshold = parse_optional(
            "alert threshold",
            &draft.alert_threshold,
            self.default_alert_threshold,
        )?;
        let stain_type = draft
            .stain_type
            .parse::<StainType>()
            .map_err(|message| PanelError::validation("stain type", message))?;

        let id = ReagentId::new(self.ids.take());
        self.records.push(ReagentRecord {
            id,
            antigen: antigen.to_string(),
            clone: draft.clone.clone(),
            metal: draft.metal.clone(),
            concentration,
            antibody_per_test,
            volume_per_test,
            stock_volume,
            notes: draft.notes.clone(),
            date_conjugated: draft.date_conjugated.clone(),
            alert_threshold,
            stain_type,
        });
        info!(reagent_id = %id, antigen, stock_volume, "reagent added");
        Ok(id)
    }

    /// Inserts an already-built record, e.g. one read back from an export.
    ///
    /// Keeps the record's id only if this ledger has never handed it out;
    /// otherwise a fresh id is assigned. Returns the id the record ended up
    /// with.
    pub fn insert(&mut self, mut record: ReagentRecord) -> ReagentId {
        if record.id.get() >= self.ids.peek() {
            self.ids.bump_past(record.id.get());
        } else {
            record.id = ReagentId::new(self.ids.take());
        }
        let id = record.id;
        debug!(reagent_id = %id, antigen = %record.antigen, "reagent inserted");
        self.records.push(record);
        id
    }

    /// Edits one field in place.
    ///
    /// Text fields accept any value. Numeric fields that do not parse (or
    /// would make stock negative) leave the record unchanged and come back as
    /// [`EditOutcome::Rejected`]; this is not an error.
    pub fn update(&mut self, id: ReagentId, field: ReagentField, value: &str) -> Result<EditOutcome> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| PanelError::not_found(RecordKind::Reagent, id.get()))?;

        let applied = match field {
            ReagentField::Antigen => set_text(&mut record.antigen, value),
            ReagentField::Clone => set_text(&mut record.clone, value),
            ReagentField::Metal => set_text(&mut record.metal, value),
            ReagentField::DateConjugated => set_text(&mut record.date_conjugated, value),
            ReagentField::Notes => set_text(&mut record.notes, value),
            ReagentField::Concentration => set_number(&mut record.concentration, value),
            ReagentField::AntibodyPerTest => set_number(&mut record.antibody_per_test, value),
            ReagentField::VolumePerTest => set_number(&mut record.volume_per_test, value),
            ReagentField::AlertThreshold => set_number(&mut record.alert_threshold, value),
            ReagentField::StockVolume => match parse_number(value) {
                Some(stock) if stock >= 0.0 => {
                    record.stock_volume = stock;
                    true
                }
                _ => false,
            },
            ReagentField::StainType => match value.parse::<StainType>() {
                Ok(stain_type) => {
                    record.stain_type = stain_type;
                    true
                }
                Err(_) => false,
            },
        };

        if applied {
            debug!(reagent_id = %id, field = %field, "reagent updated");
            Ok(EditOutcome::Updated)
        } else {
            warn!(reagent_id = %id, field = %field, value, "edit discarded");
            Ok(EditOutcome::Rejected {
                field,
                value: value.to_string(),
            })
        }
    }

    /// Deletes a record permanently. Absent ids are a no-op.
    pub fn remove(&mut self, id: ReagentId) -> Option<ReagentRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        let removed = self.records.remove(index);
        info!(reagent_id = %id, antigen = %removed.antigen, "reagent removed");
        Some(removed)
    }

    pub fn get(&self, id: ReagentId) -> Option<&ReagentRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// First record carrying the given (antigen, metal) identity.
    pub fn find_by_identity(&self, antigen: &str, metal: &str) -> Option<&ReagentRecord> {
        self.records
            .iter()
            .find(|record| record.matches_identity(antigen, metal))
    }

    /// Records with `stock_volume <= alert_threshold`.
    pub fn list_low_stock(&self) -> Vec<&ReagentRecord> {
        self.records
            .iter()
            .filter(|record| record.is_low_stock())
            .collect()
    }

    pub fn alert_count(&self) -> usize {
        self.records.iter().filter(|record| record.is_low_stock()).count()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[ReagentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total stock across the ledger, in µL.
    pub fn total_stock(&self) -> f64 {
        self.records.iter().map(|record| record.stock_volume).sum()
    }

    pub(crate) fn deduct(&mut self, id: ReagentId, volume: f64) -> bool {
        match self.records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.stock_volume -= volume;
                true
            }
            None => false,
        }
    }

    /// Adds `volume` back to the first record matching (antigen, metal).
    pub(crate) fn restore(&mut self, antigen: &str, metal: &str, volume: f64) -> bool {
        match self
            .records
            .iter_mut()
            .find(|record| record.matches_identity(antigen, metal))
        {
            Some(record) => {
                record.stock_volume += volume;
                true
            }
            None => false,
        }
    }
}

fn set_text(target: &mut String, value: &str) -> bool {
    value.clone_into(target);
    true
}

fn set_number(target: &mut f64, value: &str) -> bool {
    match parse_number(value) {
        Some(number) => {
            *target = number;
            true
        }
        None => false,
    }
}

/// Finite numbers only; "nan" and "inf" parse as f64 but are not quantities.
fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn parse_quantity(field: &'static str, value: &str) -> Result<f64> {
    parse_number(value)
        .ok_or_else(|| PanelError::validation(field, format!("'{}' is not a number", value.trim())))
}

fn parse_optional(field: &'static str, value: &str, default: f64) -> Result<f64> {
    if value.trim().is_empty() {
        Ok(default)
    } else {
        parse_quantity(field, value)
    }
}
