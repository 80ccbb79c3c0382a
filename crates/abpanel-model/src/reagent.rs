//! Reagent (antibody conjugate) records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ReagentId;

/// Staining protocol a reagent is used in.
///
/// Intracellular reagents are dosed at a fraction of their nominal
/// volume per test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StainType {
    #[default]
    Extracellular,
    Intracellular,
}

impl StainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StainType::Extracellular => "Extracellular",
            StainType::Intracellular => "Intracellular",
        }
    }
}

impl fmt::Display for StainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StainType {
    type Err = String;

    /// Case-insensitive; blank input is the default stain type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "" | "EXTRACELLULAR" | "EXTRA" | "SURFACE" => Ok(StainType::Extracellular),
            "INTRACELLULAR" | "INTRA" => Ok(StainType::Intracellular),
            _ => Err(format!("Unknown stain type: {s}")),
        }
    }
}

/// A tracked antibody conjugate and its remaining stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReagentRecord {
    pub id: ReagentId,
    pub antigen: String,
    pub clone: String,
    /// Label/marker identifier, e.g. "170Er".
    pub metal: String,
    /// mg/mL
    pub concentration: f64,
    /// µg
    pub antibody_per_test: f64,
    /// Nominal µL per test at the reference cell count.
    pub volume_per_test: f64,
    /// µL, never negative.
    pub stock_volume: f64,
    pub notes: String,
    /// Free text; not validated as a date.
    pub date_conjugated: String,
    /// µL at or below which the reagent counts as low stock.
    pub alert_threshold: f64,
    #[serde(default)]
    pub stain_type: StainType,
}

impl ReagentRecord {
    pub fn is_low_stock(&self) -> bool {
        self.stock_volume <= self.alert_threshold
    }

    /// "CD3 (170Er)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.antigen, self.metal)
    }

    /// Whether this record carries the given (antigen, metal) identity.
    pub fn matches_identity(&self, antigen: &str, metal: &str) -> bool {
        self.antigen == antigen && self.metal == metal
    }
}

/// Raw form input for a new reagent, before any parsing.
///
/// Every field is text exactly as typed; the ledger decides what is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReagentDraft {
    pub antigen: String,
    pub clone: String,
    pub metal: String,
    pub concentration: String,
    pub antibody_per_test: String,
    pub volume_per_test: String,
    pub stock_volume: String,
    pub alert_threshold: String,
    pub date_conjugated: String,
    pub notes: String,
    pub stain_type: String,
}

impl ReagentDraft {
    pub fn new(antigen: impl Into<String>, stock_volume: impl Into<String>) -> Self {
        Self {
            antigen: antigen.into(),
            stock_volume: stock_volume.into(),
            ..Self::default()
        }
    }

    pub fn with_clone(mut self, clone: impl Into<String>) -> Self {
        self.clone = clone.into();
        self
    }

    pub fn with_metal(mut self, metal: impl Into<String>) -> Self {
        self.metal = metal.into();
        self
    }

    pub fn with_concentration(mut self, value: impl Into<String>) -> Self {
        self.concentration = value.into();
        self
    }

    pub fn with_antibody_per_test(mut self, value: impl Into<String>) -> Self {
        self.antibody_per_test = value.into();
        self
    }

    pub fn with_volume_per_test(mut self, value: impl Into<String>) -> Self {
        self.volume_per_test = value.into();
        self
    }

    pub fn with_alert_threshold(mut self, value: impl Into<String>) -> Self {
        self.alert_threshold = value.into();
        self
    }

    pub fn with_date_conjugated(mut self, value: impl Into<String>) -> Self {
        self.date_conjugated = value.into();
        self
    }

    pub fn with_notes(mut self, value: impl Into<String>) -> Self {
        self.notes = value.into();
        self
    }

    pub fn with_stain_type(mut self, stain_type: StainType) -> Self {
        self.stain_type = stain_type.as_str().to_string();
        self
    }
}

/// Editable reagent fields, as exposed by the inventory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReagentField {
    Antigen,
    Clone,
    Metal,
    Concentration,
    AntibodyPerTest,
    VolumePerTest,
    StockVolume,
    AlertThreshold,
    DateConjugated,
    Notes,
    StainType,
}

impl ReagentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReagentField::Antigen => "antigen",
            ReagentField::Clone => "clone",
            ReagentField::Metal => "metal",
            ReagentField::Concentration => "concentration",
            ReagentField::AntibodyPerTest => "antibody per test",
            ReagentField::VolumePerTest => "volume per test",
            ReagentField::StockVolume => "stock volume",
            ReagentField::AlertThreshold => "alert threshold",
            ReagentField::DateConjugated => "date conjugated",
            ReagentField::Notes => "notes",
            ReagentField::StainType => "stain type",
        }
    }

    /// Numeric fields discard edits that do not parse.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ReagentField::Concentration
                | ReagentField::AntibodyPerTest
                | ReagentField::VolumePerTest
                | ReagentField::StockVolume
                | ReagentField::AlertThreshold
        )
    }
}

impl fmt::Display for ReagentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an in-place edit. A rejected edit leaves the record untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    Rejected { field: ReagentField, value: String },
}

impl EditOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, EditOutcome::Updated)
    }
}
