//! Configuration options for an inventory session.

use serde::{Deserialize, Serialize};

/// Reference cell count (millions) that `volume_per_test` is quoted for.
pub const REFERENCE_CELL_COUNT: f64 = 4.0;

/// Alert threshold (µL) applied when a new reagent leaves it blank.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 50.0;

/// Options controlling session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabOptions {
    /// Cell count (millions) a fresh or cleared composer starts with.
    pub default_cell_count: f64,

    /// Alert threshold (µL) used when a new reagent leaves it blank.
    pub default_alert_threshold: f64,

    /// Start the inventory with the built-in starter reagents.
    pub seed_inventory: bool,
}

impl Default for LabOptions {
    fn default() -> Self {
        Self {
            default_cell_count: REFERENCE_CELL_COUNT,
            default_alert_threshold: DEFAULT_ALERT_THRESHOLD,
            seed_inventory: true,
        }
    }
}

impl LabOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_cell_count(mut self, cells: f64) -> Self {
        self.default_cell_count = cells;
        self
    }

    pub fn with_default_alert_threshold(mut self, threshold: f64) -> Self {
        self.default_alert_threshold = threshold;
        self
    }

    pub fn with_seed_inventory(mut self, enable: bool) -> Self {
        self.seed_inventory = enable;
        self
    }
}
