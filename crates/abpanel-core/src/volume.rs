//! Required reagent volume for a target cell count.

use abpanel_model::{REFERENCE_CELL_COUNT, ReagentRecord, StainType};

/// Intracellular reagents are dosed at one fifth of their nominal volume.
pub const INTRACELLULAR_FACTOR: f64 = 0.2;

/// Volume (µL) of `record` needed to stain `cell_count_millions` cells.
///
/// Scales `volume_per_test` linearly from the reference cell count and
/// applies the intracellular factor. No rounding; callers format for display.
/// Validation and commit both go through here so the two phases agree.
pub fn required_volume(record: &ReagentRecord, cell_count_millions: f64) -> f64 {
    let ratio = cell_count_millions / REFERENCE_CELL_COUNT;
    let mut base = record.volume_per_test;
    if record.stain_type == StainType::Intracellular {
        base *= INTRACELLULAR_FACTOR;
    }
    base * ratio
}
