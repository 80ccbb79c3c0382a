//! Reagent inventory CSV.
//!
//! One row per reagent, in ledger order:
//!
//! | Column                   | Source                               |
//! |--------------------------|--------------------------------------|
//! | Antigen                  | `antigen`                            |
//! | Clone                    | `clone`                              |
//! | Metal                    | `metal`                              |
//! | Concentration (mg/mL)    | `concentration`                      |
//! | Antibody per Test (µg)   | `antibody_per_test`                  |
//! | Volume per Test (µL)     | `volume_per_test`                    |
//! | Stock Volume (µL)        | `stock_volume`, two decimals         |
//! | Alert Threshold (µL)     | `alert_threshold`                    |
//! | Date Conjugated          | `date_conjugated`                    |
//! | Notes                    | `notes`                              |
//!
//! Import reads the same layout back. An extra `Stain Type` column is
//! honored when present; without it every reagent is Extracellular.
//!
//! [`save_inventory`] writes that extra column so a file can be loaded back
//! without losing intracellular scaling. [`export_inventory`] keeps the plain
//! ten-column layout.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use abpanel_core::InventoryLedger;
use abpanel_model::{ReagentDraft, ReagentRecord, StainType};
use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};

use crate::common::{csv_writer, format_number};
use crate::error::{ReportError, Result};

pub const INVENTORY_HEADERS: [&str; 10] = [
    "Antigen",
    "Clone",
    "Metal",
    "Concentration (mg/mL)",
    "Antibody per Test (µg)",
    "Volume per Test (µL)",
    "Stock Volume (µL)",
    "Alert Threshold (µL)",
    "Date Conjugated",
    "Notes",
];

/// Optional column read on import.
pub const STAIN_TYPE_HEADER: &str = "Stain Type";

pub fn write_inventory_csv<W: Write>(records: &[ReagentRecord], writer: W) -> Result<()> {
    write_rows(records, writer, false)
}

/// Ten-column layout plus a trailing `Stain Type` column.
pub fn write_inventory_snapshot_csv<W: Write>(records: &[ReagentRecord], writer: W) -> Result<()> {
    write_rows(records, writer, true)
}

fn write_rows<W: Write>(records: &[ReagentRecord], writer: W, with_stain: bool) -> Result<()> {
    let mut out = csv_writer(writer);
    let mut headers = INVENTORY_HEADERS.to_vec();
    if with_stain {
        headers.push(STAIN_TYPE_HEADER);
    }
    out.write_record(&headers)?;
    for record in records {
        let mut row = vec![
            record.antigen.clone(),
            record.clone.clone(),
            record.metal.clone(),
            format_number(record.concentration),
            format_number(record.antibody_per_test),
            format_number(record.volume_per_test),
            format!("{:.2}", record.stock_volume),
            format_number(record.alert_threshold),
            record.date_conjugated.clone(),
            record.notes.clone(),
        ];
        if with_stain {
            row.push(record.stain_type.to_string());
        }
        out.write_record(&row)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the ledger to `path` in the ten-column layout, replacing any
/// existing file. Stain type is not part of this layout.
pub fn export_inventory(ledger: &InventoryLedger, path: &Path) -> Result<()> {
    let file = create(path)?;
    write_inventory_csv(ledger.records(), file)?;
    let intracellular = ledger
        .records()
        .iter()
        .filter(|record| record.stain_type == StainType::Intracellular)
        .count();
    if intracellular > 0 {
        warn!(
            path = %path.display(),
            intracellular,
            "export drops stain type; use save_inventory to reload this file"
        );
    }
    info!(path = %path.display(), reagents = ledger.len(), "inventory exported");
    Ok(())
}

/// Writes the ledger to `path` with its stain types, ready for
/// [`load_inventory`].
pub fn save_inventory(ledger: &InventoryLedger, path: &Path) -> Result<()> {
    let file = create(path)?;
    write_inventory_snapshot_csv(ledger.records(), file)?;
    info!(path = %path.display(), reagents = ledger.len(), "inventory saved");
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads inventory rows into a fresh ledger.
///
/// Each row goes through [`InventoryLedger::add`], so the usual validation
/// applies and ids are newly assigned. `row` in errors is 1-based and counts
/// the header line.
pub fn read_inventory_csv<R: Read>(reader: R) -> Result<InventoryLedger> {
    let mut rows = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rows.headers()?.clone();
    let columns = ColumnIndex::new(&headers)?;

    let mut ledger = InventoryLedger::new();
    for (index, row) in rows.records().enumerate() {
        let row = row?;
        let draft = columns.draft(&row);
        ledger
            .add(&draft)
            .map_err(|source| ReportError::InvalidRow {
                row: index + 2,
                source,
            })?;
    }
    Ok(ledger)
}

pub fn load_inventory(path: &Path) -> Result<InventoryLedger> {
    let file = File::open(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ledger = read_inventory_csv(file)?;
    info!(path = %path.display(), reagents = ledger.len(), "inventory loaded");
    Ok(ledger)
}

/// Header name to column position, BOM and whitespace tolerant.
struct ColumnIndex {
    positions: BTreeMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &StringRecord) -> Result<Self> {
        let positions: BTreeMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim_matches('\u{feff}').trim().to_string(), idx))
            .collect();
        for required in [INVENTORY_HEADERS[0], INVENTORY_HEADERS[6]] {
            if !positions.contains_key(required) {
                return Err(ReportError::MissingColumn { column: required });
            }
        }
        Ok(Self { positions })
    }

    fn field(&self, row: &StringRecord, column: &str) -> String {
        self.positions
            .get(column)
            .and_then(|idx| row.get(*idx))
            .unwrap_or("")
            .to_string()
    }

    fn draft(&self, row: &StringRecord) -> ReagentDraft {
        ReagentDraft {
            antigen: self.field(row, INVENTORY_HEADERS[0]),
            clone: self.field(row, INVENTORY_HEADERS[1]),
            metal: self.field(row, INVENTORY_HEADERS[2]),
            concentration: self.field(row, INVENTORY_HEADERS[3]),
            antibody_per_test: self.field(row, INVENTORY_HEADERS[4]),
            volume_per_test: self.field(row, INVENTORY_HEADERS[5]),
            stock_volume: self.field(row, INVENTORY_HEADERS[6]),
            alert_threshold: self.field(row, INVENTORY_HEADERS[7]),
            date_conjugated: self.field(row, INVENTORY_HEADERS[8]),
            notes: self.field(row, INVENTORY_HEADERS[9]),
            stain_type: self.field(row, STAIN_TYPE_HEADER),
        }
    }
}
