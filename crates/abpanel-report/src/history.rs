//! Executed-panel history CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use abpanel_core::HistoryLog;
use abpanel_model::HistoryEntry;
use tracing::info;

use crate::common::{csv_writer, format_number};
use crate::error::{ReportError, Result};

pub const HISTORY_HEADERS: [&str; 6] = [
    "Timestamp",
    "User",
    "Panel Name",
    "Cell Count (millions)",
    "Antibodies Used",
    "Total Volume (µL)",
];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes entries in the order given.
pub fn write_history_csv<'a, W, I>(entries: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a HistoryEntry>,
{
    let mut out = csv_writer(writer);
    out.write_record(HISTORY_HEADERS)?;
    for entry in entries {
        out.write_record([
            entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            entry.user.clone(),
            entry.panel_name.clone(),
            format_number(entry.cell_count),
            entry.antibody_list(),
            format!("{:.2}", entry.total_volume()),
        ])?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the log to `path`, newest entry first.
pub fn export_history(history: &HistoryLog, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_history_csv(history.recent_first(), file)?;
    info!(path = %path.display(), entries = history.len(), "history exported");
    Ok(())
}
