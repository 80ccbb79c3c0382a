//! CSV export and import for the antibody inventory and panel history.

mod common;
pub mod error;
pub mod history;
pub mod inventory;

pub use common::format_number;
pub use error::{ReportError, Result};
pub use history::{HISTORY_HEADERS, TIMESTAMP_FORMAT, export_history, write_history_csv};
pub use inventory::{
    INVENTORY_HEADERS, STAIN_TYPE_HEADER, export_inventory, load_inventory, read_inventory_csv,
    save_inventory, write_inventory_csv, write_inventory_snapshot_csv,
};
