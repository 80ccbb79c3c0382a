//! Library side of the `abpanel` command: logging setup and reagent
//! references.

pub mod logging;
pub mod selection;
