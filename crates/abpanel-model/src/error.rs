use std::fmt;

use thiserror::Error;

use crate::execution::Shortfall;

/// Which uniqueness namespace rejected a panel name.
///
/// Saved templates and executed panels are checked independently; a name may
/// exist in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    SavedPanels,
    History,
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameScope::SavedPanels => f.write_str("saved panels"),
            NameScope::History => f.write_str("executed panels"),
        }
    }
}

/// Kind of record a lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Reagent,
    SavedPanel,
    HistoryEntry,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Reagent => f.write_str("reagent"),
            RecordKind::SavedPanel => f.write_str("saved panel"),
            RecordKind::HistoryEntry => f.write_str("history entry"),
        }
    }
}

/// Recoverable failures reported by inventory and panel operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum PanelError {
    /// Malformed input when adding or editing a reagent.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("no reagents selected")]
    EmptySelection,

    #[error("panel name is required")]
    MissingName,

    #[error("a panel named '{name}' already exists in {scope}")]
    DuplicateName { name: String, scope: NameScope },

    /// Every reagent that cannot cover its required volume, never just the first.
    #[error("not enough stock: {}", describe_shortfalls(.0))]
    InsufficientStock(Vec<Shortfall>),

    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },
}

impl PanelError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(kind: RecordKind, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Returns the shortfall report when stock was insufficient.
    pub fn shortfalls(&self) -> Option<&[Shortfall]> {
        match self {
            PanelError::InsufficientStock(shortfalls) => Some(shortfalls),
            _ => None,
        }
    }
}

fn describe_shortfalls(shortfalls: &[Shortfall]) -> String {
    shortfalls
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PanelError>;
