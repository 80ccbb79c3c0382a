#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::PanelError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = PanelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| PanelError::validation($label, format!("'{s}' is not an id")))
            }
        }
    };
}

numeric_id!(
    /// Identity of a reagent in the inventory. Never reused once assigned.
    ReagentId,
    "reagent id"
);

numeric_id!(
    /// Identity of a saved panel template.
    PanelId,
    "panel id"
);

numeric_id!(
    /// Identity of an executed panel in the history log.
    EntryId,
    "history entry id"
);

/// Monotonic id source. Ids handed out are never handed out again, even
/// after the record that held them is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Takes the next raw id value.
    pub fn take(&mut self) -> u64 {
        let value = self.next;
        self.next += 1;
        value
    }

    /// The value [`IdSequence::take`] would return next.
    pub const fn peek(&self) -> u64 {
        self.next
    }

    /// Makes sure `seen` will never be produced by this sequence.
    pub fn bump_past(&mut self, seen: u64) {
        if seen >= self.next {
            self.next = seen + 1;
        }
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
