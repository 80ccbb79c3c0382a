//! Command-line references to reagents.
//!
//! A reference is a numeric id (`3`), an antigen (`CD8`) or an antigen and
//! metal pair (`CD8:146Nd`). Antigen and metal compare case-insensitively.

use std::fmt;
use std::str::FromStr;

use abpanel_core::InventoryLedger;
use abpanel_model::{ReagentId, ReagentRecord};
use anyhow::{Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReagentRef {
    Id(ReagentId),
    Antigen(String),
    Identity { antigen: String, metal: String },
}

impl FromStr for ReagentRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("empty reagent reference");
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self::Id(s.parse()?));
        }
        match s.split_once(':') {
            Some((antigen, metal)) => {
                let (antigen, metal) = (antigen.trim(), metal.trim());
                if antigen.is_empty() || metal.is_empty() {
                    bail!("'{s}' should look like ANTIGEN:METAL");
                }
                Ok(Self::Identity {
                    antigen: antigen.to_string(),
                    metal: metal.to_string(),
                })
            }
            None => Ok(Self::Antigen(s.to_string())),
        }
    }
}

impl fmt::Display for ReagentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReagentRef::Id(id) => write!(f, "#{id}"),
            ReagentRef::Antigen(antigen) => f.write_str(antigen),
            ReagentRef::Identity { antigen, metal } => write!(f, "{antigen}:{metal}"),
        }
    }
}

impl ReagentRef {
    fn matches(&self, record: &ReagentRecord) -> bool {
        match self {
            ReagentRef::Id(id) => record.id == *id,
            ReagentRef::Antigen(antigen) => record.antigen.eq_ignore_ascii_case(antigen),
            ReagentRef::Identity { antigen, metal } => {
                record.antigen.eq_ignore_ascii_case(antigen)
                    && record.metal.eq_ignore_ascii_case(metal)
            }
        }
    }

    /// Finds the single reagent this reference names.
    pub fn resolve(&self, ledger: &InventoryLedger) -> Result<ReagentId> {
        let found: Vec<&ReagentRecord> = ledger
            .records()
            .iter()
            .filter(|record| self.matches(record))
            .collect();
        match found.as_slice() {
            [record] => Ok(record.id),
            [] => bail!("no reagent matches {self}"),
            many => {
                let labels: Vec<String> = many.iter().map(|record| record.label()).collect();
                bail!(
                    "{self} is ambiguous ({}); use ANTIGEN:METAL or an id",
                    labels.join(", ")
                )
            }
        }
    }
}

/// Resolves every reference, dropping repeats while keeping first-seen order.
pub fn resolve_all(refs: &[ReagentRef], ledger: &InventoryLedger) -> Result<Vec<ReagentId>> {
    let mut ids = Vec::with_capacity(refs.len());
    for reference in refs {
        let id = reference.resolve(ledger)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
