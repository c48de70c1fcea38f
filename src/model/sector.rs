//! Dominant-sector classification.
//!
//! A private actor is placed under exactly one sector: the heaviest entry
//! of its weight table, except that a sector whose name contains
//! [`STICKY_MARKER`] is never displaced once it has become the running
//! maximum. Selection runs in two phases:
//! 1) collect the running-maximum record setters in table order;
//! 2) sticky post-pass: the first record setter carrying the marker wins,
//!    otherwise the last one (the plain maximum) does.
//!
//! A marked entry that never reaches the running maximum has no effect.

use crate::error::{BuildError, BuildResult, Table};
use crate::records::{PrivateActor, Records, Report, SectorWeight};

use std::collections::BTreeMap;
use tracing::debug;

/// Substring that makes a sector sticky ("Climate", "climatique", ...).
pub const STICKY_MARKER: &str = "limat";

/// Phase 1: entries that each raised the running maximum, in table order.
pub fn running_maxima(sectors: &[SectorWeight]) -> Vec<&SectorWeight> {
    let mut out: Vec<&SectorWeight> = Vec::new();
    for entry in sectors {
        match out.last() {
            Some(best) if entry.weight <= best.weight => {}
            _ => out.push(entry),
        }
    }
    out
}

/// Phase 2: apply the sticky override to the record setters.
pub fn dominant_sector(sectors: &[SectorWeight]) -> Option<&str> {
    let setters = running_maxima(sectors);
    setters
        .iter()
        .find(|s| s.name.contains(STICKY_MARKER))
        .or_else(|| setters.last())
        .map(|s| s.name.as_str())
}

/// Dominant sector of every private actor that has at least one report.
#[derive(Debug, Clone, Default)]
pub struct SectorAssignment {
    by_private: BTreeMap<u32, String>,
}

impl SectorAssignment {
    /// Classify each reporting private actor. Actors without reports are
    /// left out; a reporting actor with no sectors is an error.
    pub fn classify(
        privates: &BTreeMap<u32, PrivateActor>,
        reports: &BTreeMap<u32, Vec<Report>>,
    ) -> BuildResult<Self> {
        let mut by_private = BTreeMap::new();
        for (private_id, group) in reports {
            let private = privates
                .get(private_id)
                .ok_or_else(|| BuildError::DanglingReference {
                    table: Table::Reports,
                    id: group.first().map(|r| r.id).unwrap_or_default(),
                    referenced: format!("private actor {}", private_id),
                })?;
            let sector = dominant_sector(&private.sectors).ok_or(BuildError::EmptySectorSet {
                private_id: *private_id,
            })?;
            debug!(private = private_id, sector, "classified private actor");
            by_private.insert(*private_id, sector.to_string());
        }
        Ok(Self { by_private })
    }

    pub fn from_records(records: &Records) -> BuildResult<Self> {
        Self::classify(&records.privates, &records.reports)
    }

    pub fn sector_of(&self, private_id: u32) -> Option<&str> {
        self.by_private.get(&private_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_private.len()
    }
}
