//! Typed entities produced by the normalizer.

use crate::records::month::Month;

use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Domestic province codes. Any other non-empty code is foreign.
pub const PROVINCE_CODES: [&str; 13] = [
    "NL", "PE", "NS", "NB", "QC", "ON", "MB", "SK", "AB", "BC", "YT", "NT", "NU",
];

pub const INTERNATIONAL: &str = "International";

/// Map a raw province cell onto the fixed code set.
pub fn normalize_province(raw: &str) -> Option<String> {
    let code = raw.trim();
    if code.is_empty() {
        None
    } else if PROVINCE_CODES.contains(&code) {
        Some(code.to_string())
    } else {
        Some(INTERNATIONAL.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Public,
    Private,
}

impl FromStr for ActorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(ActorKind::Public),
            "private" => Ok(ActorKind::Private),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: u32,
    pub name: String,
    pub kind: ActorKind,
    pub report_ids: Vec<u32>,
    pub sectors: Vec<String>,
    pub province: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorWeight {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrivateActor {
    pub id: u32,
    pub name: String,
    /// In table order; dominant-sector selection depends on it.
    pub sectors: Vec<SectorWeight>,
    pub province: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicActor {
    pub id: u32,
    pub category: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: u32,
    pub private_id: u32,
    /// Deduplicated, first-seen order.
    pub public_ids: Vec<u32>,
    pub month: Month,
}

/// Normalized record set. Reports are grouped under their private actor.
#[derive(Debug, Clone, Default)]
pub struct Records {
    pub actors: BTreeMap<u32, Actor>,
    pub privates: BTreeMap<u32, PrivateActor>,
    pub publics: BTreeMap<u32, PublicActor>,
    pub reports: BTreeMap<u32, Vec<Report>>,
}

impl Records {
    pub fn report_count(&self) -> usize {
        self.reports.values().map(Vec::len).sum()
    }
}
