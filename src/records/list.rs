//! List-valued cells.
//!
//! Source tables serialize sequences as Python-style literals:
//! `[1, 2]`, `['Energy', 'Mining']`, `{'Energy': 3, 'Mining': 1}`.
//! Delimiters are stripped and the rest is split on ", ".

use crate::error::{BuildError, BuildResult, Table};
use crate::records::entity::SectorWeight;

use regex::Regex;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

static DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[\]'{}]").expect("delimiter pattern compiles"));

/// Location of a cell, used to build errors.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef {
    pub table: Table,
    pub row: usize,
    pub field: &'static str,
}

impl FieldRef {
    pub fn new(table: Table, row: usize, field: &'static str) -> Self {
        Self { table, row, field }
    }

    pub fn malformed_list(&self, value: &str, reason: impl Into<String>) -> BuildError {
        BuildError::MalformedListField {
            table: self.table,
            row: self.row,
            field: self.field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn malformed(&self, value: &str) -> BuildError {
        BuildError::MalformedField {
            table: self.table,
            row: self.row,
            field: self.field,
            value: value.to_string(),
        }
    }
}

/// Split a delimited cell into trimmed items. An empty literal yields no items.
pub fn split_items(raw: &str) -> Vec<String> {
    let stripped = DELIMITERS.replace_all(raw, "");
    if stripped.trim().is_empty() {
        return Vec::new();
    }
    stripped
        .split(", ")
        .map(|s| s.trim().to_string())
        .collect()
}

/// Parse a delimited cell into elements of `T`.
pub fn parse_list<T>(raw: &str, at: FieldRef) -> BuildResult<Vec<T>>
where
    T: FromStr,
    T::Err: Display,
{
    split_items(raw)
        .into_iter()
        .map(|item| {
            item.parse::<T>()
                .map_err(|e| at.malformed_list(raw, format!("element {:?}: {}", item, e)))
        })
        .collect()
}

/// Parse `name: weight` pairs from a private actor's sector cell.
pub fn parse_weights(raw: &str, at: FieldRef) -> BuildResult<Vec<SectorWeight>> {
    split_items(raw)
        .into_iter()
        .map(|item| {
            let (name, weight) = item
                .rsplit_once(':')
                .ok_or_else(|| at.malformed_list(raw, format!("entry {:?} has no weight", item)))?;
            let weight: f64 = weight.trim().parse().map_err(|e| {
                at.malformed_list(raw, format!("weight of {:?}: {}", name.trim(), e))
            })?;
            if !weight.is_finite() {
                return Err(at.malformed_list(
                    raw,
                    format!("weight of {:?} is not finite", name.trim()),
                ));
            }
            Ok(SectorWeight {
                name: name.trim().to_string(),
                weight,
            })
        })
        .collect()
}
