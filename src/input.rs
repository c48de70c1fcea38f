//! Input loading.
//!
//! A table is either a CSV file with a header row (`.csv`) or a JSON array
//! of row objects (anything else). Both land in the same raw row structs.

use crate::Result;
use crate::records::RawTables;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;

pub struct InputPaths<'a> {
    pub actors: &'a Path,
    pub privates: &'a Path,
    pub publics: &'a Path,
    pub reports: &'a Path,
}

pub fn load_tables(paths: &InputPaths<'_>) -> Result<RawTables> {
    Ok(RawTables {
        actors: read_rows(paths.actors)?,
        privates: read_rows(paths.privates)?,
        publics: read_rows(paths.publics)?,
        reports: read_rows(paths.reports)?,
    })
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let rows = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => read_csv_rows(path)?,
        _ => read_json_rows(path)?,
    };
    info!(path = %path.display(), rows = rows.len(), "loaded table");
    Ok(rows)
}

fn read_csv_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open CSV table {}", path.display()))?;
    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(idx, row)| {
            row.with_context(|| format!("parse CSV table {} at row {}", path.display(), idx + 1))
        })
        .collect()
}

fn read_json_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read table file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse table file {}", path.display()))
}
