//! Raw row shapes as produced by a tabular reader.
//!
//! Column names follow the source tables verbatim. Every cell is kept as
//! text; list parsing and type coercion happen in `normalize`.

use serde::{Deserialize, Deserializer};

/// One row of the actors table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawActor {
    #[serde(deserialize_with = "cell")]
    pub id: String,

    #[serde(default, deserialize_with = "cell")]
    pub name: String,

    #[serde(rename = "public|private", default, deserialize_with = "cell")]
    pub kind: String,

    #[serde(rename = "idsRapport", default, deserialize_with = "cell")]
    pub report_ids: String,

    #[serde(default, deserialize_with = "cell")]
    pub sectors: String,

    #[serde(default, deserialize_with = "cell")]
    pub province: String,
}

/// One row of the private sector-weight table, e.g. `{'Energy': 3, 'Mining': 1}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrivate {
    #[serde(deserialize_with = "cell")]
    pub id: String,

    #[serde(default, deserialize_with = "cell")]
    pub sectors: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPublic {
    #[serde(rename = "idPublic", deserialize_with = "cell")]
    pub id: String,

    #[serde(rename = "type", default, deserialize_with = "cell")]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReport {
    #[serde(rename = "idCom", deserialize_with = "cell")]
    pub id: String,

    #[serde(rename = "privatesIds", default, deserialize_with = "cell")]
    pub private_ids: String,

    #[serde(rename = "publicsIds", default, deserialize_with = "cell")]
    pub public_ids: String,

    #[serde(default, deserialize_with = "cell")]
    pub date: String,
}

/// All four input tables.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub actors: Vec<RawActor>,
    pub privates: Vec<RawPrivate>,
    pub publics: Vec<RawPublic>,
    pub reports: Vec<RawReport>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
}

/// Accept a cell written either as JSON text or as a bare number; null is empty.
fn cell<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<CellValue>::deserialize(deserializer)?;
    Ok(match value {
        None => String::new(),
        Some(CellValue::Text(s)) => s,
        Some(CellValue::Integer(i)) => i.to_string(),
        Some(CellValue::Number(n)) => n.to_string(),
        Some(CellValue::Flag(b)) => b.to_string(),
    })
}
