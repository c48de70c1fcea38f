//! Build-phase errors.
//!
//! Every variant is raised while normalizing records or folding them into
//! the aggregation structures. Queries over a built dashboard never fail.

use std::fmt;

/// Input table a faulty row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Actors,
    Privates,
    Publics,
    Reports,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Actors => "actors",
            Table::Privates => "privates",
            Table::Publics => "publics",
            Table::Reports => "reports",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A bracket/quote delimited list cell did not coerce to its element type.
    #[error("{table} row {row}: malformed list in field '{field}' ({value:?}): {reason}")]
    MalformedListField {
        table: Table,
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A scalar cell (id, flag, date) did not parse.
    #[error("{table} row {row}: malformed value in field '{field}': {value:?}")]
    MalformedField {
        table: Table,
        row: usize,
        field: &'static str,
        value: String,
    },

    /// A row (identified by its own id) points at an entity that does not exist.
    #[error("{table} entry {id}: references unknown {referenced}")]
    DanglingReference {
        table: Table,
        id: u32,
        referenced: String,
    },

    /// A private actor with reports has no sector weights to classify it by.
    #[error("private actor {private_id} has reports but no sectors")]
    EmptySectorSet { private_id: u32 },

    #[error("duplicate id {id} in {table}")]
    DuplicateId { table: Table, id: u32 },
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
