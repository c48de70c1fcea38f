//! Record layer: raw table rows and the normalized entities built from them.
//!
//! This module owns
//! - raw row schemas (serde-friendly, every cell as text)
//! - list-cell parsing and the Month type
//! - normalization into id-keyed entity maps

pub mod entity;
pub mod list;
pub mod month;
pub mod normalize;
pub mod raw;

pub use entity::{Actor, PrivateActor, PublicActor, Records, Report, SectorWeight};
pub use month::Month;
pub use normalize::normalize;
pub use raw::RawTables;
