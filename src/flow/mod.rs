//! Flow diagram: tree projections and the drill-down controller.

pub mod nav;
pub mod slice;

pub use nav::{Controller, FlowEvent, Navigation, ViewGraph};
pub use slice::FlowDataset;
