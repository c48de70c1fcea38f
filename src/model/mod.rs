//! Aggregation model: fold normalized records into the count structures
//! every view reads from.

pub mod bars;
pub mod sector;
pub mod series;
pub mod tree;

pub use bars::BarCharts;
pub use sector::SectorAssignment;
pub use series::TimeSeries;
pub use tree::AggregationTree;

use crate::error::BuildResult;
use crate::records::Records;

/// Everything built from one record set. Read-only once constructed.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub sectors: SectorAssignment,
    pub tree: AggregationTree,
    pub series: TimeSeries,
    pub bars: BarCharts,
}

/// Build phase. Any integrity problem aborts the whole build.
pub fn build_aggregates(records: &Records) -> BuildResult<Aggregates> {
    let sectors = SectorAssignment::from_records(records)?;
    let tree = AggregationTree::build(records, &sectors)?;
    let series = TimeSeries::build(records, &sectors)?;
    let bars = BarCharts::build(&tree, &records.privates);

    Ok(Aggregates {
        sectors,
        tree,
        series,
        bars,
    })
}
