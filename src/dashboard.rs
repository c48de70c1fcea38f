//! Dashboard data: everything the three views read, in one serializable bundle.

use crate::error::BuildResult;
use crate::flow::{Controller, FlowDataset, FlowEvent, Navigation, ViewGraph};
use crate::model::{BarCharts, TimeSeries, build_aggregates};
use crate::records::{RawTables, normalize};

use serde::Serialize;
use tracing::info;

/// Number of sectors shown in the initial flow view.
pub const DEFAULT_TOP_SECTORS: usize = 10;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub top_sectors: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_sectors: DEFAULT_TOP_SECTORS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub totals: TotalsView,
    pub flow: ViewGraph,
    pub bars: BarCharts,
    pub series: TimeSeries,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub actors: usize,
    pub private_actors: usize,
    pub public_actors: usize,
    pub reports: usize,
    /// Private actors with at least one report.
    pub classified: usize,
    /// Sum of all (private, public) report links.
    pub links: u64,
}

/// Normalize, aggregate, and walk every reachable flow view.
pub fn build_dashboard(tables: &RawTables, config: &DashboardConfig) -> BuildResult<DashboardData> {
    let records = normalize(tables)?;
    let aggregates = build_aggregates(&records)?;

    let flow = Controller::new(&aggregates.tree, &records.actors, config.top_sectors).explore();

    Ok(DashboardData {
        totals: TotalsView {
            actors: records.actors.len(),
            private_actors: records.privates.len(),
            public_actors: records.publics.len(),
            reports: records.report_count(),
            classified: aggregates.sectors.len(),
            links: aggregates.tree.total(),
        },
        flow,
        bars: aggregates.bars,
        series: aggregates.series,
    })
}

/// Outcome of replaying a sequence of events from the top-level view.
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub view: String,
    pub navigation: Navigation,
    /// Keys of events that were no-ops in the state they arrived in.
    pub ignored: Vec<String>,
    pub flow: FlowDataset,
}

/// Build the tree and feed `events` through one controller, in order.
pub fn replay(
    tables: &RawTables,
    config: &DashboardConfig,
    events: &[FlowEvent],
) -> BuildResult<Replay> {
    let records = normalize(tables)?;
    let aggregates = build_aggregates(&records)?;

    let mut ctl = Controller::new(&aggregates.tree, &records.actors, config.top_sectors);
    let mut flow = ctl.current();
    let mut ignored = Vec::new();
    for event in events {
        match ctl.handle(event) {
            Some(next) => flow = next,
            None => {
                info!(event = %event.key(), nav = ?ctl.navigation(), "event ignored");
                ignored.push(event.key());
            }
        }
    }

    Ok(Replay {
        view: ctl.view().key(),
        navigation: ctl.navigation().clone(),
        ignored,
        flow,
    })
}
