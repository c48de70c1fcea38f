//! Month-bucketed report counts.
//!
//! Two independent series families:
//! - by private-actor dominant sector: one increment per report;
//! - by public category: one increment per linked public actor.

use crate::error::{BuildError, BuildResult, Table};
use crate::model::sector::SectorAssignment;
use crate::records::{Month, Records};

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: Month,
    pub count: u64,
}

/// Key -> points strictly ascending by month.
pub type Series = BTreeMap<String, Vec<MonthCount>>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeSeries {
    pub by_sector: Series,
    pub by_category: Series,
}

type Buckets = BTreeMap<String, BTreeMap<Month, u64>>;

fn bump(buckets: &mut Buckets, key: &str, month: Month) {
    *buckets
        .entry(key.to_string())
        .or_default()
        .entry(month)
        .or_insert(0) += 1;
}

fn finish(buckets: Buckets) -> Series {
    buckets
        .into_iter()
        .map(|(key, points)| {
            let points = points
                .into_iter()
                .map(|(month, count)| MonthCount { month, count })
                .collect();
            (key, points)
        })
        .collect()
}

impl TimeSeries {
    pub fn build(records: &Records, sectors: &SectorAssignment) -> BuildResult<Self> {
        let mut by_sector = Buckets::new();
        let mut by_category = Buckets::new();

        for (private_id, reports) in &records.reports {
            let Some(sector) = sectors.sector_of(*private_id) else {
                return Err(BuildError::DanglingReference {
                    table: Table::Reports,
                    id: reports.first().map(|r| r.id).unwrap_or_default(),
                    referenced: format!("unclassified private actor {}", private_id),
                });
            };

            for report in reports {
                bump(&mut by_sector, sector, report.month);
                for public_id in &report.public_ids {
                    let public =
                        records
                            .publics
                            .get(public_id)
                            .ok_or_else(|| BuildError::DanglingReference {
                                table: Table::Reports,
                                id: report.id,
                                referenced: format!("public actor {}", public_id),
                            })?;
                    bump(&mut by_category, &public.category, report.month);
                }
            }
        }

        let series = Self {
            by_sector: finish(by_sector),
            by_category: finish(by_category),
        };
        info!(
            sectors = series.by_sector.len(),
            categories = series.by_category.len(),
            "built time series"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use pretty_assertions::assert_eq;

    fn point(year: i32, month: u8, count: u64) -> MonthCount {
        MonthCount {
            month: Month::new(year, month).unwrap(),
            count,
        }
    }

    fn sample_series() -> TimeSeries {
        let records = fixtures::sample_records();
        let sectors = SectorAssignment::from_records(&records).unwrap();
        TimeSeries::build(&records, &sectors).unwrap()
    }

    #[test]
    fn two_march_reports_share_a_bucket() {
        let series = sample_series();
        assert_eq!(series.by_sector["Energy"], vec![point(2021, 3, 2)]);
    }

    #[test]
    fn public_series_counts_each_linked_actor() {
        let series = sample_series();
        // Reports 100, 101 and 105 all reach public 10 in March 2021.
        assert_eq!(
            series.by_category["Municipal"],
            vec![point(2020, 12, 1), point(2021, 3, 3)]
        );
        assert_eq!(
            series.by_category["Provincial"],
            vec![point(2021, 1, 1), point(2021, 3, 1)]
        );
    }

    #[test]
    fn report_without_publics_counts_privately() {
        let series = sample_series();
        assert_eq!(
            series.by_sector["Finance"],
            vec![point(2021, 1, 1), point(2021, 2, 1)]
        );
    }

    #[test]
    fn strictly_ascending() {
        let series = sample_series();
        for points in series.by_sector.values().chain(series.by_category.values()) {
            assert!(points.windows(2).all(|w| w[0].month < w[1].month));
        }
    }
}
