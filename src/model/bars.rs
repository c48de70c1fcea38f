//! Bar-chart aggregates over the tree.

use crate::model::tree::AggregationTree;
use crate::records::PrivateActor;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarDatum {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceBar {
    pub province: Option<String>,
    pub count: u64,
}

/// All bar datasets of the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BarCharts {
    pub by_sector: Vec<BarDatum>,
    /// Sector -> private actors of that sector.
    pub by_private: BTreeMap<String, Vec<BarDatum>>,
    pub by_category: Vec<BarDatum>,
    /// Category -> public actors of that category.
    pub by_public: BTreeMap<String, Vec<BarDatum>>,
    pub by_province: Vec<ProvinceBar>,
}

impl BarCharts {
    pub fn build(tree: &AggregationTree, privates: &BTreeMap<u32, PrivateActor>) -> Self {
        Self {
            by_sector: count_by_sector(tree),
            by_private: tree
                .sectors()
                .into_iter()
                .map(|s| (s.to_string(), count_by_private(tree, s)))
                .collect(),
            by_category: count_by_category(tree),
            by_public: count_by_public(tree),
            by_province: count_by_province(tree, privates),
        }
    }
}

pub fn count_by_sector(tree: &AggregationTree) -> Vec<BarDatum> {
    tree.sector_totals()
        .into_iter()
        .map(|t| BarDatum {
            name: t.sector,
            count: t.total,
        })
        .collect()
}

pub fn count_by_private(tree: &AggregationTree, sector: &str) -> Vec<BarDatum> {
    tree.branches(sector)
        .into_iter()
        .map(|branch| BarDatum {
            name: branch.private_id.to_string(),
            count: branch.total(),
        })
        .collect()
}

pub fn count_by_category(tree: &AggregationTree) -> Vec<BarDatum> {
    tree.categories()
        .into_iter()
        .map(|c| BarDatum {
            name: c.to_string(),
            count: tree.in_category(c).map(|e| e.count).sum(),
        })
        .collect()
}

pub fn count_by_public(tree: &AggregationTree) -> BTreeMap<String, Vec<BarDatum>> {
    tree.categories()
        .into_iter()
        .map(|c| {
            let mut bars: Vec<BarDatum> = Vec::new();
            let mut slot: HashMap<u32, usize> = HashMap::new();
            for entry in tree.in_category(c) {
                match slot.get(&entry.public_id) {
                    Some(&i) => bars[i].count += entry.count,
                    None => {
                        slot.insert(entry.public_id, bars.len());
                        bars.push(BarDatum {
                            name: entry.public_id.to_string(),
                            count: entry.count,
                        });
                    }
                }
            }
            (c.to_string(), bars)
        })
        .collect()
}

/// Totals per private-actor province, in first-seen order. Actors without
/// a province share the `None` bar.
pub fn count_by_province(
    tree: &AggregationTree,
    privates: &BTreeMap<u32, PrivateActor>,
) -> Vec<ProvinceBar> {
    let mut out: Vec<ProvinceBar> = Vec::new();
    for entry in tree.entries() {
        let province = privates.get(&entry.private_id).and_then(|p| p.province.clone());
        match out.iter_mut().find(|b| b.province == province) {
            Some(bar) => bar.count += entry.count,
            None => out.push(ProvinceBar {
                province,
                count: entry.count,
            }),
        }
    }
    out
}
