//! Aggregation tree: Sector -> PrivateActorId -> PublicCategory -> PublicActorId -> count.
//!
//! Stored as an arena of leaf entries in first-seen order, plus an index
//! on the full key. All hierarchy levels are derived by query, so there is
//! no intermediate level to forget to create.

use crate::error::{BuildError, BuildResult, Table};
use crate::model::sector::SectorAssignment;
use crate::records::{PublicActor, Records, Report};

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use tracing::info;

/// Per (private, public) pair: number of reports connecting them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicLink {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub count: u64,
}

/// Count, for one private actor's reports, how many reports reach each
/// public actor. Keyed (and therefore ordered) by public id.
pub fn count_public_links(
    reports: &[Report],
    publics: &BTreeMap<u32, PublicActor>,
) -> BuildResult<BTreeMap<u32, PublicLink>> {
    let mut out: BTreeMap<u32, PublicLink> = BTreeMap::new();
    for report in reports {
        for public_id in &report.public_ids {
            if let Some(link) = out.get_mut(public_id) {
                link.count += 1;
                continue;
            }
            let public = publics
                .get(public_id)
                .ok_or_else(|| BuildError::DanglingReference {
                    table: Table::Reports,
                    id: report.id,
                    referenced: format!("public actor {}", public_id),
                })?;
            out.insert(
                *public_id,
                PublicLink {
                    id: public.id,
                    name: public.name.clone(),
                    category: public.category.clone(),
                    count: 1,
                },
            );
        }
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub sector: String,
    pub private_id: u32,
    pub category: String,
    pub public_id: u32,
    pub count: u64,
}

type EntryKey = (String, u32, String, u32);

#[derive(Debug, Clone, Default)]
pub struct AggregationTree {
    entries: Vec<TreeEntry>,
    index: HashMap<EntryKey, usize>,
    /// Sector -> entry positions, insertion order.
    by_sector: HashMap<String, Vec<usize>>,
    /// Category -> entry positions, insertion order.
    by_category: HashMap<String, Vec<usize>>,
}

/// Leaves of one private actor under one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBranch<'a> {
    pub category: &'a str,
    /// `(public_id, count)` in first-seen order.
    pub leaves: Vec<(u32, u64)>,
}

impl CategoryBranch<'_> {
    pub fn total(&self) -> u64 {
        self.leaves.iter().map(|(_, n)| n).sum()
    }
}

/// One private actor of a sector with its categories in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateBranch<'a> {
    pub private_id: u32,
    pub categories: Vec<CategoryBranch<'a>>,
}

impl PrivateBranch<'_> {
    pub fn total(&self) -> u64 {
        self.categories.iter().map(CategoryBranch::total).sum()
    }
}

impl AggregationTree {
    /// Fold every reporting private actor (ascending id) into the tree.
    pub fn build(records: &Records, sectors: &SectorAssignment) -> BuildResult<Self> {
        let mut tree = Self::default();

        for (private_id, reports) in &records.reports {
            let Some(sector) = sectors.sector_of(*private_id) else {
                return Err(BuildError::DanglingReference {
                    table: Table::Reports,
                    id: reports.first().map(|r| r.id).unwrap_or_default(),
                    referenced: format!("unclassified private actor {}", private_id),
                });
            };

            let links = count_public_links(reports, &records.publics)?;
            for link in links.values() {
                tree.add(sector, *private_id, &link.category, link.id, link.count);
            }
        }

        info!(
            sectors = tree.by_sector.len(),
            leaves = tree.entries.len(),
            total = tree.total(),
            "built aggregation tree"
        );
        Ok(tree)
    }

    /// Add `count` to a leaf, creating it on first access.
    pub fn add(&mut self, sector: &str, private_id: u32, category: &str, public_id: u32, count: u64) {
        let key = (sector.to_string(), private_id, category.to_string(), public_id);
        match self.index.get(&key) {
            Some(&i) => self.entries[i].count += count,
            None => {
                let i = self.entries.len();
                self.index.insert(key, i);
                self.by_sector.entry(sector.to_string()).or_default().push(i);
                self.by_category.entry(category.to_string()).or_default().push(i);
                self.entries.push(TreeEntry {
                    sector: sector.to_string(),
                    private_id,
                    category: category.to_string(),
                    public_id,
                    count,
                });
            }
        }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn leaf(&self, sector: &str, private_id: u32, category: &str, public_id: u32) -> Option<u64> {
        let key = (sector.to_string(), private_id, category.to_string(), public_id);
        self.index.get(&key).map(|&i| self.entries[i].count)
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Sectors in first-seen order.
    pub fn sectors(&self) -> Vec<&str> {
        first_seen(self.entries.iter().map(|e| e.sector.as_str()))
    }

    /// Public categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        first_seen(self.entries.iter().map(|e| e.category.as_str()))
    }

    pub fn has_sector(&self, sector: &str) -> bool {
        self.by_sector.contains_key(sector)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.by_category.contains_key(category)
    }

    pub fn in_sector<'a>(&'a self, sector: &str) -> impl Iterator<Item = &'a TreeEntry> {
        self.by_sector
            .get(sector)
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    pub fn in_category<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a TreeEntry> {
        self.by_category
            .get(category)
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    /// Group a sector's leaves by private actor, then by category, in one
    /// pass. Every level keeps first-seen order.
    pub fn branches(&self, sector: &str) -> Vec<PrivateBranch<'_>> {
        let mut out: Vec<PrivateBranch<'_>> = Vec::new();
        let mut privates: HashMap<u32, usize> = HashMap::new();
        let mut categories: HashMap<(u32, &str), usize> = HashMap::new();

        for entry in self.in_sector(sector) {
            let p = *privates.entry(entry.private_id).or_insert_with(|| {
                out.push(PrivateBranch {
                    private_id: entry.private_id,
                    categories: Vec::new(),
                });
                out.len() - 1
            });
            let branch = &mut out[p];
            let c = *categories
                .entry((entry.private_id, entry.category.as_str()))
                .or_insert_with(|| {
                    branch.categories.push(CategoryBranch {
                        category: entry.category.as_str(),
                        leaves: Vec::new(),
                    });
                    branch.categories.len() - 1
                });
            branch.categories[c].leaves.push((entry.public_id, entry.count));
        }
        out
    }

    /// Sum of all leaves under one private actor.
    #[cfg(test)]
    pub fn private_total(&self, private_id: u32) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.private_id == private_id)
            .map(|e| e.count)
            .sum()
    }

    /// Per sector (first-seen order): total and per-category sums (first-seen order).
    pub fn sector_totals(&self) -> Vec<SectorTotal> {
        self.sectors()
            .into_iter()
            .map(|sector| {
                let mut by_category: Vec<(String, u64)> = Vec::new();
                let mut slot: HashMap<&str, usize> = HashMap::new();
                for entry in self.in_sector(sector) {
                    match slot.get(entry.category.as_str()) {
                        Some(&i) => by_category[i].1 += entry.count,
                        None => {
                            slot.insert(entry.category.as_str(), by_category.len());
                            by_category.push((entry.category.clone(), entry.count));
                        }
                    }
                }
                SectorTotal {
                    sector: sector.to_string(),
                    total: by_category.iter().map(|(_, n)| n).sum(),
                    by_category,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorTotal {
    pub sector: String,
    pub total: u64,
    pub by_category: Vec<(String, u64)>,
}

/// Deduplicate, keeping first occurrences in order.
fn first_seen<T: Copy + Eq + Hash>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::records::Month;
    use pretty_assertions::assert_eq;

    fn sample_tree() -> (Records, AggregationTree) {
        let records = fixtures::sample_records();
        let sectors = SectorAssignment::from_records(&records).unwrap();
        let tree = AggregationTree::build(&records, &sectors).unwrap();
        (records, tree)
    }

    #[test]
    fn worked_example() {
        let (_, tree) = sample_tree();
        assert_eq!(tree.leaf("Energy", 1, "Municipal", 10), Some(2));
        assert_eq!(tree.leaf("Energy", 1, "Provincial", 11), Some(1));
        assert_eq!(tree.leaf("Energy", 1, "Legislative", 12), None);
    }

    #[test]
    fn leaves_sum_to_report_links() {
        let (records, tree) = sample_tree();
        for (private_id, reports) in &records.reports {
            let expected: u64 = reports.iter().map(|r| r.public_ids.len() as u64).sum();
            assert_eq!(tree.private_total(*private_id), expected, "private {}", private_id);
        }
    }

    #[test]
    fn first_seen_ordering() {
        let (_, tree) = sample_tree();
        assert_eq!(tree.sectors(), vec!["Energy", "Finance", "Climate change"]);
        // Private 3 reaches 12 before 10 in its reports, but leaves are
        // folded in public-id order.
        let categories: Vec<&str> = tree.branches("Climate change")[0]
            .categories
            .iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(categories, vec!["Municipal", "Legislative"]);
        assert_eq!(tree.categories(), vec!["Municipal", "Provincial", "Legislative"]);
    }

    #[test]
    fn sector_totals_group_by_category() {
        let (_, tree) = sample_tree();
        let totals = tree.sector_totals();
        assert_eq!(
            totals[1],
            SectorTotal {
                sector: "Finance".into(),
                total: 2,
                by_category: vec![("Provincial".into(), 1), ("Legislative".into(), 1)],
            }
        );
    }

    #[test]
    fn link_counter_counts_reports() {
        let (records, _) = sample_tree();
        let links = count_public_links(&records.reports[&1], &records.publics).unwrap();
        assert_eq!(
            links[&10],
            PublicLink {
                id: 10,
                name: "Ville de Montréal".into(),
                category: "Municipal".into(),
                count: 2,
            }
        );
        assert_eq!(links[&11].count, 1);
    }

    #[test]
    fn unknown_public_fails_fast() {
        let publics = BTreeMap::new();
        let reports = vec![Report {
            id: 7,
            private_id: 1,
            public_ids: vec![99],
            month: Month::new(2021, 1).unwrap(),
        }];
        assert!(matches!(
            count_public_links(&reports, &publics),
            Err(BuildError::DanglingReference { id: 7, .. })
        ));
    }

    #[test]
    fn branches_group_by_private_then_category() {
        let mut tree = AggregationTree::default();
        tree.add("Energy", 2, "Municipal", 10, 1);
        tree.add("Energy", 1, "Provincial", 11, 4);
        tree.add("Finance", 3, "Municipal", 10, 9);
        tree.add("Energy", 2, "Provincial", 11, 2);
        tree.add("Energy", 2, "Municipal", 12, 3);

        assert_eq!(
            tree.branches("Energy"),
            vec![
                PrivateBranch {
                    private_id: 2,
                    categories: vec![
                        CategoryBranch { category: "Municipal", leaves: vec![(10, 1), (12, 3)] },
                        CategoryBranch { category: "Provincial", leaves: vec![(11, 2)] },
                    ],
                },
                PrivateBranch {
                    private_id: 1,
                    categories: vec![CategoryBranch { category: "Provincial", leaves: vec![(11, 4)] }],
                },
            ]
        );
        assert_eq!(tree.branches("Energy")[0].total(), 6);
        assert!(tree.branches("Mining").is_empty());
    }

    #[test]
    fn sector_and_category_lookups_use_the_index() {
        let mut tree = AggregationTree::default();
        tree.add("Energy", 1, "Municipal", 10, 1);
        tree.add("Finance", 2, "Provincial", 11, 1);
        tree.add("Energy", 3, "Provincial", 11, 5);

        let energy: Vec<u32> = tree.in_sector("Energy").map(|e| e.private_id).collect();
        assert_eq!(energy, vec![1, 3]);
        let provincial: Vec<u32> = tree.in_category("Provincial").map(|e| e.private_id).collect();
        assert_eq!(provincial, vec![2, 3]);
        assert!(tree.has_sector("Finance"));
        assert!(!tree.has_category("Legislative"));
        assert_eq!(tree.in_sector("Mining").count(), 0);
    }

    #[test]
    fn add_accumulates() {
        let mut tree = AggregationTree::default();
        tree.add("Energy", 1, "Municipal", 10, 2);
        tree.add("Energy", 1, "Municipal", 10, 3);
        assert_eq!(tree.leaf("Energy", 1, "Municipal", 10), Some(5));
        assert_eq!(tree.entries().len(), 1);
    }
}
