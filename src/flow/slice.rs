//! Flow-diagram projections of the aggregation tree.
//!
//! Each slice flattens part of the tree into `(source, target, value)`
//! links. Sources are always on the private side (sector or private actor
//! id), targets on the public side (category or public actor id).

use crate::model::AggregationTree;

use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    pub value: u64,
}

impl FlowLink {
    fn new(source: impl Into<String>, target: impl Into<String>, value: u64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    /// Position in first-seen order; carries no other meaning.
    pub node: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowDataset {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
    /// Distinct public-side names, first-seen order.
    pub public_names: Vec<String>,
}

impl FlowDataset {
    pub fn from_links(links: Vec<FlowLink>) -> Self {
        Self {
            nodes: build_nodes(&links),
            public_names: public_names(&links),
            links,
        }
    }

    /// Attach display labels to nodes `lookup` knows about.
    pub fn with_labels(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for node in &mut self.nodes {
            node.label = lookup(&node.name);
        }
        self
    }
}

/// One node per distinct name, ordinals in first-seen order (source before
/// target within each link).
pub fn build_nodes(links: &[FlowLink]) -> Vec<FlowNode> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::new();
    for link in links {
        for name in [link.source.as_str(), link.target.as_str()] {
            if seen.insert(name) {
                nodes.push(FlowNode {
                    node: nodes.len(),
                    name: name.to_string(),
                    label: None,
                });
            }
        }
    }
    nodes
}

fn public_names(links: &[FlowLink]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    links
        .iter()
        .filter(|l| seen.insert(l.target.as_str()))
        .map(|l| l.target.clone())
        .collect()
}

/// Initial view: top `limit` sectors by total, one link per (sector, category).
pub fn top_level(tree: &AggregationTree, limit: usize) -> FlowDataset {
    let mut totals = tree.sector_totals();
    // Stable: equal totals keep encounter order.
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals.truncate(limit);

    let links = totals
        .into_iter()
        .flat_map(|t| {
            let sector = t.sector;
            t.by_category
                .into_iter()
                .filter(|(_, n)| *n > 0)
                .map(move |(category, n)| FlowLink::new(sector.clone(), category, n))
        })
        .collect();
    FlowDataset::from_links(links)
}

/// A (sector, category) link was activated: private actors of the sector
/// against the public actors of the category.
pub fn sector_category(tree: &AggregationTree, sector: &str, category: &str) -> FlowDataset {
    let links = tree
        .in_sector(sector)
        .filter(|e| e.category == category)
        .map(|e| FlowLink::new(e.private_id.to_string(), e.public_id.to_string(), e.count))
        .collect();
    FlowDataset::from_links(links)
}

/// A category node was activated. Without a zoomed sector every sector is
/// linked to the category's public actors; with one, this is the sector x
/// category slice.
pub fn category(tree: &AggregationTree, category: &str, sector: Option<&str>) -> FlowDataset {
    if let Some(sector) = sector {
        return sector_category(tree, sector, category);
    }

    let mut links: Vec<FlowLink> = Vec::new();
    let mut index: HashMap<(&str, u32), usize> = HashMap::new();
    for entry in tree.in_category(category) {
        match index.get(&(entry.sector.as_str(), entry.public_id)) {
            Some(&i) => links[i].value += entry.count,
            None => {
                index.insert((entry.sector.as_str(), entry.public_id), links.len());
                links.push(FlowLink::new(
                    entry.sector.clone(),
                    entry.public_id.to_string(),
                    entry.count,
                ));
            }
        }
    }
    FlowDataset::from_links(links)
}

/// A sector node was activated: its private actors against categories, or
/// against the public actors of the zoomed category.
pub fn sector(tree: &AggregationTree, sector: &str, category: Option<&str>) -> FlowDataset {
    let mut links: Vec<FlowLink> = Vec::new();
    for branch in tree.branches(sector) {
        let private = branch.private_id.to_string();
        for cat in branch.categories {
            match category {
                None => links.push(FlowLink::new(private.clone(), cat.category, cat.total())),
                Some(zoomed) if zoomed == cat.category => {
                    links.extend(cat.leaves.into_iter().map(|(public_id, n)| {
                        FlowLink::new(private.clone(), public_id.to_string(), n)
                    }));
                }
                Some(_) => {}
            }
        }
    }
    FlowDataset::from_links(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::model::{SectorAssignment, build_aggregates};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn sample_tree() -> AggregationTree {
        build_aggregates(&fixtures::sample_records()).unwrap().tree
    }

    fn link(source: &str, target: &str, value: u64) -> FlowLink {
        FlowLink::new(source, target, value)
    }

    #[test]
    fn top_level_sorts_stably() {
        let flow = top_level(&sample_tree(), 10);
        assert_eq!(
            flow.links,
            vec![
                link("Energy", "Municipal", 2),
                link("Energy", "Provincial", 1),
                link("Climate change", "Municipal", 2),
                link("Climate change", "Legislative", 1),
                link("Finance", "Provincial", 1),
                link("Finance", "Legislative", 1),
            ]
        );
        assert_eq!(flow.public_names, vec!["Municipal", "Provincial", "Legislative"]);
    }

    #[test]
    fn top_level_keeps_ten_heaviest_sectors() {
        let mut tree = AggregationTree::default();
        // Sector Sk gets k reports; S3 ties with the earlier "tie" sector.
        tree.add("tie", 100, "Municipal", 1, 3);
        for k in 1..=12u64 {
            tree.add(&format!("S{k}"), k as u32, "Municipal", 1, k);
        }

        let flow = top_level(&tree, 10);
        let sources: Vec<&str> = flow.links.iter().map(|l| l.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["S12", "S11", "S10", "S9", "S8", "S7", "S6", "S5", "S4", "tie"]
        );
        assert!(sources.len() <= 10);
    }

    #[test]
    fn zero_links_are_dropped_at_top_level() {
        let mut tree = AggregationTree::default();
        tree.add("Energy", 1, "Municipal", 10, 0);
        tree.add("Energy", 1, "Provincial", 11, 2);
        let flow = top_level(&tree, 10);
        assert_eq!(flow.links, vec![link("Energy", "Provincial", 2)]);
    }

    #[test]
    fn sector_category_lists_private_public_pairs() {
        let flow = sector_category(&sample_tree(), "Climate change", "Municipal");
        assert_eq!(flow.links, vec![link("3", "10", 2)]);
        assert_eq!(flow.public_names, vec!["10"]);

        let none = sector_category(&sample_tree(), "Energy", "Legislative");
        assert!(none.links.is_empty());
    }

    #[test]
    fn category_without_sector_merges_per_sector() {
        let mut tree = sample_tree();
        tree.add("Energy", 7, "Municipal", 10, 4);
        let flow = category(&tree, "Municipal", None);
        assert_eq!(
            flow.links,
            vec![link("Energy", "10", 6), link("Climate change", "10", 2)]
        );
    }

    #[test]
    fn category_with_sector_delegates() {
        let tree = sample_tree();
        assert_eq!(
            category(&tree, "Provincial", Some("Finance")),
            sector_category(&tree, "Finance", "Provincial")
        );
    }

    #[test]
    fn sector_without_category_aggregates() {
        let flow = sector(&sample_tree(), "Finance", None);
        assert_eq!(
            flow.links,
            vec![link("2", "Provincial", 1), link("2", "Legislative", 1)]
        );
    }

    #[test]
    fn sector_with_category_lists_publics() {
        let tree = sample_tree();
        let flow = sector(&tree, "Energy", Some("Municipal"));
        assert_eq!(flow.links, vec![link("1", "10", 2)]);
        assert_eq!(flow, sector_category(&tree, "Energy", "Municipal"));
    }

    #[test]
    fn sector_slice_scales_linearly() {
        let mut tree = AggregationTree::default();
        for private_id in 0..20_000u32 {
            tree.add("Energy", private_id, "Municipal", 1, 1);
            tree.add("Energy", private_id, "Provincial", 2, 2);
        }

        let started = std::time::Instant::now();
        let flow = sector(&tree, "Energy", None);
        let zoomed = sector(&tree, "Energy", Some("Provincial"));
        let elapsed = started.elapsed();

        assert_eq!(flow.links.len(), 40_000);
        assert_eq!(flow.links[1], link("0", "Provincial", 2));
        assert_eq!(zoomed.links.len(), 20_000);
        assert!(elapsed.as_secs() < 5, "sector slice took {elapsed:?}");
    }

    #[test]
    fn nodes_first_seen() {
        let links = vec![link("A", "x", 1), link("B", "x", 2), link("A", "y", 3)];
        let names: Vec<(usize, String)> = build_nodes(&links)
            .into_iter()
            .map(|n| (n.node, n.name))
            .collect();
        assert_eq!(
            names,
            vec![(0, "A".into()), (1, "x".into()), (2, "B".into()), (3, "y".into())]
        );
    }

    #[test]
    fn node_set_ignores_link_order() {
        let flow = top_level(&sample_tree(), 10);
        let mut reversed = flow.links.clone();
        reversed.reverse();

        let names = |links: &[FlowLink]| -> BTreeSet<String> {
            build_nodes(links).into_iter().map(|n| n.name).collect()
        };
        assert_eq!(names(&flow.links), names(&reversed));
    }

    #[test]
    fn labels() {
        let flow = sector_category(&sample_tree(), "Energy", "Municipal")
            .with_labels(|name| (name == "10").then(|| "Ville de Montréal".to_string()));
        assert_eq!(flow.nodes[1].label.as_deref(), Some("Ville de Montréal"));
        assert_eq!(flow.nodes[0].label, None);
    }

    #[test]
    fn classification_is_reflected() {
        let records = fixtures::sample_records();
        let sectors = SectorAssignment::from_records(&records).unwrap();
        let tree = AggregationTree::build(&records, &sectors).unwrap();
        let flow = top_level(&tree, 10);
        assert!(!flow.nodes.iter().any(|n| n.name == "Agriculture"));
    }
}
