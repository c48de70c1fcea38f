//! Drill-down navigation.
//!
//! The flow diagram narrows along two independent dimensions: the private
//! side (a sector) and the public side (a category). Each dimension can be
//! zoomed once; a second zoom on the same dimension is ignored and only a
//! full reset clears either one.
//!
//! The state is owned by a single [`Controller`]. Every event takes
//! `&mut Controller`, so the read-decide-write of one event cannot
//! interleave with another.

use crate::flow::slice::{self, FlowDataset};
use crate::model::AggregationTree;
use crate::records::Actor;

use serde::Serialize;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Navigation {
    #[default]
    Unzoomed,
    SectorZoomed {
        sector: String,
    },
    CategoryZoomed {
        category: String,
    },
    BothZoomed {
        sector: String,
        category: String,
    },
}

impl Navigation {
    pub fn sector(&self) -> Option<&str> {
        match self {
            Navigation::SectorZoomed { sector } | Navigation::BothZoomed { sector, .. } => {
                Some(sector)
            }
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Navigation::CategoryZoomed { category } | Navigation::BothZoomed { category, .. } => {
                Some(category)
            }
            _ => None,
        }
    }

    /// Zoom the private side. Returns false, leaving the state untouched,
    /// when a sector is already zoomed.
    pub fn zoom_sector(&mut self, sector: &str) -> bool {
        let next = match self {
            Navigation::Unzoomed => Navigation::SectorZoomed {
                sector: sector.to_string(),
            },
            Navigation::CategoryZoomed { category } => Navigation::BothZoomed {
                sector: sector.to_string(),
                category: std::mem::take(category),
            },
            Navigation::SectorZoomed { .. } | Navigation::BothZoomed { .. } => return false,
        };
        *self = next;
        true
    }

    /// Zoom the public side. Returns false when a category is already zoomed.
    pub fn zoom_category(&mut self, category: &str) -> bool {
        let next = match self {
            Navigation::Unzoomed => Navigation::CategoryZoomed {
                category: category.to_string(),
            },
            Navigation::SectorZoomed { sector } => Navigation::BothZoomed {
                sector: std::mem::take(sector),
                category: category.to_string(),
            },
            Navigation::CategoryZoomed { .. } | Navigation::BothZoomed { .. } => return false,
        };
        *self = next;
        true
    }

    pub fn reset(&mut self) {
        *self = Navigation::Unzoomed;
    }
}

/// User interactions on the flow diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowEvent {
    LinkActivated { sector: String, category: String },
    PublicNodeActivated { category: String },
    PrivateNodeActivated { sector: String },
    Reset,
}

impl FlowEvent {
    /// Stable lookup key, shared with the HTML host.
    pub fn key(&self) -> String {
        match self {
            FlowEvent::LinkActivated { sector, category } => {
                format!("link:{}|{}", key_part(sector), key_part(category))
            }
            FlowEvent::PublicNodeActivated { category } => format!("public:{}", key_part(category)),
            FlowEvent::PrivateNodeActivated { sector } => format!("private:{}", key_part(sector)),
            FlowEvent::Reset => "reset".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown flow event {0:?} (expected reset, link:SECTOR|CATEGORY, public:CATEGORY or private:SECTOR)")]
pub struct ParseEventError(String);

/// Inverse of [`FlowEvent::key`].
impl FromStr for FlowEvent {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseEventError(s.to_string());
        if s == "reset" {
            return Ok(FlowEvent::Reset);
        }
        let (kind, rest) = s.split_once(':').ok_or_else(invalid)?;
        let event = match kind {
            "link" => {
                let (sector, category) = rest.split_once('|').ok_or_else(invalid)?;
                FlowEvent::LinkActivated {
                    sector: unescape_part(sector),
                    category: unescape_part(category),
                }
            }
            "public" => FlowEvent::PublicNodeActivated {
                category: unescape_part(rest),
            },
            "private" => FlowEvent::PrivateNodeActivated {
                sector: unescape_part(rest),
            },
            _ => return Err(invalid()),
        };
        Ok(event)
    }
}

/// Names go into keys with `%`, `|` and `:` percent-encoded, so a key
/// always splits back into the names it was built from.
fn key_part(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '|' => out.push_str("%7C"),
            ':' => out.push_str("%3A"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_part(part: &str) -> String {
    // Every '%' in an encoded part starts an escape, so "%25" goes last.
    part.replace("%7C", "|").replace("%3A", ":").replace("%25", "%")
}

/// Which projection is currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Top,
    SectorCategory { sector: String, category: String },
    Category { category: String, sector: Option<String> },
    Sector { sector: String, category: Option<String> },
}

impl View {
    pub fn key(&self) -> String {
        match self {
            View::Top => "top".to_string(),
            View::SectorCategory { sector, category } => {
                format!("link:{}|{}", key_part(sector), key_part(category))
            }
            View::Category { category, sector: None } => format!("category:{}", key_part(category)),
            View::Category {
                category,
                sector: Some(sector),
            } => format!("category:{}|sector:{}", key_part(category), key_part(sector)),
            View::Sector { sector, category: None } => format!("sector:{}", key_part(sector)),
            View::Sector {
                sector,
                category: Some(category),
            } => format!("sector:{}|category:{}", key_part(sector), key_part(category)),
        }
    }

    pub fn dataset(&self, tree: &AggregationTree, top_sectors: usize) -> FlowDataset {
        match self {
            View::Top => slice::top_level(tree, top_sectors),
            View::SectorCategory { sector, category } => slice::sector_category(tree, sector, category),
            View::Category { category, sector } => slice::category(tree, category, sector.as_deref()),
            View::Sector { sector, category } => slice::sector(tree, sector, category.as_deref()),
        }
    }

    /// Whether (sources, targets) are actor ids rather than sector/category names.
    fn id_sides(&self) -> (bool, bool) {
        match self {
            View::Top => (false, false),
            View::SectorCategory { .. } => (true, true),
            View::Category { sector, .. } => (sector.is_some(), true),
            View::Sector { category, .. } => (true, category.is_some()),
        }
    }
}

/// Every view reachable from the top-level one and the event -> view table.
#[derive(Debug, Clone, Serialize)]
pub struct ViewGraph {
    pub initial: String,
    pub views: BTreeMap<String, FlowDataset>,
    /// View key -> (event key -> view key). Events that are no-ops are absent.
    pub transitions: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone)]
pub struct Controller<'a> {
    tree: &'a AggregationTree,
    actors: &'a BTreeMap<u32, Actor>,
    top_sectors: usize,
    nav: Navigation,
    view: View,
}

impl<'a> Controller<'a> {
    pub fn new(tree: &'a AggregationTree, actors: &'a BTreeMap<u32, Actor>, top_sectors: usize) -> Self {
        Self {
            tree,
            actors,
            top_sectors,
            nav: Navigation::Unzoomed,
            view: View::Top,
        }
    }

    pub fn navigation(&self) -> &Navigation {
        &self.nav
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Dataset of the current view, id nodes labelled with actor names.
    pub fn current(&self) -> FlowDataset {
        let dataset = self.view.dataset(self.tree, self.top_sectors);
        let (sources_are_ids, targets_are_ids) = self.view.id_sides();
        let publics: HashSet<String> = dataset.public_names.iter().cloned().collect();
        dataset.with_labels(|name| {
            let id_side = if publics.contains(name) {
                targets_are_ids
            } else {
                sources_are_ids
            };
            if !id_side {
                return None;
            }
            let id: u32 = name.parse().ok()?;
            self.actors.get(&id).map(|a| a.name.clone())
        })
    }

    /// Handle one event. Returns the new dataset, or None if the event was a no-op.
    pub fn handle(&mut self, event: &FlowEvent) -> Option<FlowDataset> {
        self.apply(event).then(|| self.current())
    }

    pub fn reset(&mut self) -> FlowDataset {
        self.apply(&FlowEvent::Reset);
        self.current()
    }

    fn apply(&mut self, event: &FlowEvent) -> bool {
        match event {
            FlowEvent::LinkActivated { sector, category } => {
                if self.nav != Navigation::Unzoomed {
                    debug!(?event, nav = ?self.nav, "link ignored while zoomed");
                    return false;
                }
                if !self.tree.has_sector(sector) || !self.tree.has_category(category) {
                    debug!(?event, "link does not name a sector and category");
                    return false;
                }
                self.view = View::SectorCategory {
                    sector: sector.clone(),
                    category: category.clone(),
                };
            }
            FlowEvent::PublicNodeActivated { category } => {
                if self.nav.category().is_some() {
                    debug!(?event, nav = ?self.nav, "category already zoomed");
                    return false;
                }
                if !self.tree.has_category(category) {
                    debug!(?event, "not a public category");
                    return false;
                }
                self.view = View::Category {
                    category: category.clone(),
                    sector: self.nav.sector().map(str::to_string),
                };
                self.nav.zoom_category(category);
            }
            FlowEvent::PrivateNodeActivated { sector } => {
                if self.nav.sector().is_some() {
                    debug!(?event, nav = ?self.nav, "sector already zoomed");
                    return false;
                }
                if !self.tree.has_sector(sector) {
                    debug!(?event, "not a sector");
                    return false;
                }
                self.view = View::Sector {
                    sector: sector.clone(),
                    category: self.nav.category().map(str::to_string),
                };
                self.nav.zoom_sector(sector);
            }
            FlowEvent::Reset => {
                self.nav.reset();
                self.view = View::Top;
            }
        }
        debug!(view = %self.view.key(), nav = ?self.nav, "navigated");
        true
    }

    /// Walk every view reachable from the top-level one (breadth first).
    /// Each view's dataset is computed once; reset is an edge of every view.
    pub fn explore(&self) -> ViewGraph {
        let mut start = self.clone();
        let top = start.reset();
        let initial = start.view.key();

        let mut views: BTreeMap<String, FlowDataset> = BTreeMap::new();
        let mut transitions: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut queued: HashSet<String> = HashSet::from([initial.clone()]);
        let mut queue = VecDeque::from([(start, top)]);

        while let Some((ctl, dataset)) = queue.pop_front() {
            let key = ctl.view.key();

            let mut edges: BTreeMap<String, String> = BTreeMap::new();
            for event in candidate_events(&dataset).into_iter().chain([FlowEvent::Reset]) {
                let event_key = event.key();
                if edges.contains_key(&event_key) {
                    continue;
                }
                let mut next = ctl.clone();
                if !next.apply(&event) {
                    continue;
                }
                let target = next.view.key();
                if queued.insert(target.clone()) {
                    let next_dataset = next.current();
                    queue.push_back((next, next_dataset));
                }
                edges.insert(event_key, target);
            }

            views.insert(key.clone(), dataset);
            transitions.insert(key, edges);
        }

        ViewGraph {
            initial,
            views,
            transitions,
        }
    }
}

/// Clicks available on a rendered dataset: every link, and every node as
/// a public or private node depending on its side.
fn candidate_events(dataset: &FlowDataset) -> Vec<FlowEvent> {
    let links = dataset.links.iter().map(|l| FlowEvent::LinkActivated {
        sector: l.source.clone(),
        category: l.target.clone(),
    });
    let publics: HashSet<&str> = dataset.public_names.iter().map(String::as_str).collect();
    let nodes = dataset.nodes.iter().map(|n| {
        if publics.contains(n.name.as_str()) {
            FlowEvent::PublicNodeActivated {
                category: n.name.clone(),
            }
        } else {
            FlowEvent::PrivateNodeActivated {
                sector: n.name.clone(),
            }
        }
    });
    links.chain(nodes).collect()
}
