//! Raw rows -> typed entities.
//!
//! Normalization runs table by table. Privates and publics borrow their
//! names from the actors table, so a row referencing an unknown actor id
//! stops the build instead of being skipped.

use crate::error::{BuildError, BuildResult, Table};
use crate::records::entity::{
    Actor, ActorKind, PrivateActor, PublicActor, Records, Report, normalize_province,
};
use crate::records::list::{FieldRef, parse_list, parse_weights};
use crate::records::month::Month;
use crate::records::raw::{RawActor, RawPrivate, RawPublic, RawReport, RawTables};

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Normalize all four tables.
pub fn normalize(tables: &RawTables) -> BuildResult<Records> {
    let actors = normalize_actors(&tables.actors)?;
    let privates = normalize_privates(&tables.privates, &actors)?;
    let publics = normalize_publics(&tables.publics, &actors)?;
    let reports = group_reports(&tables.reports)?;

    info!(
        actors = actors.len(),
        privates = privates.len(),
        publics = publics.len(),
        reports = tables.reports.len(),
        "normalized input tables"
    );

    Ok(Records {
        actors,
        privates,
        publics,
        reports,
    })
}

pub fn normalize_actors(rows: &[RawActor]) -> BuildResult<BTreeMap<u32, Actor>> {
    let mut out = BTreeMap::new();
    for (idx, raw) in rows.iter().enumerate() {
        let row = idx + 1;
        let id = parse_id(&raw.id, FieldRef::new(Table::Actors, row, "id"))?;
        let kind: ActorKind = raw
            .kind
            .parse()
            .map_err(|_| FieldRef::new(Table::Actors, row, "public|private").malformed(&raw.kind))?;

        let actor = Actor {
            id,
            name: raw.name.clone(),
            kind,
            report_ids: parse_list(&raw.report_ids, FieldRef::new(Table::Actors, row, "idsRapport"))?,
            sectors: parse_list(&raw.sectors, FieldRef::new(Table::Actors, row, "sectors"))?,
            province: normalize_province(&raw.province),
        };

        if out.insert(id, actor).is_some() {
            return Err(BuildError::DuplicateId {
                table: Table::Actors,
                id,
            });
        }
    }
    Ok(out)
}

pub fn normalize_privates(
    rows: &[RawPrivate],
    actors: &BTreeMap<u32, Actor>,
) -> BuildResult<BTreeMap<u32, PrivateActor>> {
    let mut out = BTreeMap::new();
    for (idx, raw) in rows.iter().enumerate() {
        let row = idx + 1;
        let id = parse_id(&raw.id, FieldRef::new(Table::Privates, row, "id"))?;
        let actor = actors.get(&id).ok_or_else(|| BuildError::DanglingReference {
            table: Table::Privates,
            id,
            referenced: format!("actor {}", id),
        })?;
        if actor.kind != ActorKind::Private {
            warn!(id, name = %actor.name, "privates table lists an actor flagged public");
        }

        let private = PrivateActor {
            id,
            name: actor.name.clone(),
            sectors: parse_weights(&raw.sectors, FieldRef::new(Table::Privates, row, "sectors"))?,
            province: actor.province.clone(),
        };

        if out.insert(id, private).is_some() {
            return Err(BuildError::DuplicateId {
                table: Table::Privates,
                id,
            });
        }
    }
    Ok(out)
}

pub fn normalize_publics(
    rows: &[RawPublic],
    actors: &BTreeMap<u32, Actor>,
) -> BuildResult<BTreeMap<u32, PublicActor>> {
    let mut out = BTreeMap::new();
    for (idx, raw) in rows.iter().enumerate() {
        let row = idx + 1;
        let id = parse_id(&raw.id, FieldRef::new(Table::Publics, row, "idPublic"))?;
        let actor = actors.get(&id).ok_or_else(|| BuildError::DanglingReference {
            table: Table::Publics,
            id,
            referenced: format!("actor {}", id),
        })?;
        if actor.kind != ActorKind::Public {
            warn!(id, name = %actor.name, "publics table lists an actor flagged private");
        }

        let public = PublicActor {
            id,
            category: raw.category.trim().to_string(),
            name: actor.name.clone(),
        };

        if out.insert(id, public).is_some() {
            return Err(BuildError::DuplicateId {
                table: Table::Publics,
                id,
            });
        }
    }
    Ok(out)
}

/// Parse reports and group them by their (single) private actor, keeping
/// table order within each group.
pub fn group_reports(rows: &[RawReport]) -> BuildResult<BTreeMap<u32, Vec<Report>>> {
    let mut seen: BTreeSet<u32> = BTreeSet::new();
    let mut out: BTreeMap<u32, Vec<Report>> = BTreeMap::new();

    for (idx, raw) in rows.iter().enumerate() {
        let row = idx + 1;
        let id = parse_id(&raw.id, FieldRef::new(Table::Reports, row, "idCom"))?;
        if !seen.insert(id) {
            return Err(BuildError::DuplicateId {
                table: Table::Reports,
                id,
            });
        }

        let private_at = FieldRef::new(Table::Reports, row, "privatesIds");
        let private_ids: Vec<u32> = parse_list(&raw.private_ids, private_at)?;
        let private_id = match private_ids.as_slice() {
            [] => return Err(private_at.malformed_list(&raw.private_ids, "no private actor")),
            [only] => *only,
            [first, ..] => {
                warn!(
                    report = id,
                    count = private_ids.len(),
                    "report lists several private actors, keeping the first"
                );
                *first
            }
        };

        let public_ids: Vec<u32> =
            parse_list(&raw.public_ids, FieldRef::new(Table::Reports, row, "publicsIds"))?;

        let month = Month::from_date(&raw.date)
            .ok_or_else(|| FieldRef::new(Table::Reports, row, "date").malformed(&raw.date))?;

        out.entry(private_id).or_default().push(Report {
            id,
            private_id,
            public_ids: dedup_keep_order(public_ids),
            month,
        });
    }

    Ok(out)
}

fn parse_id(raw: &str, at: FieldRef) -> BuildResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| at.malformed(raw))
}

fn dedup_keep_order(ids: Vec<u32>) -> Vec<u32> {
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
