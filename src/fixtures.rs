//! Shared test fixtures.
//!
//! Sample data set:
//! - private 1 "Hydro Nord" (QC), sectors Energy 5 / Mining 2 -> Energy
//! - private 2 "Banque Laurentienne" (ON), Finance 4 -> Finance
//! - private 3 "Verdure" (TX -> International), Agriculture 1 / Climate change 3 / Energy 6
//!   -> Climate change (sticky)
//! - private 4 "Mine du Nord", Mining 3, no reports
//! - publics 10 Municipal, 11 Provincial, 12 Legislative

use crate::records::raw::{RawActor, RawPrivate, RawPublic, RawReport, RawTables};

pub fn raw_actor(id: u32, name: &str, kind: &str, province: &str) -> RawActor {
    RawActor {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        report_ids: "[]".to_string(),
        sectors: "[]".to_string(),
        province: province.to_string(),
    }
}

pub fn raw_private(id: u32, sectors: &str) -> RawPrivate {
    RawPrivate {
        id: id.to_string(),
        sectors: sectors.to_string(),
    }
}

pub fn raw_public(id: u32, category: &str) -> RawPublic {
    RawPublic {
        id: id.to_string(),
        category: category.to_string(),
    }
}

pub fn raw_report(id: u32, private_id: u32, public_ids: &str, date: &str) -> RawReport {
    RawReport {
        id: id.to_string(),
        private_ids: format!("[{}]", private_id),
        public_ids: public_ids.to_string(),
        date: date.to_string(),
    }
}

pub fn sample_tables() -> RawTables {
    RawTables {
        actors: vec![
            raw_actor(1, "Hydro Nord", "private", "QC"),
            raw_actor(2, "Banque Laurentienne", "private", "ON"),
            raw_actor(3, "Verdure", "private", "TX"),
            raw_actor(4, "Mine du Nord", "private", ""),
            raw_actor(10, "Ville de Montréal", "public", "QC"),
            raw_actor(11, "Ministère de l'Énergie", "public", "QC"),
            raw_actor(12, "Chambre des communes", "public", ""),
        ],
        privates: vec![
            raw_private(1, "{'Energy': 5, 'Mining': 2}"),
            raw_private(2, "{'Finance': 4}"),
            raw_private(3, "{'Agriculture': 1, 'Climate change': 3, 'Energy': 6}"),
            raw_private(4, "{'Mining': 3}"),
        ],
        publics: vec![
            raw_public(10, "Municipal"),
            raw_public(11, "Provincial"),
            raw_public(12, "Legislative"),
        ],
        reports: vec![
            raw_report(100, 1, "[10, 11]", "2021-03-05"),
            raw_report(101, 1, "[10]", "2021-03-09"),
            raw_report(102, 2, "[11, 12]", "2021-01-15"),
            raw_report(103, 3, "[10]", "2020-12-01"),
            raw_report(104, 2, "[]", "2021-02-02"),
            raw_report(105, 3, "[12, 10]", "2021-03-20"),
        ],
    }
}

pub fn sample_records() -> crate::records::Records {
    crate::records::normalize(&sample_tables()).expect("sample tables normalize")
}
