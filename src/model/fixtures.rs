// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::data::ProjectData;
use super::family::Family;
use super::ids::{FamilyId, IndividualId, MediaId, NodeId, TagId};
use super::individual::{Gender, Individual};

pub(crate) fn iid(value: &str) -> IndividualId {
    IndividualId::new(value).expect("individual id")
}

pub(crate) fn fid(value: &str) -> FamilyId {
    FamilyId::new(value).expect("family id")
}

pub(crate) fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

pub(crate) fn tid(value: &str) -> TagId {
    TagId::new(value).expect("tag id")
}

pub(crate) fn mid(value: &str) -> MediaId {
    MediaId::new(value).expect("media id")
}

fn person(data: &mut ProjectData, id: &str, first: &str, last: &str, gender: Gender) {
    let mut individual = Individual::new(iid(id), first, last);
    individual.set_gender(Some(gender));
    data.insert_individual(individual).expect("fixture individual");
}

fn family(
    data: &mut ProjectData,
    id: &str,
    husband: Option<&str>,
    wife: Option<&str>,
    children: &[&str],
) {
    let mut family = Family::with_spouses(fid(id), husband.map(iid), wife.map(iid));
    family.child_ids_mut().extend(children.iter().copied().map(iid));
    data.insert_family(family).expect("fixture family");
}

/// John + Jane Doe -> Jim, who marries Ann Smith -> Tom. Zoe is unrelated.
///
/// The relationship list is left empty.
pub(crate) fn three_generations() -> ProjectData {
    let mut data = ProjectData::default();
    person(&mut data, "I1", "John", "Doe", Gender::Male);
    person(&mut data, "I2", "Jane", "Doe", Gender::Female);
    person(&mut data, "I3", "Jim", "Doe", Gender::Male);
    person(&mut data, "I4", "Ann", "Smith", Gender::Female);
    person(&mut data, "I5", "Tom", "Doe", Gender::Male);
    person(&mut data, "I6", "Zoe", "", Gender::Female);

    family(&mut data, "F1", Some("I1"), Some("I2"), &["I3"]);
    family(&mut data, "F2", Some("I3"), Some("I4"), &["I5"]);
    data
}

/// Two people who are each other's child: nobody qualifies as a root.
pub(crate) fn mutual_ancestry() -> ProjectData {
    let mut data = ProjectData::default();
    person(&mut data, "I1", "Ada", "Loop", Gender::Female);
    person(&mut data, "I2", "Bo", "Loop", Gender::Male);

    family(&mut data, "F1", None, Some("I1"), &["I2"]);
    family(&mut data, "F2", Some("I2"), None, &["I1"]);
    data
}

/// A child whose family lists no spouse, next to a regular couple with three children.
pub(crate) fn foundling_and_siblings() -> ProjectData {
    let mut data = ProjectData::default();
    person(&mut data, "I1", "Karl", "Berg", Gender::Male);
    person(&mut data, "I2", "Lena", "Berg", Gender::Female);
    person(&mut data, "I3", "Anna", "Berg", Gender::Female);
    person(&mut data, "I4", "Ben", "Berg", Gender::Male);
    person(&mut data, "I5", "Cleo", "Berg", Gender::Female);
    person(&mut data, "I6", "Nils", "Unknown", Gender::Unknown);

    family(&mut data, "F1", Some("I1"), Some("I2"), &["I3", "I4", "I5"]);
    family(&mut data, "F2", None, None, &["I6"]);
    data
}
