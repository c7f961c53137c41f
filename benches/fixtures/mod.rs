// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use kindred::model::{Family, FamilyId, Gender, Individual, IndividualId, ProjectData};

const FIRST_NAMES: &[&str] = &[
    "Anna", "Bernd", "Clara", "Dieter", "Elsa", "Fritz", "Greta", "Hans", "Ida", "Jakob", "Karla",
    "Ludwig", "Marta", "Nils", "Olga", "Paul",
];

const LAST_NAMES: &[&str] =
    &["Becker", "Fischer", "Hoffmann", "Koch", "Meyer", "Richter", "Schmidt", "Wagner", "Weber"];

#[derive(Debug, Clone, Copy)]
pub enum Case {
    TreeSmall,
    TreeMedium,
    TreeLarge,
}

impl Case {
    pub const ALL: [Self; 3] = [Self::TreeSmall, Self::TreeMedium, Self::TreeLarge];

    pub fn id(self) -> &'static str {
        match self {
            Self::TreeSmall => "small",
            Self::TreeMedium => "medium",
            Self::TreeLarge => "large",
        }
    }

    /// (generations, children per family)
    fn shape(self) -> (usize, usize) {
        match self {
            Self::TreeSmall => (3, 2),
            Self::TreeMedium => (5, 3),
            Self::TreeLarge => (7, 3),
        }
    }
}

struct TreeBuilder {
    data: ProjectData,
    persons: usize,
    families: usize,
}

/// A couple whose family is inserted once its children exist.
struct Couple {
    husband: IndividualId,
    wife: IndividualId,
    lineage: &'static str,
}

impl TreeBuilder {
    fn person(&mut self, last_name: &str, gender: Gender) -> IndividualId {
        self.persons += 1;
        let individual_id = IndividualId::new(format!("I{}", self.persons)).expect("individual id");
        let first_name = FIRST_NAMES[self.persons % FIRST_NAMES.len()];
        let mut individual = Individual::new(individual_id.clone(), first_name, last_name);
        individual.set_gender(Some(gender));
        individual.set_birth_year(Some(1800 + (self.persons % 200) as i32));
        self.data.insert_individual(individual).expect("insert individual");
        individual_id
    }

    fn family(&mut self, couple: Couple, children: Vec<IndividualId>) {
        self.families += 1;
        let family_id = FamilyId::new(format!("F{}", self.families)).expect("family id");
        let mut family = Family::with_spouses(family_id, Some(couple.husband), Some(couple.wife));
        *family.child_ids_mut() = children;
        self.data.insert_family(family).expect("insert family");
    }
}

/// A lineage tree: one founding couple, every child in all but the last generation marries in
/// a spouse and has the same number of children.
pub fn tree(case: Case) -> ProjectData {
    let (generations, children_per_family) = case.shape();
    let mut builder = TreeBuilder { data: ProjectData::default(), persons: 0, families: 0 };

    let husband = builder.person(LAST_NAMES[0], Gender::Male);
    let wife = builder.person(LAST_NAMES[1], Gender::Female);
    let mut couples = vec![Couple { husband, wife, lineage: LAST_NAMES[0] }];

    for generation in 1..generations {
        let mut next = Vec::new();
        for couple in couples {
            let mut children = Vec::with_capacity(children_per_family);
            for index in 0..children_per_family {
                let gender = if index % 2 == 0 { Gender::Male } else { Gender::Female };
                let child_id = builder.person(couple.lineage, gender);
                if generation + 1 < generations {
                    let spouse_name = LAST_NAMES[(builder.persons + 2) % LAST_NAMES.len()];
                    next.push(match gender {
                        Gender::Male => Couple {
                            husband: child_id.clone(),
                            wife: builder.person(spouse_name, Gender::Female),
                            lineage: couple.lineage,
                        },
                        _ => Couple {
                            husband: builder.person(spouse_name, Gender::Male),
                            wife: child_id.clone(),
                            lineage: spouse_name,
                        },
                    });
                }
                children.push(child_id);
            }
            builder.family(couple, children);
        }
        couples = next;
    }

    builder.data
}
