// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, VecDeque};

use crate::model::{IndividualId, ProjectData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Parents of `individual_id`: the spouses of every family listing them as a child.
pub fn parents<'a>(data: &'a ProjectData, individual_id: &IndividualId) -> Vec<&'a IndividualId> {
    let mut out = Vec::new();
    for family in data.parent_families(individual_id) {
        for parent in family.husband_id().into_iter().chain(family.wife_id()) {
            if !out.contains(&parent) {
                out.push(parent);
            }
        }
    }
    out
}

/// Children of `individual_id` across all their families, in family then child order.
pub fn children<'a>(data: &'a ProjectData, individual_id: &IndividualId) -> Vec<&'a IndividualId> {
    let mut out = Vec::new();
    for family in data.spouse_families(individual_id) {
        for child in family.child_ids() {
            if !out.contains(&child) {
                out.push(child);
            }
        }
    }
    out
}

/// Every ancestor with its generation distance (parents = 1). Cyclic data terminates.
pub fn ancestors(
    data: &ProjectData,
    individual_id: &IndividualId,
) -> BTreeMap<IndividualId, usize> {
    bfs_generations(data, individual_id, Direction::Up)
}

/// Every descendant with its generation distance (children = 1). Cyclic data terminates.
pub fn descendants(
    data: &ProjectData,
    individual_id: &IndividualId,
) -> BTreeMap<IndividualId, usize> {
    bfs_generations(data, individual_id, Direction::Down)
}

/// Ancestors shared by `a` and `b`, closest first (by the larger of the two distances).
pub fn common_ancestors(
    data: &ProjectData,
    a: &IndividualId,
    b: &IndividualId,
) -> Vec<IndividualId> {
    let of_a = ancestors(data, a);
    let of_b = ancestors(data, b);
    let mut shared = of_a
        .iter()
        .filter_map(|(id, da)| of_b.get(id).map(|db| (id.clone(), (*da).max(*db))))
        .collect::<Vec<_>>();
    shared.sort_by(|(id_a, d_a), (id_b, d_b)| d_a.cmp(d_b).then_with(|| id_a.cmp(id_b)));
    shared.into_iter().map(|(id, _)| id).collect()
}

fn bfs_generations(
    data: &ProjectData,
    start: &IndividualId,
    direction: Direction,
) -> BTreeMap<IndividualId, usize> {
    let mut dist: BTreeMap<IndividualId, usize> = BTreeMap::new();
    if !data.individuals().contains_key(start) {
        return dist;
    }

    let mut queue: VecDeque<(IndividualId, usize)> = VecDeque::new();
    queue.push_back((start.clone(), 0));

    while let Some((individual_id, distance)) = queue.pop_front() {
        let next_distance = distance.saturating_add(1);
        let next = match direction {
            Direction::Up => parents(data, &individual_id),
            Direction::Down => children(data, &individual_id),
        };
        for next_id in next {
            if next_id == start || dist.contains_key(next_id) {
                continue;
            }
            dist.insert(next_id.clone(), next_distance);
            queue.push_back((next_id.clone(), next_distance));
        }
    }

    dist
}
