// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use rayon::prelude::*;
use smol_str::SmolStr;

use crate::model::{Individual, IndividualId};

/// Minimum fuzzy ratio (0..=1) for [`NameIndex::suggest`] results.
const SUGGEST_MIN_RATIO: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
struct NameEntry {
    first: String,
    last: String,
}

impl NameEntry {
    fn of(individual: &Individual) -> Self {
        Self { first: normalize(individual.first_name()), last: normalize(individual.last_name()) }
    }

    fn tokens(&self) -> impl Iterator<Item = &str> {
        [self.first.as_str(), self.last.as_str()].into_iter().filter(|token| !token.is_empty())
    }

    fn contains(&self, needle: &str) -> bool {
        self.first.contains(needle) || self.last.contains(needle)
    }
}

/// Prefix lookup over first and last names.
///
/// Every prefix (by chars) of every normalized name token maps to the ids carrying that token,
/// so a prefix query is a single map lookup. Memory grows with the sum of token lengths over all
/// prefix lengths.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    prefixes: HashMap<SmolStr, BTreeSet<IndividualId>>,
    entries: IndexMap<IndividualId, NameEntry>,
}

/// Lowercase + trim, applied to both names and queries.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn prefixes_of(token: &str) -> impl Iterator<Item = &str> {
    token.char_indices().map(move |(start, ch)| &token[..start + ch.len_utf8()])
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, individual_id: &IndividualId) -> bool {
        self.entries.contains_key(individual_id)
    }

    pub fn add_individual(&mut self, individual: &Individual) {
        let individual_id = individual.individual_id();
        if self.entries.contains_key(individual_id) {
            self.remove_individual(individual_id);
        }
        self.insert_entry(individual_id.clone(), NameEntry::of(individual));
    }

    pub fn update_individual(&mut self, individual: &Individual) {
        self.remove_individual(individual.individual_id());
        self.insert_entry(individual.individual_id().clone(), NameEntry::of(individual));
    }

    pub fn remove_individual(&mut self, individual_id: &IndividualId) -> bool {
        let Some(entry) = self.entries.shift_remove(individual_id) else {
            return false;
        };

        for token in entry.tokens() {
            for prefix in prefixes_of(token) {
                let now_empty = match self.prefixes.get_mut(prefix) {
                    Some(ids) => {
                        ids.remove(individual_id);
                        ids.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.prefixes.remove(prefix);
                }
            }
        }
        true
    }

    /// Recomputes the whole index; used after bulk loads.
    pub fn rebuild<'a>(&mut self, individuals: impl IntoIterator<Item = &'a Individual>) {
        let individuals = individuals.into_iter().collect::<Vec<_>>();
        let computed = individuals
            .par_iter()
            .map(|individual| {
                let entry = NameEntry::of(individual);
                let prefixes =
                    entry.tokens().flat_map(prefixes_of).map(SmolStr::new).collect::<Vec<_>>();
                (individual.individual_id().clone(), entry, prefixes)
            })
            .collect::<Vec<_>>();

        self.prefixes.clear();
        self.entries.clear();
        for (individual_id, entry, prefixes) in computed {
            for prefix in prefixes {
                self.prefixes.entry(prefix).or_default().insert(individual_id.clone());
            }
            self.entries.insert(individual_id, entry);
        }
    }

    /// Prefix matches first, then substring matches not already returned.
    ///
    /// Each group is ordered by last name, then first name (case-insensitive), then id.
    /// A blank query returns nothing.
    pub fn search(&self, query: &str) -> Vec<IndividualId> {
        let needle = normalize(query);
        if needle.is_empty() {
            return Vec::new();
        }

        let mut prefix_hits = self
            .prefixes
            .get(needle.as_str())
            .map(|ids| ids.iter().collect::<Vec<_>>())
            .unwrap_or_default();
        prefix_hits.sort_by(|a, b| self.compare_names(a, b));

        let captured = prefix_hits.iter().copied().collect::<HashSet<_>>();
        let mut substring_hits = self
            .entries
            .iter()
            .filter(|(individual_id, entry)| {
                !captured.contains(individual_id) && entry.contains(&needle)
            })
            .map(|(individual_id, _)| individual_id)
            .collect::<Vec<_>>();
        substring_hits.sort_by(|a, b| self.compare_names(a, b));

        prefix_hits.into_iter().chain(substring_hits).cloned().collect()
    }

    /// Typo-tolerant ranking over `"first last"`, best first. Independent of [`Self::search`].
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<(IndividualId, f64)> {
        let needle = normalize(query);
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored = self
            .entries
            .iter()
            .filter_map(|(individual_id, entry)| {
                let full = match (entry.first.is_empty(), entry.last.is_empty()) {
                    (true, _) => entry.last.clone(),
                    (_, true) => entry.first.clone(),
                    _ => format!("{} {}", entry.first, entry.last),
                };
                let best = [full.as_str(), entry.first.as_str(), entry.last.as_str()]
                    .into_iter()
                    .filter(|candidate| !candidate.is_empty())
                    .map(|candidate| rapidfuzz::fuzz::ratio(needle.chars(), candidate.chars()))
                    .fold(0.0f64, f64::max);
                (best >= SUGGEST_MIN_RATIO).then(|| (individual_id.clone(), best))
            })
            .collect::<Vec<_>>();

        scored.sort_by(|(id_a, score_a), (id_b, score_b)| {
            score_b.partial_cmp(score_a).unwrap_or(Ordering::Equal).then_with(|| id_a.cmp(id_b))
        });
        scored.truncate(limit);
        scored
    }

    fn insert_entry(&mut self, individual_id: IndividualId, entry: NameEntry) {
        for token in entry.tokens() {
            for prefix in prefixes_of(token) {
                let ids = self.prefixes.entry(SmolStr::new(prefix)).or_default();
                ids.insert(individual_id.clone());
            }
        }
        self.entries.insert(individual_id, entry);
    }

    fn compare_names(&self, a: &IndividualId, b: &IndividualId) -> Ordering {
        match (self.entries.get(a), self.entries.get(b)) {
            (Some(left), Some(right)) => left
                .last
                .cmp(&right.last)
                .then_with(|| left.first.cmp(&right.first))
                .then_with(|| a.cmp(b)),
            _ => a.cmp(b),
        }
    }
}
