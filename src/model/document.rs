// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The mutation facade over [`ProjectData`].
//!
//! # Invariants
//! - Every structural mutation goes through a `Document` method and assigns a fresh
//!   [`Revision`]; no mutable collection access escapes the facade.
//! - `is_dirty()` holds iff the current revision differs from the last saved/loaded one.
//! - A failed mutation leaves data, search index and revision untouched.
//! - Family spouse/child ids reference individuals of the same document. Data loaded through
//!   [`Document::from_data`] is not re-validated; consumers must tolerate dangling ids.

use indexmap::IndexMap;
use thiserror::Error;

use super::catalog::{Source, Tag};
use super::data::{ProjectData, Relationship, Viewport};
use super::family::Family;
use super::ids::{FamilyId, Id, IndividualId, SourceId, TagId};
use super::individual::Individual;
use crate::query::NameIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Individual,
    Family,
    Tag,
    Source,
    Media,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("{kind:?} already exists (id={id})")]
    DuplicateId { kind: EntityKind, id: String },
    #[error("{kind:?} not found (id={id})")]
    NotFound { kind: EntityKind, id: String },
    #[error("individual {individual_id} is still referenced by family {family_id}")]
    StillReferenced { individual_id: IndividualId, family_id: FamilyId },
}

impl DocumentError {
    pub fn duplicate(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::DuplicateId { kind, id: id.into() }
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound { kind, id: id.into() }
    }
}

/// Identifies one state of the document within a process.
///
/// Revisions are handed out from a monotonic counter, so two different edit histories never
/// share a revision even when their lengths match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Revision(u64);

impl Revision {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A consistent copy of the data taken between edits, for saving off the editing thread.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub data: ProjectData,
    pub revision: Revision,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    data: ProjectData,
    index: NameIndex,
    revision: Revision,
    saved_revision: Revision,
    last_issued: u64,
    individual_watermark: u64,
    family_watermark: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps loaded data. The resulting document is clean.
    pub fn from_data(data: ProjectData) -> Self {
        let mut index = NameIndex::new();
        index.rebuild(data.individuals().values());

        let individual_watermark = data
            .individuals()
            .keys()
            .filter_map(|id| numeric_suffix(id.as_str(), INDIVIDUAL_ID_PREFIX))
            .max()
            .unwrap_or(0);
        let family_watermark = data
            .families()
            .keys()
            .filter_map(|id| numeric_suffix(id.as_str(), FAMILY_ID_PREFIX))
            .max()
            .unwrap_or(0);

        Self {
            data,
            index,
            revision: Revision::default(),
            saved_revision: Revision::default(),
            last_issued: 0,
            individual_watermark,
            family_watermark,
        }
    }

    pub fn data(&self) -> &ProjectData {
        &self.data
    }

    pub fn into_data(self) -> ProjectData {
        self.data
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot { data: self.data.clone(), revision: self.revision }
    }

    pub fn individuals(&self) -> &IndexMap<IndividualId, Individual> {
        self.data.individuals()
    }

    pub fn individual(&self, individual_id: &IndividualId) -> Option<&Individual> {
        self.data.individuals().get(individual_id)
    }

    pub fn families(&self) -> &IndexMap<FamilyId, Family> {
        self.data.families()
    }

    pub fn family(&self, family_id: &FamilyId) -> Option<&Family> {
        self.data.families().get(family_id)
    }

    pub fn tags(&self) -> &IndexMap<TagId, Tag> {
        self.data.tags()
    }

    pub fn contains_tag(&self, tag_id: &TagId) -> bool {
        self.data.tags().contains_key(tag_id)
    }

    pub fn sources(&self) -> &IndexMap<SourceId, Source> {
        self.data.sources()
    }

    // Change tracking.

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn saved_revision(&self) -> Revision {
        self.saved_revision
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn mark_saved(&mut self) {
        self.saved_revision = self.revision;
    }

    /// Records that the state identified by `revision` is on disk.
    ///
    /// Returns `false` (and stays dirty) when the document moved on since that snapshot.
    pub fn mark_saved_at(&mut self, revision: Revision) -> bool {
        self.saved_revision = revision;
        !self.is_dirty()
    }

    /// Puts the document back to a revision recorded by the undo history.
    pub(crate) fn restore_revision(&mut self, revision: Revision) {
        self.revision = revision;
    }

    fn bump(&mut self) {
        self.last_issued = self.last_issued.saturating_add(1);
        self.revision = Revision(self.last_issued);
    }

    // Search.

    pub fn name_index(&self) -> &NameIndex {
        &self.index
    }

    pub fn search(&self, query: &str) -> Vec<&Individual> {
        self.index.search(query).iter().filter_map(|id| self.individual(id)).collect()
    }

    // Id allocation.

    /// The next `I<n>` id above every numbered id seen in this session.
    pub fn next_individual_id(&self) -> IndividualId {
        next_free_id(INDIVIDUAL_ID_PREFIX, self.individual_watermark, |candidate| {
            self.data.individuals().contains_key(candidate)
        })
    }

    /// The next `F<n>` id above every numbered id seen in this session.
    pub fn next_family_id(&self) -> FamilyId {
        next_free_id(FAMILY_ID_PREFIX, self.family_watermark, |candidate| {
            self.data.families().contains_key(candidate)
        })
    }

    // Individuals.

    pub fn insert_individual(&mut self, individual: Individual) -> Result<(), DocumentError> {
        let index = self.data.individuals().len();
        self.insert_individual_at(index, individual)
    }

    /// Inserts at `index` (clamped to the collection length); undo uses this to restore order.
    pub(crate) fn insert_individual_at(
        &mut self,
        index: usize,
        individual: Individual,
    ) -> Result<(), DocumentError> {
        let individual_id = individual.individual_id().clone();
        if self.data.individuals().contains_key(&individual_id) {
            return Err(DocumentError::duplicate(EntityKind::Individual, individual_id.as_str()));
        }

        if let Some(n) = numeric_suffix(individual_id.as_str(), INDIVIDUAL_ID_PREFIX) {
            self.individual_watermark = self.individual_watermark.max(n);
        }
        self.index.add_individual(&individual);
        let index = index.min(self.data.individuals().len());
        self.data.individuals_mut().shift_insert(index, individual_id, individual);
        self.bump();
        Ok(())
    }

    /// Applies `edit` to one individual and reindexes its names.
    pub fn update_individual<R>(
        &mut self,
        individual_id: &IndividualId,
        edit: impl FnOnce(&mut Individual) -> R,
    ) -> Result<R, DocumentError> {
        let Some(individual) = self.data.individuals_mut().get_mut(individual_id) else {
            return Err(DocumentError::not_found(EntityKind::Individual, individual_id.as_str()));
        };

        let result = edit(individual);
        self.index.update_individual(individual);
        self.bump();
        Ok(result)
    }

    /// Removes an individual no family refers to. Returns its former position and value.
    pub fn remove_individual(
        &mut self,
        individual_id: &IndividualId,
    ) -> Result<(usize, Individual), DocumentError> {
        if !self.data.individuals().contains_key(individual_id) {
            return Err(DocumentError::not_found(EntityKind::Individual, individual_id.as_str()));
        }
        if let Some(family) = self
            .data
            .families()
            .values()
            .find(|family| family.member_ids().any(|member| member == individual_id))
        {
            return Err(DocumentError::StillReferenced {
                individual_id: individual_id.clone(),
                family_id: family.family_id().clone(),
            });
        }

        let Some((index, _, individual)) =
            self.data.individuals_mut().shift_remove_full(individual_id)
        else {
            return Err(DocumentError::not_found(EntityKind::Individual, individual_id.as_str()));
        };
        self.index.remove_individual(individual_id);
        self.bump();
        Ok((index, individual))
    }

    // Families.

    pub fn insert_family(&mut self, family: Family) -> Result<(), DocumentError> {
        let index = self.data.families().len();
        self.insert_family_at(index, family)
    }

    pub(crate) fn insert_family_at(
        &mut self,
        index: usize,
        family: Family,
    ) -> Result<(), DocumentError> {
        let family_id = family.family_id().clone();
        if self.data.families().contains_key(&family_id) {
            return Err(DocumentError::duplicate(EntityKind::Family, family_id.as_str()));
        }
        self.check_members(&family)?;

        if let Some(n) = numeric_suffix(family_id.as_str(), FAMILY_ID_PREFIX) {
            self.family_watermark = self.family_watermark.max(n);
        }
        let index = index.min(self.data.families().len());
        self.data.families_mut().shift_insert(index, family_id, family);
        self.bump();
        Ok(())
    }

    /// Applies `edit` to a copy of the family and commits it only if every member the edit
    /// added resolves. Members the family already had are not re-checked.
    pub fn update_family<R>(
        &mut self,
        family_id: &FamilyId,
        edit: impl FnOnce(&mut Family) -> R,
    ) -> Result<R, DocumentError> {
        let Some(existing) = self.data.families().get(family_id) else {
            return Err(DocumentError::not_found(EntityKind::Family, family_id.as_str()));
        };

        let mut updated = existing.clone();
        let result = edit(&mut updated);
        if let Some(missing) = updated.member_ids().find(|member| {
            !existing.member_ids().any(|known| known == *member)
                && !self.data.individuals().contains_key(*member)
        }) {
            return Err(DocumentError::not_found(EntityKind::Individual, missing.as_str()));
        }

        if let Some(slot) = self.data.families_mut().get_mut(family_id) {
            *slot = updated;
        }
        self.bump();
        Ok(result)
    }

    pub fn remove_family(
        &mut self,
        family_id: &FamilyId,
    ) -> Result<(usize, Family), DocumentError> {
        let Some((index, _, family)) = self.data.families_mut().shift_remove_full(family_id) else {
            return Err(DocumentError::not_found(EntityKind::Family, family_id.as_str()));
        };
        self.bump();
        Ok((index, family))
    }

    fn check_members(&self, family: &Family) -> Result<(), DocumentError> {
        match family.member_ids().find(|member| !self.data.individuals().contains_key(*member)) {
            Some(missing) => {
                Err(DocumentError::not_found(EntityKind::Individual, missing.as_str()))
            }
            None => Ok(()),
        }
    }

    // Catalog.

    pub fn insert_tag(&mut self, tag: Tag) -> Result<(), DocumentError> {
        self.data.insert_tag(tag)?;
        self.bump();
        Ok(())
    }

    pub fn remove_tag(&mut self, tag_id: &TagId) -> Result<(usize, Tag), DocumentError> {
        let Some((index, _, tag)) = self.data.tags_mut().shift_remove_full(tag_id) else {
            return Err(DocumentError::not_found(EntityKind::Tag, tag_id.as_str()));
        };
        self.bump();
        Ok((index, tag))
    }

    pub fn insert_source(&mut self, source: Source) -> Result<(), DocumentError> {
        self.data.insert_source(source)?;
        self.bump();
        Ok(())
    }

    pub fn remove_source(
        &mut self,
        source_id: &SourceId,
    ) -> Result<(usize, Source), DocumentError> {
        let Some((index, _, source)) = self.data.sources_mut().shift_remove_full(source_id) else {
            return Err(DocumentError::not_found(EntityKind::Source, source_id.as_str()));
        };
        self.bump();
        Ok((index, source))
    }

    // Secondary views.

    pub fn set_relationships(&mut self, relationships: Vec<Relationship>) {
        self.data.set_relationships(relationships);
        self.bump();
    }

    /// Replaces the stored relationship list with the one derived from the families.
    pub fn rebuild_relationships(&mut self) {
        let derived = self.data.derive_relationships();
        if derived.as_slice() != self.data.relationships() {
            self.set_relationships(derived);
        }
    }

    pub fn relationships_consistent(&self) -> bool {
        self.data.derive_relationships().as_slice() == self.data.relationships()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.data.viewport() != viewport {
            self.data.set_viewport(viewport);
            self.bump();
        }
    }
}

const INDIVIDUAL_ID_PREFIX: char = 'I';
const FAMILY_ID_PREFIX: char = 'F';

fn numeric_suffix(id: &str, prefix: char) -> Option<u64> {
    id.strip_prefix(prefix)?.parse::<u64>().ok()
}

fn next_free_id<T>(prefix: char, watermark: u64, taken: impl Fn(&str) -> bool) -> Id<T> {
    let mut buffer = itoa::Buffer::new();
    let mut n = watermark.saturating_add(1);
    loop {
        let mut candidate = String::with_capacity(8);
        candidate.push(prefix);
        candidate.push_str(buffer.format(n));
        if !taken(&candidate) {
            return Id::new_generated(candidate);
        }
        n = n.saturating_add(1);
    }
}
