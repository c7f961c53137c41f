// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use indexmap::IndexMap;

use super::catalog::{Source, Tag};
use super::document::{DocumentError, EntityKind};
use super::family::Family;
use super::ids::{FamilyId, IndividualId, SourceId, TagId};
use super::individual::Individual;

/// The persisted family-tree payload (`data.json`).
///
/// Collections keep insertion order; the layout engine walks individuals and families in that
/// order, so the order is part of the document's observable state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectData {
    individuals: IndexMap<IndividualId, Individual>,
    families: IndexMap<FamilyId, Family>,
    tags: IndexMap<TagId, Tag>,
    sources: IndexMap<SourceId, Source>,
    relationships: Vec<Relationship>,
    viewport: Viewport,
}

impl ProjectData {
    pub fn individuals(&self) -> &IndexMap<IndividualId, Individual> {
        &self.individuals
    }

    pub fn families(&self) -> &IndexMap<FamilyId, Family> {
        &self.families
    }

    pub fn tags(&self) -> &IndexMap<TagId, Tag> {
        &self.tags
    }

    pub fn sources(&self) -> &IndexMap<SourceId, Source> {
        &self.sources
    }

    /// Appends an individual keyed by its own id. Used by importers before the data is wrapped
    /// in a [`Document`](super::Document).
    pub fn insert_individual(&mut self, individual: Individual) -> Result<(), DocumentError> {
        let individual_id = individual.individual_id().clone();
        if self.individuals.contains_key(&individual_id) {
            return Err(DocumentError::duplicate(EntityKind::Individual, individual_id.as_str()));
        }
        self.individuals.insert(individual_id, individual);
        Ok(())
    }

    /// Appends a family. Member references are not checked here; the family may be added
    /// before the individuals it names.
    pub fn insert_family(&mut self, family: Family) -> Result<(), DocumentError> {
        let family_id = family.family_id().clone();
        if self.families.contains_key(&family_id) {
            return Err(DocumentError::duplicate(EntityKind::Family, family_id.as_str()));
        }
        self.families.insert(family_id, family);
        Ok(())
    }

    pub fn insert_tag(&mut self, tag: Tag) -> Result<(), DocumentError> {
        let tag_id = tag.tag_id().clone();
        if self.tags.contains_key(&tag_id) {
            return Err(DocumentError::duplicate(EntityKind::Tag, tag_id.as_str()));
        }
        self.tags.insert(tag_id, tag);
        Ok(())
    }

    pub fn insert_source(&mut self, source: Source) -> Result<(), DocumentError> {
        let source_id = source.source_id().clone();
        if self.sources.contains_key(&source_id) {
            return Err(DocumentError::duplicate(EntityKind::Source, source_id.as_str()));
        }
        self.sources.insert(source_id, source);
        Ok(())
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut IndexMap<IndividualId, Individual> {
        &mut self.individuals
    }

    pub(crate) fn families_mut(&mut self) -> &mut IndexMap<FamilyId, Family> {
        &mut self.families
    }

    pub(crate) fn tags_mut(&mut self) -> &mut IndexMap<TagId, Tag> {
        &mut self.tags
    }

    pub(crate) fn sources_mut(&mut self) -> &mut IndexMap<SourceId, Source> {
        &mut self.sources
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn set_relationships(&mut self, relationships: Vec<Relationship>) {
        self.relationships = relationships;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
            && self.families.is_empty()
            && self.tags.is_empty()
            && self.sources.is_empty()
            && self.relationships.is_empty()
    }

    /// Families in which `individual_id` is a husband or wife, in collection order.
    pub fn spouse_families<'a, 'b>(
        &'a self,
        individual_id: &'b IndividualId,
    ) -> impl Iterator<Item = &'a Family> + 'b
    where
        'a: 'b,
    {
        self.families.values().filter(move |family| family.has_spouse(individual_id))
    }

    /// Families listing `individual_id` as a child, in collection order.
    pub fn parent_families<'a, 'b>(
        &'a self,
        individual_id: &'b IndividualId,
    ) -> impl Iterator<Item = &'a Family> + 'b
    where
        'a: 'b,
    {
        self.families.values().filter(move |family| family.has_child(individual_id))
    }

    /// Recomputes the simplified edge list from the family units.
    ///
    /// Per family: one spouse edge (husband -> wife) when both spouses are set, then one
    /// parent -> child edge per present spouse and child.
    pub fn derive_relationships(&self) -> Vec<Relationship> {
        let mut out = Vec::new();
        for family in self.families.values() {
            if let (Some(husband), Some(wife)) = (family.husband_id(), family.wife_id()) {
                out.push(Relationship::new(
                    RelationshipKind::Spouse,
                    husband.clone(),
                    wife.clone(),
                ));
            }
            for child in family.child_ids() {
                for parent in family.husband_id().into_iter().chain(family.wife_id()) {
                    out.push(Relationship::new(
                        RelationshipKind::ParentChild,
                        parent.clone(),
                        child.clone(),
                    ));
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    ParentChild,
    Spouse,
}

/// A simplified edge used by list/graph views. `from` is the parent (or first spouse).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    kind: RelationshipKind,
    from: IndividualId,
    to: IndividualId,
}

impl Relationship {
    pub fn new(kind: RelationshipKind, from: IndividualId, to: IndividualId) -> Self {
        Self { kind, from, to }
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn from(&self) -> &IndividualId {
        &self.from
    }

    pub fn to(&self) -> &IndividualId {
        &self.to
    }

    pub fn involves(&self, individual_id: &IndividualId) -> bool {
        &self.from == individual_id || &self.to == individual_id
    }
}

/// Camera state restored when a project is reopened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, scale: 1.0 }
    }
}
