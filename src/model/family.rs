// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::catalog::{MediaAttachment, SourceCitation};
use super::ids::{FamilyId, IndividualId, TagId};
use super::individual::LifeEvent;

/// A parental grouping: zero, one or two spouses plus an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    family_id: FamilyId,
    husband_id: Option<IndividualId>,
    wife_id: Option<IndividualId>,
    child_ids: Vec<IndividualId>,
    events: Vec<LifeEvent>,
    tag_ids: Vec<TagId>,
    media: Vec<MediaAttachment>,
    citations: Vec<SourceCitation>,
}

impl Family {
    pub fn new(family_id: FamilyId) -> Self {
        Self {
            family_id,
            husband_id: None,
            wife_id: None,
            child_ids: Vec::new(),
            events: Vec::new(),
            tag_ids: Vec::new(),
            media: Vec::new(),
            citations: Vec::new(),
        }
    }

    pub fn with_spouses(
        family_id: FamilyId,
        husband_id: Option<IndividualId>,
        wife_id: Option<IndividualId>,
    ) -> Self {
        let mut family = Self::new(family_id);
        family.husband_id = husband_id;
        family.wife_id = wife_id;
        family
    }

    pub fn family_id(&self) -> &FamilyId {
        &self.family_id
    }

    pub fn husband_id(&self) -> Option<&IndividualId> {
        self.husband_id.as_ref()
    }

    pub fn set_husband_id(&mut self, husband_id: Option<IndividualId>) {
        self.husband_id = husband_id;
    }

    pub fn wife_id(&self) -> Option<&IndividualId> {
        self.wife_id.as_ref()
    }

    pub fn set_wife_id(&mut self, wife_id: Option<IndividualId>) {
        self.wife_id = wife_id;
    }

    pub fn has_spouse(&self, individual_id: &IndividualId) -> bool {
        self.husband_id.as_ref() == Some(individual_id)
            || self.wife_id.as_ref() == Some(individual_id)
    }

    /// The spouse opposite `individual_id`, if `individual_id` is one of the spouses.
    pub fn other_spouse(&self, individual_id: &IndividualId) -> Option<&IndividualId> {
        if self.husband_id.as_ref() == Some(individual_id) {
            self.wife_id.as_ref()
        } else if self.wife_id.as_ref() == Some(individual_id) {
            self.husband_id.as_ref()
        } else {
            None
        }
    }

    pub fn child_ids(&self) -> &[IndividualId] {
        &self.child_ids
    }

    pub fn child_ids_mut(&mut self) -> &mut Vec<IndividualId> {
        &mut self.child_ids
    }

    pub fn has_child(&self, individual_id: &IndividualId) -> bool {
        self.child_ids.contains(individual_id)
    }

    /// Every individual the family refers to, spouses first.
    pub fn member_ids(&self) -> impl Iterator<Item = &IndividualId> {
        self.husband_id.iter().chain(self.wife_id.iter()).chain(self.child_ids.iter())
    }

    pub fn events(&self) -> &[LifeEvent] {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut Vec<LifeEvent> {
        &mut self.events
    }

    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    pub fn tag_ids_mut(&mut self) -> &mut Vec<TagId> {
        &mut self.tag_ids
    }

    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tag_ids.contains(tag_id)
    }

    pub fn media(&self) -> &[MediaAttachment] {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut Vec<MediaAttachment> {
        &mut self.media
    }

    pub fn citations(&self) -> &[SourceCitation] {
        &self.citations
    }

    pub fn citations_mut(&mut self) -> &mut Vec<SourceCitation> {
        &mut self.citations
    }
}
