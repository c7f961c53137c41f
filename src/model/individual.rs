// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::catalog::{MediaAttachment, SourceCitation};
use super::ids::{IndividualId, TagId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

/// A dated fact about a person or family (birth, baptism, marriage, emigration, ...).
///
/// `kind` is an open tag; imports keep GEDCOM tags such as `BIRT` or `MARR` verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifeEvent {
    kind: String,
    date: Option<String>,
    place: Option<String>,
    notes: Option<String>,
    citations: Vec<SourceCitation>,
}

impl LifeEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), date: None, place: None, notes: None, citations: Vec::new() }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn set_date<T: Into<String>>(&mut self, date: Option<T>) {
        self.date = date.map(Into::into);
    }

    pub fn place(&self) -> Option<&str> {
        self.place.as_deref()
    }

    pub fn set_place<T: Into<String>>(&mut self, place: Option<T>) {
        self.place = place.map(Into::into);
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_notes<T: Into<String>>(&mut self, notes: Option<T>) {
        self.notes = notes.map(Into::into);
    }

    pub fn citations(&self) -> &[SourceCitation] {
        &self.citations
    }

    pub fn citations_mut(&mut self) -> &mut Vec<SourceCitation> {
        &mut self.citations
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    individual_id: IndividualId,
    first_name: String,
    last_name: String,
    gender: Option<Gender>,
    birth_year: Option<i32>,
    death_year: Option<i32>,
    events: Vec<LifeEvent>,
    tag_ids: Vec<TagId>,
    media: Vec<MediaAttachment>,
    citations: Vec<SourceCitation>,
}

impl Individual {
    pub fn new(
        individual_id: IndividualId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            individual_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender: None,
            birth_year: None,
            death_year: None,
            events: Vec::new(),
            tag_ids: Vec::new(),
            media: Vec::new(),
            citations: Vec::new(),
        }
    }

    pub fn individual_id(&self) -> &IndividualId {
        &self.individual_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn set_name(&mut self, first_name: impl Into<String>, last_name: impl Into<String>) {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
    }

    /// `"First Last"`, skipping empty parts.
    pub fn display_name(&self) -> String {
        match (self.first_name.trim(), self.last_name.trim()) {
            ("", last) => last.to_owned(),
            (first, "") => first.to_owned(),
            (first, last) => format!("{first} {last}"),
        }
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn set_gender(&mut self, gender: Option<Gender>) {
        self.gender = gender;
    }

    pub fn birth_year(&self) -> Option<i32> {
        self.birth_year
    }

    pub fn set_birth_year(&mut self, year: Option<i32>) {
        self.birth_year = year;
    }

    pub fn death_year(&self) -> Option<i32> {
        self.death_year
    }

    pub fn set_death_year(&mut self, year: Option<i32>) {
        self.death_year = year;
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
