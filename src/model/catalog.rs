// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{MediaId, SourceId, TagId};

/// A user-defined label. Entities reference tags by id; the document-level catalog holds the
/// tag itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    tag_id: TagId,
    name: String,
    color: Option<String>,
}

impl Tag {
    pub fn new(tag_id: TagId, name: impl Into<String>) -> Self {
        Self { tag_id, name: name.into(), color: None }
    }

    pub fn tag_id(&self) -> &TagId {
        &self.tag_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn set_color<T: Into<String>>(&mut self, color: Option<T>) {
        self.color = color.map(Into::into);
    }
}

/// A bibliographic source (register, census sheet, letter, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    source_id: SourceId,
    title: String,
    author: Option<String>,
    notes: Option<String>,
}

impl Source {
    pub fn new(source_id: SourceId, title: impl Into<String>) -> Self {
        Self { source_id, title: title.into(), author: None, notes: None }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn set_author<T: Into<String>>(&mut self, author: Option<T>) {
        self.author = author.map(Into::into);
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_notes<T: Into<String>>(&mut self, notes: Option<T>) {
        self.notes = notes.map(Into::into);
    }
}

/// A reference from an entity or event to a catalog [`Source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCitation {
    source_id: SourceId,
    page: Option<String>,
}

impl SourceCitation {
    pub fn new(source_id: SourceId) -> Self {
        Self { source_id, page: None }
    }

    pub fn with_page(source_id: SourceId, page: impl Into<String>) -> Self {
        Self { source_id, page: Some(page.into()) }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

/// A photo/scan/document attached to an individual or family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    media_id: MediaId,
    path: String,
    mime_type: Option<String>,
    caption: Option<String>,
}

impl MediaAttachment {
    pub fn new(media_id: MediaId, path: impl Into<String>) -> Self {
        Self { media_id, path: path.into(), mime_type: None, caption: None }
    }

    pub fn media_id(&self) -> &MediaId {
        &self.media_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn set_mime_type<T: Into<String>>(&mut self, mime_type: Option<T>) {
        self.mime_type = mime_type.map(Into::into);
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn set_caption<T: Into<String>>(&mut self, caption: Option<T>) {
        self.caption = caption.map(Into::into);
    }
}
