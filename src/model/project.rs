// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::data::ProjectData;
use super::document::Document;
use super::layout_state::ProjectLayout;
use super::metadata::ProjectMetadata;

/// One open project: the editable document plus the layout cache and metadata stored next to it.
#[derive(Debug, Clone, Default)]
pub struct Project {
    document: Document,
    layout: ProjectLayout,
    metadata: ProjectMetadata,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            document: Document::new(),
            layout: ProjectLayout::default(),
            metadata: ProjectMetadata::new(name),
        }
    }

    /// Assembles a freshly loaded project. The document starts clean.
    pub fn from_parts(data: ProjectData, layout: ProjectLayout, metadata: ProjectMetadata) -> Self {
        Self { document: Document::from_data(data), layout, metadata }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ProjectLayout {
        &mut self.layout
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ProjectMetadata {
        &mut self.metadata
    }

    /// Splits borrows so a command can edit the document and the layout in one call.
    pub fn parts_mut(&mut self) -> (&mut Document, &mut ProjectLayout) {
        (&mut self.document, &mut self.layout)
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn into_parts(self) -> (Document, ProjectLayout, ProjectMetadata) {
        (self.document, self.layout, self.metadata)
    }
}
