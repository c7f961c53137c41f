// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A project is a [`Document`] (people, families and their catalog) plus a layout cache and
//! metadata. All edits to the document go through the [`Document`] facade.

pub mod catalog;
pub mod data;
pub mod document;
pub mod family;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod individual;
pub mod layout_state;
pub mod metadata;
pub mod project;

pub use catalog::{MediaAttachment, Source, SourceCitation, Tag};
pub use data::{ProjectData, Relationship, RelationshipKind, Viewport};
pub use document::{Document, DocumentError, DocumentSnapshot, EntityKind, Revision};
pub use family::Family;
pub use ids::{FamilyId, Id, IdError, IndividualId, MediaId, NodeId, SourceId, TagId};
pub use individual::{Gender, Individual, LifeEvent};
pub use layout_state::{LayoutPoint, ProjectLayout};
pub use metadata::{now_epoch_millis, ProjectMetadata, CURRENT_FORMAT_VERSION};
pub use project::Project;
