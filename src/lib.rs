// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Kindred: the document engine behind a genealogy editor.
//!
//! - [`model`]: typed ids, entities and the [`model::Document`] facade with dirty tracking.
//! - [`ops`]: reversible edit commands and the undo/redo [`ops::History`].
//! - [`store`]: zip project archives with atomic writes and rolling backups.
//! - [`layout`]: generation-layered family-tree layout.
//! - [`query`]: name search and kinship lookups.

pub mod layout;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;
