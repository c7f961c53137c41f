// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over the document.
//!
//! The name index is kept in sync by the document facade; kinship queries walk the family
//! units on demand.

pub mod kinship;
pub mod name_index;

pub use name_index::{normalize, NameIndex};
