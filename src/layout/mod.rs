// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Layout algorithms for family trees.
//!
//! The layout is a pure function of the document data; results can be merged into the
//! project's stored layout cache.

pub mod family_tree;

pub use family_tree::{
    layout_family_tree, FamilyTreeLayout, LayoutBounds, LayoutConfig, NodeKind, NodeMetrics,
    NodeMetricsTable, NodePlacement,
};
