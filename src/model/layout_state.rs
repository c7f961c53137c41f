// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::ids::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

/// The visual arrangement persisted next to the data (`layout.json`).
///
/// This is a cache: reopening a project restores the stored positions without recomputing
/// the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLayout {
    zoom: f64,
    view_origin: LayoutPoint,
    positions: BTreeMap<NodeId, LayoutPoint>,
    positions_are_centers: bool,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            view_origin: LayoutPoint::default(),
            positions: BTreeMap::new(),
            positions_are_centers: false,
        }
    }
}

impl ProjectLayout {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn view_origin(&self) -> LayoutPoint {
        self.view_origin
    }

    pub fn set_view_origin(&mut self, view_origin: LayoutPoint) {
        self.view_origin = view_origin;
    }

    /// Whether stored positions are node centers (`true`) or top-left corners (`false`).
    pub fn positions_are_centers(&self) -> bool {
        self.positions_are_centers
    }

    pub fn set_positions_are_centers(&mut self, positions_are_centers: bool) {
        self.positions_are_centers = positions_are_centers;
    }

    pub fn positions(&self) -> &BTreeMap<NodeId, LayoutPoint> {
        &self.positions
    }

    pub fn position(&self, node_id: &NodeId) -> Option<LayoutPoint> {
        self.positions.get(node_id).copied()
    }

    /// Sets a node position, returning the previous one.
    pub fn set_position(&mut self, node_id: NodeId, point: LayoutPoint) -> Option<LayoutPoint> {
        self.positions.insert(node_id, point)
    }

    pub fn remove_position(&mut self, node_id: &NodeId) -> Option<LayoutPoint> {
        self.positions.remove(node_id)
    }

    /// Adds `computed` positions for nodes without a stored position. Returns how many were added.
    pub fn fill_missing<'a>(
        &mut self,
        computed: impl IntoIterator<Item = (&'a NodeId, &'a LayoutPoint)>,
    ) -> usize {
        let mut added = 0usize;
        for (node_id, point) in computed {
            if !self.positions.contains_key(node_id) {
                self.positions.insert(node_id.clone(), *point);
                added += 1;
            }
        }
        added
    }

    /// Drops positions of nodes rejected by `keep` (e.g. nodes deleted from the document).
    pub fn retain_nodes(&mut self, mut keep: impl FnMut(&NodeId) -> bool) {
        self.positions.retain(|node_id, _| keep(node_id));
    }
}
