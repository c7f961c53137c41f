// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use smallvec::SmallVec;

use crate::model::{Family, IndividualId, LayoutPoint, NodeId, ProjectData, ProjectLayout};

/// Spacing and default node sizes, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    /// Row height used for vertical spacing, whatever the individual node heights are.
    pub node_height: f64,
    pub person_width: f64,
    pub family_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_gap: 40.0,
            vertical_gap: 80.0,
            node_height: 60.0,
            person_width: 160.0,
            family_width: 24.0,
        }
    }
}

impl LayoutConfig {
    fn row_height(&self) -> f64 {
        self.node_height + self.vertical_gap
    }

    fn default_metrics(&self, kind: NodeKind) -> NodeMetrics {
        let width = match kind {
            NodeKind::Person => self.person_width,
            NodeKind::Family => self.family_width,
        };
        NodeMetrics { width, height: self.node_height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Person,
    Family,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMetrics {
    pub width: f64,
    pub height: f64,
}

impl NodeMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Measured node sizes reported by the renderer. Nodes without an entry use the
/// [`LayoutConfig`] defaults for their kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMetricsTable {
    overrides: BTreeMap<NodeId, NodeMetrics>,
}

impl NodeMetricsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, node_id: NodeId, metrics: NodeMetrics) -> Option<NodeMetrics> {
        self.overrides.insert(node_id, metrics)
    }

    pub fn get(&self, node_id: &NodeId) -> Option<NodeMetrics> {
        self.overrides.get(node_id).copied()
    }

    pub fn resolve(&self, node_id: &NodeId, kind: NodeKind, config: &LayoutConfig) -> NodeMetrics {
        self.get(node_id).unwrap_or_else(|| config.default_metrics(kind))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    kind: NodeKind,
    generation: usize,
    position: LayoutPoint,
    metrics: NodeMetrics,
}

impl NodePlacement {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Layer assigned by the breadth-first pass. Spouses are drawn in their family's row and
    /// children one row below their family, so the drawn row can differ from this layer.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Top-left corner.
    pub fn position(&self) -> LayoutPoint {
        self.position
    }

    pub fn metrics(&self) -> NodeMetrics {
        self.metrics
    }
}

/// Computed coordinates for every drawable node.
///
/// Person nodes use the individual's id, family nodes the family's id; the two id spaces are
/// expected not to overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyTreeLayout {
    layers: Vec<Vec<NodeId>>,
    placements: BTreeMap<NodeId, NodePlacement>,
}

impl FamilyTreeLayout {
    /// Node ids per generation, in placement order (left to right before the children pass).
    pub fn layers(&self) -> &[Vec<NodeId>] {
        &self.layers
    }

    pub fn placements(&self) -> &BTreeMap<NodeId, NodePlacement> {
        &self.placements
    }

    pub fn placement(&self, node_id: &NodeId) -> Option<&NodePlacement> {
        self.placements.get(node_id)
    }

    pub fn position(&self, node_id: &NodeId) -> Option<LayoutPoint> {
        self.placement(node_id).map(NodePlacement::position)
    }

    pub fn positions(&self) -> impl Iterator<Item = (&NodeId, &LayoutPoint)> {
        self.placements.iter().map(|(node_id, placement)| (node_id, &placement.position))
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn bounds(&self) -> Option<LayoutBounds> {
        LayoutBounds::enclosing(
            self.placements.values().map(|placement| (placement.position, placement.metrics)),
        )
    }

    /// Overwrites every stored position with the computed one and drops positions of nodes
    /// that no longer exist.
    pub fn replace_into(&self, layout: &mut ProjectLayout) {
        layout.retain_nodes(|_| false);
        layout.set_positions_are_centers(false);
        for (node_id, point) in self.positions() {
            layout.set_position(node_id.clone(), *point);
        }
    }

    /// Keeps stored positions, adds computed ones for nodes without one and drops nodes that no
    /// longer exist. Returns how many positions were added.
    pub fn fill_into(&self, layout: &mut ProjectLayout) -> usize {
        layout.retain_nodes(|node_id| self.placements.contains_key(node_id));
        if !layout.positions_are_centers() {
            return layout.fill_missing(self.positions());
        }

        let centers = self
            .placements
            .iter()
            .map(|(node_id, placement)| {
                let NodeMetrics { width, height } = placement.metrics;
                (node_id.clone(), placement.position.offset(width / 2.0, height / 2.0))
            })
            .collect::<Vec<_>>();
        layout.fill_missing(centers.iter().map(|(node_id, point)| (node_id, point)))
    }
}

/// Axis-aligned box around placed nodes (positions expanded by node sizes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl LayoutBounds {
    /// `None` when there are no nodes.
    pub fn enclosing(nodes: impl IntoIterator<Item = (LayoutPoint, NodeMetrics)>) -> Option<Self> {
        nodes.into_iter().fold(None, |bounds, (point, metrics)| {
            let node = Self {
                min_x: point.x,
                min_y: point.y,
                max_x: point.x + metrics.width,
                max_y: point.y + metrics.height,
            };
            Some(match bounds {
                None => node,
                Some(acc) => acc.union(node),
            })
        })
    }

    /// Bounds of the positions stored in a project layout, honouring `positions_are_centers`.
    /// Stored ids that match neither an individual nor a family are skipped.
    pub fn of_stored(
        data: &ProjectData,
        layout: &ProjectLayout,
        config: &LayoutConfig,
        metrics: &NodeMetricsTable,
    ) -> Option<Self> {
        let centered = layout.positions_are_centers();
        Self::enclosing(layout.positions().iter().filter_map(|(node_id, point)| {
            let kind = if data.individuals().contains_key(node_id.as_str()) {
                NodeKind::Person
            } else if data.families().contains_key(node_id.as_str()) {
                NodeKind::Family
            } else {
                return None;
            };
            let size = metrics.resolve(node_id, kind, config);
            let top_left =
                if centered { point.offset(-size.width / 2.0, -size.height / 2.0) } else { *point };
            Some((top_left, size))
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Translation that maps the minimum corner to `(margin, margin)`.
    pub fn pan_offset(&self, margin: f64) -> LayoutPoint {
        LayoutPoint::new(margin - self.min_x, margin - self.min_y)
    }

    /// Canvas size needed to draw everything with `margin` on each side.
    pub fn canvas_size(&self, margin: f64) -> (f64, f64) {
        (self.width() + 2.0 * margin, self.height() + 2.0 * margin)
    }

    fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Generation layers found by the breadth-first pass.
struct Generations<'a> {
    persons: HashMap<&'a IndividualId, usize>,
    /// Indexed like `ProjectData::families`; `None` for families without a present spouse.
    families: Vec<Option<usize>>,
    max_layer: usize,
}

impl Generations<'_> {
    fn person_node(&self, individual_id: &IndividualId) -> (NodeId, NodeKind, usize) {
        let generation = self.persons.get(individual_id).copied().unwrap_or_default();
        (NodeId::from(individual_id), NodeKind::Person, generation)
    }
}

/// Lays out people and family units as generation bands.
///
/// Every root starts at layer 0 and layers spread breadth-first; the first assignment a node
/// gets is final. The result is deterministic for a given collection order but changes when
/// the individuals are reordered. Tolerates cyclic ancestry and dangling member ids (they are
/// ignored). Every individual gets exactly one position, and so does every family with at least
/// one present spouse.
pub fn layout_family_tree(
    data: &ProjectData,
    config: &LayoutConfig,
    metrics: &NodeMetricsTable,
) -> FamilyTreeLayout {
    if data.individuals().is_empty() {
        return FamilyTreeLayout::default();
    }

    let families = data.families().values().collect::<Vec<_>>();
    let generations = assign_generations(data, &families);
    let mut layout = FamilyTreeLayout {
        layers: vec![Vec::new(); generations.max_layer + 1],
        placements: BTreeMap::new(),
    };

    place_layers(data, &families, &generations, config, metrics, &mut layout);
    place_children(data, &families, &generations, config, &mut layout);

    log::debug!(
        "event=layout_computed nodes={} layers={} families={}",
        layout.placements.len(),
        layout.layers.len(),
        families.len()
    );
    layout
}

fn assign_generations<'a>(data: &'a ProjectData, families: &[&'a Family]) -> Generations<'a> {
    let individuals = data.individuals();
    let present = |id: &IndividualId| individuals.contains_key(id);

    let mut spouse_in: HashMap<&IndividualId, SmallVec<[usize; 2]>> = HashMap::new();
    let mut is_child: HashSet<&IndividualId> = HashSet::new();
    for (index, &family) in families.iter().enumerate() {
        let spouses = family.husband_id().into_iter().chain(family.wife_id());
        for spouse in spouses.filter(|id| present(*id)) {
            let entry = spouse_in.entry(spouse).or_default();
            if !entry.contains(&index) {
                entry.push(index);
            }
        }
        is_child.extend(family.child_ids().iter().filter(|id| present(*id)));
    }

    let mut roots = individuals.keys().filter(|id| !is_child.contains(id)).collect::<Vec<_>>();
    if roots.is_empty() {
        roots = individuals.keys().collect();
    }

    let mut generations = Generations {
        persons: HashMap::with_capacity(individuals.len()),
        families: vec![None; families.len()],
        max_layer: 0,
    };
    let mut queue: VecDeque<&IndividualId> = VecDeque::new();
    for root in roots {
        generations.persons.insert(root, 0);
        queue.push_back(root);
    }

    // Anyone the walk never reached (children of spouse-less families) is seeded at layer 0 in
    // collection order once the queue drains.
    let mut unreached = individuals.keys();
    loop {
        while let Some(person) = queue.pop_front() {
            let layer = generations.persons[person];
            generations.max_layer = generations.max_layer.max(layer);
            let Some(family_indices) = spouse_in.get(person) else {
                continue;
            };
            for &index in family_indices {
                let family = families[index];
                generations.families[index].get_or_insert(layer);

                if let Some(other) = family.other_spouse(person).filter(|id| present(*id)) {
                    if !generations.persons.contains_key(other) {
                        generations.persons.insert(other, layer);
                        queue.push_back(other);
                    }
                }
                for child in family.child_ids().iter().filter(|id| present(*id)) {
                    if !generations.persons.contains_key(child) {
                        generations.persons.insert(child, layer + 1);
                        queue.push_back(child);
                    }
                }
            }
        }

        let Some(seed) = unreached.find(|id| !generations.persons.contains_key(*id)) else {
            break;
        };
        generations.persons.insert(seed, 0);
        queue.push_back(seed);
    }

    generations
}

/// Left-to-right cursor over one generation band.
struct Row {
    y: f64,
    cursor: f64,
}

impl Row {
    fn place(
        &mut self,
        layout: &mut FamilyTreeLayout,
        node: (NodeId, NodeKind, usize),
        config: &LayoutConfig,
        metrics: &NodeMetricsTable,
    ) {
        let (node_id, kind, generation) = node;
        let size = metrics.resolve(&node_id, kind, config);
        layout.layers[generation].push(node_id.clone());
        layout.placements.insert(
            node_id,
            NodePlacement {
                kind,
                generation,
                position: LayoutPoint::new(self.cursor, self.y),
                metrics: size,
            },
        );
        self.cursor += size.width + config.horizontal_gap;
    }
}

fn place_layers<'a>(
    data: &'a ProjectData,
    families: &[&'a Family],
    generations: &Generations<'a>,
    config: &LayoutConfig,
    metrics: &NodeMetricsTable,
    layout: &mut FamilyTreeLayout,
) {
    let mut placed: HashSet<&'a IndividualId> = HashSet::new();

    for layer in 0..=generations.max_layer {
        let mut row = Row { y: layer as f64 * config.row_height(), cursor: 0.0 };

        for (index, &family) in families.iter().enumerate() {
            if generations.families[index] != Some(layer) {
                continue;
            }
            // Spouses join their family's row, whatever their own generation, but only once.
            let mut claim = |spouse: Option<&'a IndividualId>| -> Option<&'a IndividualId> {
                let spouse = spouse.filter(|id| generations.persons.contains_key(*id))?;
                placed.insert(spouse).then_some(spouse)
            };
            let husband = claim(family.husband_id());
            let wife = claim(family.wife_id());

            if let Some(husband) = husband {
                row.place(layout, generations.person_node(husband), config, metrics);
            }
            let family_node = (NodeId::from(family.family_id()), NodeKind::Family, layer);
            row.place(layout, family_node, config, metrics);
            if let Some(wife) = wife {
                row.place(layout, generations.person_node(wife), config, metrics);
            }
        }

        for person in data.individuals().keys() {
            if generations.persons.get(person) == Some(&layer) && placed.insert(person) {
                row.place(layout, generations.person_node(person), config, metrics);
            }
        }
    }
}

fn place_children(
    data: &ProjectData,
    families: &[&Family],
    generations: &Generations<'_>,
    config: &LayoutConfig,
    layout: &mut FamilyTreeLayout,
) {
    for (index, &family) in families.iter().enumerate() {
        let Some(layer) = generations.families[index] else {
            continue;
        };
        let Some(anchor) = layout.placements.get(&NodeId::from(family.family_id())) else {
            continue;
        };
        let center_x = anchor.position.x + anchor.metrics.width / 2.0;

        let mut seen: HashSet<&IndividualId> = HashSet::new();
        let children = family
            .child_ids()
            .iter()
            .filter(|id| data.individuals().contains_key(*id) && seen.insert(*id))
            .map(NodeId::from)
            .collect::<Vec<_>>();
        if children.is_empty() {
            continue;
        }

        let widths = children
            .iter()
            .map(|child| {
                layout.placements.get(child).map_or(config.person_width, |p| p.metrics.width)
            })
            .collect::<Vec<_>>();
        let gaps = config.horizontal_gap * (children.len() - 1) as f64;
        let total = widths.iter().sum::<f64>() + gaps;
        let y = (layer + 1) as f64 * config.row_height();

        let mut x = center_x - total / 2.0;
        for (child, width) in children.iter().zip(widths) {
            if let Some(placement) = layout.placements.get_mut(child) {
                placement.position = LayoutPoint::new(x, y);
            }
            x += width + config.horizontal_gap;
        }
    }
}
