// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reversible edit commands and the undo/redo history.
//!
//! A [`Command`] describes an edit. Executing it validates every precondition before touching
//! the document and yields an [`Applied`] record holding exactly what is needed to reverse it.
//! Both directions report a [`Delta`] the UI can use to refresh derived state.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{
    Document, DocumentError, EntityKind, Family, FamilyId, Individual, IndividualId, LayoutPoint,
    MediaAttachment, MediaId, NodeId, Project, ProjectLayout, Revision, Tag, TagId,
};

/// The entity a tag or media attachment hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Individual(IndividualId),
    Family(FamilyId),
}

impl From<IndividualId> for Owner {
    fn from(id: IndividualId) -> Self {
        Self::Individual(id)
    }
}

impl From<FamilyId> for Owner {
    fn from(id: FamilyId) -> Self {
        Self::Family(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddIndividual { individual: Individual },
    /// Unlinks the individual from every family, then removes it.
    RemoveIndividual { individual_id: IndividualId },
    AddFamily { family: Family },
    RemoveFamily { family_id: FamilyId },
    EditIndividualName { individual_id: IndividualId, first_name: String, last_name: String },
    /// Attaches the tag to `owner` and registers it in the catalog, each only if missing.
    AssignTag { owner: Owner, tag: Tag },
    /// Detaches the tag from `owner`. The catalog keeps the tag.
    UnassignTag { owner: Owner, tag_id: TagId },
    AttachMedia { owner: Owner, media: MediaAttachment },
    DetachMedia { owner: Owner, media_id: MediaId },
    /// Repositions a layout node. Touches the layout cache only.
    MoveNode { node_id: NodeId, to: LayoutPoint },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddIndividual,
    RemoveIndividual,
    AddFamily,
    RemoveFamily,
    EditIndividualName,
    AssignTag,
    UnassignTag,
    AttachMedia,
    DetachMedia,
    MoveNode,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::AddIndividual { .. } => CommandKind::AddIndividual,
            Self::RemoveIndividual { .. } => CommandKind::RemoveIndividual,
            Self::AddFamily { .. } => CommandKind::AddFamily,
            Self::RemoveFamily { .. } => CommandKind::RemoveFamily,
            Self::EditIndividualName { .. } => CommandKind::EditIndividualName,
            Self::AssignTag { .. } => CommandKind::AssignTag,
            Self::UnassignTag { .. } => CommandKind::UnassignTag,
            Self::AttachMedia { .. } => CommandKind::AttachMedia,
            Self::DetachMedia { .. } => CommandKind::DetachMedia,
            Self::MoveNode { .. } => CommandKind::MoveNode,
        }
    }
}

/// Something a delta can point at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Individual(IndividualId),
    Family(FamilyId),
    Tag(TagId),
}

impl From<&Owner> for EntityRef {
    fn from(owner: &Owner) -> Self {
        match owner {
            Owner::Individual(id) => Self::Individual(id.clone()),
            Owner::Family(id) => Self::Family(id.clone()),
        }
    }
}

/// Coarse change report: which entities were added, removed or updated, and which layout nodes
/// moved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<EntityRef>,
    pub removed: Vec<EntityRef>,
    pub updated: Vec<EntityRef>,
    pub moved: Vec<NodeId>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.updated.is_empty()
            && self.moved.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<EntityRef>,
    removed: BTreeSet<EntityRef>,
    updated: BTreeSet<EntityRef>,
    moved: BTreeSet<NodeId>,
}

impl DeltaBuilder {
    fn record_added(&mut self, entity: EntityRef) {
        self.removed.remove(&entity);
        self.updated.remove(&entity);
        self.added.insert(entity);
    }

    fn record_removed(&mut self, entity: EntityRef) {
        self.added.remove(&entity);
        self.updated.remove(&entity);
        self.removed.insert(entity);
    }

    fn record_updated(&mut self, entity: EntityRef) {
        if self.added.contains(&entity) || self.removed.contains(&entity) {
            return;
        }
        self.updated.insert(entity);
    }

    fn record_moved(&mut self, node_id: NodeId) {
        self.moved.insert(node_id);
    }

    fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
            moved: self.moved.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// Undo found the document without the change the command made (it was edited outside
    /// the history).
    #[error("{kind:?} is not applied to the current document")]
    NotApplied { kind: CommandKind },
}

/// A command that ran, plus what it needs to reverse itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    kind: CommandKind,
    record: UndoRecord,
    before: Revision,
    after: Revision,
    delta: Delta,
}

impl Applied {
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    /// Document revision before the command ran.
    pub fn before(&self) -> Revision {
        self.before
    }

    /// Document revision right after the command ran.
    pub fn after(&self) -> Revision {
        self.after
    }
}

/// Linear undo/redo history with a cursor.
///
/// Entries `[0, cursor)` are undoable, `[cursor, len)` redoable. Executing a new command drops
/// the redo tail.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: Option<usize>,
}

#[derive(Debug)]
struct HistoryEntry {
    command: Command,
    applied: Applied,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` entries; the oldest are dropped first.
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit.max(1)), ..Self::default() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn undo_kind(&self) -> Option<CommandKind> {
        self.cursor.checked_sub(1).map(|index| self.entries[index].command.kind())
    }

    pub fn redo_kind(&self) -> Option<CommandKind> {
        self.entries.get(self.cursor).map(|entry| entry.command.kind())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn execute(
        &mut self,
        project: &mut Project,
        command: Command,
    ) -> Result<Delta, CommandError> {
        let (document, layout) = project.parts_mut();
        let applied = command.execute(document, layout)?;
        let delta = applied.delta.clone();

        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry { command, applied });
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
            }
        }
        self.cursor = self.entries.len();
        Ok(delta)
    }

    /// Reverts the newest undoable entry. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, project: &mut Project) -> Result<Option<Delta>, CommandError> {
        let Some(index) = self.cursor.checked_sub(1) else {
            return Ok(None);
        };

        let (document, layout) = project.parts_mut();
        let delta = self.entries[index].applied.undo(document, layout)?;
        self.cursor = index;
        Ok(Some(delta))
    }

    /// Re-runs the oldest redoable entry. `Ok(None)` when there is nothing to redo.
    ///
    /// The revision the entry first produced comes back only when the document is still at the
    /// revision its undo left behind, so a save taken in between is matched again.
    pub fn redo(&mut self, project: &mut Project) -> Result<Option<Delta>, CommandError> {
        let Some(entry) = self.entries.get_mut(self.cursor) else {
            return Ok(None);
        };

        let (document, layout) = project.parts_mut();
        let untouched = document.revision() == entry.applied.before;
        let mut applied = entry.command.execute(document, layout)?;
        // Edits made outside the history since the undo keep the fresh revision.
        if untouched {
            applied.before = entry.applied.before;
            applied.after = entry.applied.after;
            document.restore_revision(applied.after);
        }
        log::debug!(
            "event=command_redo kind={:?} revision={} restored={untouched}",
            applied.kind,
            applied.after.get()
        );

        let delta = applied.delta.clone();
        entry.applied = applied;
        self.cursor += 1;
        Ok(Some(delta))
    }
}

// Per-command execute/undo implementation.
include!("command_impl.rs");

#[cfg(test)]
mod tests;
