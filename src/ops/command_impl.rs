// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// What each command captured at execute time.
#[derive(Debug, Clone, PartialEq)]
enum UndoRecord {
    AddIndividual { individual_id: IndividualId },
    RemoveIndividual { index: usize, individual: Individual, links: Vec<FamilyLink> },
    AddFamily { family_id: FamilyId },
    RemoveFamily { index: usize, family: Family },
    EditIndividualName { individual_id: IndividualId, first_name: String, last_name: String },
    AssignTag { owner: Owner, tag_id: TagId, attached: bool, registered: bool },
    UnassignTag { owner: Owner, tag_id: TagId, index: usize },
    AttachMedia { owner: Owner, media_id: MediaId },
    DetachMedia { owner: Owner, index: usize, media: MediaAttachment },
    MoveNode { node_id: NodeId, from: Option<LayoutPoint> },
}

/// The places one family referenced a removed individual.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FamilyLink {
    family_id: FamilyId,
    husband: bool,
    wife: bool,
    child_indices: Vec<usize>,
}

impl FamilyLink {
    fn of(family: &Family, individual_id: &IndividualId) -> Option<Self> {
        let link = Self {
            family_id: family.family_id().clone(),
            husband: family.husband_id() == Some(individual_id),
            wife: family.wife_id() == Some(individual_id),
            child_indices: family
                .child_ids()
                .iter()
                .enumerate()
                .filter(|(_, child)| *child == individual_id)
                .map(|(index, _)| index)
                .collect(),
        };
        (link.husband || link.wife || !link.child_indices.is_empty()).then_some(link)
    }

    fn detach(&self, family: &mut Family) {
        if self.husband {
            family.set_husband_id(None);
        }
        if self.wife {
            family.set_wife_id(None);
        }
        for &index in self.child_indices.iter().rev() {
            if index < family.child_ids().len() {
                family.child_ids_mut().remove(index);
            }
        }
    }

    fn reattach(&self, family: &mut Family, individual_id: &IndividualId) {
        if self.husband {
            family.set_husband_id(Some(individual_id.clone()));
        }
        if self.wife {
            family.set_wife_id(Some(individual_id.clone()));
        }
        for &index in &self.child_indices {
            let index = index.min(family.child_ids().len());
            family.child_ids_mut().insert(index, individual_id.clone());
        }
    }
}

impl Command {
    /// Runs the command against the document (and layout, for `MoveNode`).
    ///
    /// Preconditions are checked up front; on error nothing was changed.
    pub fn execute(
        &self,
        document: &mut Document,
        layout: &mut ProjectLayout,
    ) -> Result<Applied, CommandError> {
        let kind = self.kind();
        let before = document.revision();
        let mut delta = DeltaBuilder::default();
        let record = self.apply(document, layout, &mut delta)?;
        let after = document.revision();

        log::debug!("event=command_execute kind={kind:?} revision={}", after.get());
        Ok(Applied { kind, record, before, after, delta: delta.finish() })
    }

    fn apply(
        &self,
        document: &mut Document,
        layout: &mut ProjectLayout,
        delta: &mut DeltaBuilder,
    ) -> Result<UndoRecord, CommandError> {
        match self {
            Self::AddIndividual { individual } => {
                let individual_id = individual.individual_id().clone();
                document.insert_individual(individual.clone())?;
                delta.record_added(EntityRef::Individual(individual_id.clone()));
                Ok(UndoRecord::AddIndividual { individual_id })
            }
            Self::RemoveIndividual { individual_id } => {
                if document.individual(individual_id).is_none() {
                    let id = individual_id.as_str();
                    return Err(DocumentError::not_found(EntityKind::Individual, id).into());
                }

                let links = document
                    .families()
                    .values()
                    .filter_map(|family| FamilyLink::of(family, individual_id))
                    .collect::<Vec<_>>();
                for link in &links {
                    document.update_family(&link.family_id, |family| link.detach(family))?;
                    delta.record_updated(EntityRef::Family(link.family_id.clone()));
                }

                let (index, individual) = document.remove_individual(individual_id)?;
                delta.record_removed(EntityRef::Individual(individual_id.clone()));
                Ok(UndoRecord::RemoveIndividual { index, individual, links })
            }
            Self::AddFamily { family } => {
                let family_id = family.family_id().clone();
                document.insert_family(family.clone())?;
                delta.record_added(EntityRef::Family(family_id.clone()));
                Ok(UndoRecord::AddFamily { family_id })
            }
            Self::RemoveFamily { family_id } => {
                let (index, family) = document.remove_family(family_id)?;
                delta.record_removed(EntityRef::Family(family_id.clone()));
                Ok(UndoRecord::RemoveFamily { index, family })
            }
            Self::EditIndividualName { individual_id, first_name, last_name } => {
                let (previous_first, previous_last) =
                    document.update_individual(individual_id, |individual| {
                        let previous =
                            (individual.first_name().to_owned(), individual.last_name().to_owned());
                        individual.set_name(first_name.clone(), last_name.clone());
                        previous
                    })?;
                delta.record_updated(EntityRef::Individual(individual_id.clone()));
                Ok(UndoRecord::EditIndividualName {
                    individual_id: individual_id.clone(),
                    first_name: previous_first,
                    last_name: previous_last,
                })
            }
            Self::AssignTag { owner, tag } => {
                let tag_id = tag.tag_id().clone();
                let attached = !owner_tag_ids(document, owner)?.contains(&tag_id);
                let registered = !document.contains_tag(&tag_id);

                if registered {
                    document.insert_tag(tag.clone())?;
                    delta.record_added(EntityRef::Tag(tag_id.clone()));
                }
                if attached {
                    edit_owner_tags(document, owner, |tag_ids| tag_ids.push(tag_id.clone()))?;
                    delta.record_updated(owner.into());
                }
                Ok(UndoRecord::AssignTag { owner: owner.clone(), tag_id, attached, registered })
            }
            Self::UnassignTag { owner, tag_id } => {
                let Some(index) = owner_tag_ids(document, owner)?.iter().position(|id| id == tag_id)
                else {
                    return Err(DocumentError::not_found(EntityKind::Tag, tag_id.as_str()).into());
                };
                edit_owner_tags(document, owner, |tag_ids| {
                    tag_ids.remove(index);
                })?;
                delta.record_updated(owner.into());
                Ok(UndoRecord::UnassignTag { owner: owner.clone(), tag_id: tag_id.clone(), index })
            }
            Self::AttachMedia { owner, media } => {
                let media_id = media.media_id().clone();
                let attachments = owner_media(document, owner)?;
                if attachments.iter().any(|existing| existing.media_id() == &media_id) {
                    let err = DocumentError::duplicate(EntityKind::Media, media_id.as_str());
                    return Err(err.into());
                }
                edit_owner_media(document, owner, |attachments| attachments.push(media.clone()))?;
                delta.record_updated(owner.into());
                Ok(UndoRecord::AttachMedia { owner: owner.clone(), media_id })
            }
            Self::DetachMedia { owner, media_id } => {
                let Some(index) = media_position(document, owner, media_id)? else {
                    let err = DocumentError::not_found(EntityKind::Media, media_id.as_str());
                    return Err(err.into());
                };
                let mut detached = None;
                edit_owner_media(document, owner, |attachments| {
                    detached = Some(attachments.remove(index));
                })?;
                let Some(media) = detached else {
                    return Err(CommandError::NotApplied { kind: CommandKind::DetachMedia });
                };
                delta.record_updated(owner.into());
                Ok(UndoRecord::DetachMedia { owner: owner.clone(), index, media })
            }
            Self::MoveNode { node_id, to } => {
                let from = layout.set_position(node_id.clone(), *to);
                delta.record_moved(node_id.clone());
                Ok(UndoRecord::MoveNode { node_id: node_id.clone(), from })
            }
        }
    }
}

impl Applied {
    /// Reverses exactly what `execute` did.
    ///
    /// When the document still sits at the revision the command produced, it is put back to
    /// the revision from before the command, so the dirty state matches that point too.
    pub fn undo(
        &self,
        document: &mut Document,
        layout: &mut ProjectLayout,
    ) -> Result<Delta, CommandError> {
        let untouched_since = document.revision() == self.after;
        let mut delta = DeltaBuilder::default();
        self.record.revert(self.kind, document, layout, &mut delta)?;
        if untouched_since {
            document.restore_revision(self.before);
        }

        log::debug!(
            "event=command_undo kind={:?} revision={}",
            self.kind,
            document.revision().get()
        );
        Ok(delta.finish())
    }
}

impl UndoRecord {
    fn revert(
        &self,
        kind: CommandKind,
        document: &mut Document,
        layout: &mut ProjectLayout,
        delta: &mut DeltaBuilder,
    ) -> Result<(), CommandError> {
        match self {
            Self::AddIndividual { individual_id } => {
                if document.individual(individual_id).is_none() {
                    return Err(CommandError::NotApplied { kind });
                }
                document.remove_individual(individual_id)?;
                delta.record_removed(EntityRef::Individual(individual_id.clone()));
            }
            Self::RemoveIndividual { index, individual, links } => {
                if links.iter().any(|link| document.family(&link.family_id).is_none()) {
                    return Err(CommandError::NotApplied { kind });
                }
                let individual_id = individual.individual_id().clone();
                document.insert_individual_at(*index, individual.clone())?;
                delta.record_added(EntityRef::Individual(individual_id.clone()));
                for link in links {
                    document.update_family(&link.family_id, |family| {
                        link.reattach(family, &individual_id)
                    })?;
                    delta.record_updated(EntityRef::Family(link.family_id.clone()));
                }
            }
            Self::AddFamily { family_id } => {
                document.remove_family(family_id)?;
                delta.record_removed(EntityRef::Family(family_id.clone()));
            }
            Self::RemoveFamily { index, family } => {
                document.insert_family_at(*index, family.clone())?;
                delta.record_added(EntityRef::Family(family.family_id().clone()));
            }
            Self::EditIndividualName { individual_id, first_name, last_name } => {
                document.update_individual(individual_id, |individual| {
                    individual.set_name(first_name.clone(), last_name.clone());
                })?;
                delta.record_updated(EntityRef::Individual(individual_id.clone()));
            }
            Self::AssignTag { owner, tag_id, attached, registered } => {
                let position = owner_tag_ids(document, owner)?.iter().position(|id| id == tag_id);
                if (*attached && position.is_none())
                    || (*registered && !document.contains_tag(tag_id))
                {
                    return Err(CommandError::NotApplied { kind });
                }
                if let (true, Some(index)) = (*attached, position) {
                    edit_owner_tags(document, owner, |tag_ids| {
                        tag_ids.remove(index);
                    })?;
                    delta.record_updated(owner.into());
                }
                if *registered {
                    document.remove_tag(tag_id)?;
                    delta.record_removed(EntityRef::Tag(tag_id.clone()));
                }
            }
            Self::UnassignTag { owner, tag_id, index } => {
                edit_owner_tags(document, owner, |tag_ids| {
                    let index = (*index).min(tag_ids.len());
                    tag_ids.insert(index, tag_id.clone());
                })?;
                delta.record_updated(owner.into());
            }
            Self::AttachMedia { owner, media_id } => {
                let Some(index) = media_position(document, owner, media_id)? else {
                    return Err(CommandError::NotApplied { kind });
                };
                edit_owner_media(document, owner, |attachments| {
                    attachments.remove(index);
                })?;
                delta.record_updated(owner.into());
            }
            Self::DetachMedia { owner, index, media } => {
                edit_owner_media(document, owner, |attachments| {
                    let index = (*index).min(attachments.len());
                    attachments.insert(index, media.clone());
                })?;
                delta.record_updated(owner.into());
            }
            Self::MoveNode { node_id, from } => {
                match from {
                    Some(point) => {
                        layout.set_position(node_id.clone(), *point);
                    }
                    None => {
                        layout.remove_position(node_id);
                    }
                }
                delta.record_moved(node_id.clone());
            }
        }
        Ok(())
    }
}

fn owner_tag_ids<'a>(document: &'a Document, owner: &Owner) -> Result<&'a [TagId], DocumentError> {
    match owner {
        Owner::Individual(id) => document
            .individual(id)
            .map(Individual::tag_ids)
            .ok_or_else(|| DocumentError::not_found(EntityKind::Individual, id.as_str())),
        Owner::Family(id) => document
            .family(id)
            .map(Family::tag_ids)
            .ok_or_else(|| DocumentError::not_found(EntityKind::Family, id.as_str())),
    }
}

fn owner_media<'a>(
    document: &'a Document,
    owner: &Owner,
) -> Result<&'a [MediaAttachment], DocumentError> {
    match owner {
        Owner::Individual(id) => document
            .individual(id)
            .map(Individual::media)
            .ok_or_else(|| DocumentError::not_found(EntityKind::Individual, id.as_str())),
        Owner::Family(id) => document
            .family(id)
            .map(Family::media)
            .ok_or_else(|| DocumentError::not_found(EntityKind::Family, id.as_str())),
    }
}

fn media_position(
    document: &Document,
    owner: &Owner,
    media_id: &MediaId,
) -> Result<Option<usize>, DocumentError> {
    Ok(owner_media(document, owner)?.iter().position(|media| media.media_id() == media_id))
}

fn edit_owner_tags(
    document: &mut Document,
    owner: &Owner,
    edit: impl FnOnce(&mut Vec<TagId>),
) -> Result<(), DocumentError> {
    match owner {
        Owner::Individual(id) => {
            document.update_individual(id, |individual| edit(individual.tag_ids_mut()))
        }
        Owner::Family(id) => document.update_family(id, |family| edit(family.tag_ids_mut())),
    }
}

fn edit_owner_media(
    document: &mut Document,
    owner: &Owner,
    edit: impl FnOnce(&mut Vec<MediaAttachment>),
) -> Result<(), DocumentError> {
    match owner {
        Owner::Individual(id) => {
            document.update_individual(id, |individual| edit(individual.media_mut()))
        }
        Owner::Family(id) => document.update_family(id, |family| edit(family.media_mut())),
    }
}
