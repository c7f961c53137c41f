// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use crate::model::fixtures::{fid, iid, mid, nid, tid, three_generations};
use crate::model::{
    DocumentError, EntityKind, Family, Individual, LayoutPoint, MediaAttachment, Project,
    ProjectData, ProjectLayout, ProjectMetadata, Tag, Viewport,
};

use super::{Command, CommandError, CommandKind, EntityRef, History, Owner};

/// `three_generations` plus tag `t1` on Jane and media `m1` on the first family, loaded clean.
fn project() -> Project {
    let mut data = three_generations();
    data.insert_tag(Tag::new(tid("t1"), "Emigrant")).expect("tag");
    data.individuals_mut().get_mut(&iid("I2")).expect("jane").tag_ids_mut().push(tid("t1"));
    data.families_mut()
        .get_mut(&fid("F1"))
        .expect("family")
        .media_mut()
        .push(MediaAttachment::new(mid("m1"), "photos/wedding.jpg"));

    let mut layout = ProjectLayout::default();
    layout.set_position(nid("I1"), LayoutPoint::new(0.0, 0.0));
    Project::from_parts(data, layout, ProjectMetadata::new("Doe"))
}

fn individual_order(data: &ProjectData) -> Vec<String> {
    data.individuals().keys().map(|id| id.to_string()).collect()
}

fn family_order(data: &ProjectData) -> Vec<String> {
    data.families().keys().map(|id| id.to_string()).collect()
}

fn add(id: &str, first: &str, last: &str) -> Command {
    Command::AddIndividual { individual: Individual::new(iid(id), first, last) }
}

fn assign(owner: Owner, tag_id: &str, name: &str) -> Command {
    Command::AssignTag { owner, tag: Tag::new(tid(tag_id), name) }
}

#[rstest]
#[case::add_individual(add("I7", "Eve", "Doe"))]
#[case::remove_linked_individual(Command::RemoveIndividual { individual_id: iid("I3") })]
#[case::add_family(Command::AddFamily {
    family: Family::with_spouses(fid("F3"), Some(iid("I5")), Some(iid("I6"))),
})]
#[case::remove_family(Command::RemoveFamily { family_id: fid("F1") })]
#[case::edit_name(Command::EditIndividualName {
    individual_id: iid("I1"),
    first_name: "Johannes".to_owned(),
    last_name: "Doe-Smith".to_owned(),
})]
#[case::assign_new_tag(assign(Owner::Individual(iid("I1")), "t2", "Soldier"))]
#[case::assign_known_tag(assign(Owner::Family(fid("F2")), "t1", "Emigrant"))]
#[case::unassign_tag(Command::UnassignTag {
    owner: Owner::Individual(iid("I2")),
    tag_id: tid("t1"),
})]
#[case::attach_media(Command::AttachMedia {
    owner: Owner::Individual(iid("I5")),
    media: MediaAttachment::new(mid("m2"), "scans/birth.png"),
})]
#[case::detach_media(Command::DetachMedia { owner: Owner::Family(fid("F1")), media_id: mid("m1") })]
#[case::move_node(Command::MoveNode { node_id: nid("I1"), to: LayoutPoint::new(120.0, 40.0) })]
#[case::move_unplaced_node(Command::MoveNode {
    node_id: nid("F2"),
    to: LayoutPoint::new(8.0, 8.0),
})]
fn execute_then_undo_restores_the_document(#[case] command: Command) {
    let mut project = project();
    let data_before = project.document().data().clone();
    let layout_before = project.layout().clone();
    let mut history = History::new();

    history.execute(&mut project, command).expect("execute");
    let delta = history.undo(&mut project).expect("undo").expect("undoable");

    let data_after = project.document().data();
    assert_eq!(data_after, &data_before);
    assert_eq!(individual_order(data_after), individual_order(&data_before));
    assert_eq!(family_order(data_after), family_order(&data_before));
    assert_eq!(project.layout(), &layout_before);
    assert!(!project.is_dirty());
    assert!(!delta.is_empty());
    assert_eq!(project.document().search("johannes").len(), 0);
}

#[test]
fn failed_execute_leaves_state_dirty_flag_and_history_unchanged() {
    let mut project = project();
    let before = project.document().data().clone();
    let mut history = History::new();

    let err = history.execute(&mut project, add("I1", "Dup", "Doe")).expect_err("duplicate id");

    assert_eq!(err, CommandError::Document(DocumentError::duplicate(EntityKind::Individual, "I1")));
    assert_eq!(project.document().data(), &before);
    assert!(!project.is_dirty());
    assert!(!history.can_undo());

    let detach = Command::DetachMedia { owner: Owner::Individual(iid("I1")), media_id: mid("m1") };
    let err = history.execute(&mut project, detach).expect_err("no such attachment");
    assert_eq!(err, CommandError::Document(DocumentError::not_found(EntityKind::Media, "m1")));
    assert!(!project.is_dirty());
}

#[test]
fn execute_after_undo_truncates_redo_tail() {
    let mut project = project();
    let mut history = History::new();

    history.execute(&mut project, add("I7", "New", "Person")).expect("add I7");
    history.execute(&mut project, add("I8", "New", "Person")).expect("add I8");
    history.undo(&mut project).expect("undo I8");
    assert!(history.can_redo());

    history.execute(&mut project, add("I9", "New", "Person")).expect("add I9");
    assert!(!history.can_redo());
    assert_eq!(history.len(), 2);
    assert!(history.redo(&mut project).expect("redo").is_none());

    let ids = individual_order(project.document().data());
    assert_eq!(&ids[6..], ["I7", "I9"]);
}

#[test]
fn dirty_flag_follows_the_saved_revision_across_undo_and_redo() {
    let mut project = project();
    let mut history = History::new();

    history.execute(&mut project, add("I7", "Eve", "Doe")).expect("add");
    assert!(project.is_dirty());

    project.document_mut().mark_saved();
    history.undo(&mut project).expect("undo");
    assert!(project.is_dirty(), "document differs from what was saved");

    history.redo(&mut project).expect("redo");
    assert!(!project.is_dirty(), "redo returns to the saved state");
    assert_eq!(history.undo_kind(), Some(CommandKind::AddIndividual));
}

#[test]
fn redo_after_an_outside_edit_stays_dirty() {
    let mut project = project();
    let mut history = History::new();

    history.execute(&mut project, add("I7", "Eve", "Doe")).expect("add");
    project.document_mut().mark_saved();
    history.undo(&mut project).expect("undo");

    project.document_mut().set_viewport(Viewport { pan_x: 25.0, pan_y: -10.0, scale: 2.0 });
    history.redo(&mut project).expect("redo");

    assert!(project.document().individual(&iid("I7")).is_some());
    assert!(project.is_dirty(), "the viewport change was never saved");

    // Undo still applies to the fresh revision and leaves the document dirty.
    history.undo(&mut project).expect("undo again");
    assert!(project.document().individual(&iid("I7")).is_none());
    assert!(project.is_dirty());
}

#[test]
fn remove_individual_unlinks_and_undo_relinks() {
    let mut project = project();
    let mut history = History::new();

    let delta = history
        .execute(&mut project, Command::RemoveIndividual { individual_id: iid("I3") })
        .expect("remove");

    assert_eq!(delta.removed, vec![EntityRef::Individual(iid("I3"))]);
    assert_eq!(delta.updated, vec![EntityRef::Family(fid("F1")), EntityRef::Family(fid("F2"))]);
    let document = project.document();
    assert!(document.family(&fid("F1")).is_some_and(|f| f.child_ids().is_empty()));
    assert!(document.family(&fid("F2")).is_some_and(|f| f.husband_id().is_none()));
    assert!(document.search("jim").is_empty());

    history.undo(&mut project).expect("undo");
    let document = project.document();
    assert_eq!(document.family(&fid("F1")).map(|f| f.child_ids().to_vec()), Some(vec![iid("I3")]));
    assert_eq!(document.family(&fid("F2")).and_then(|f| f.husband_id()), Some(&iid("I3")));
    assert_eq!(document.search("jim").len(), 1);
}

#[test]
fn assign_tag_undo_only_reverses_performed_phases() {
    let mut project = project();
    let mut history = History::new();

    // Catalog already has t1: only the attach phase runs.
    let delta = history
        .execute(&mut project, assign(Owner::Individual(iid("I1")), "t1", "x"))
        .expect("assign known tag");
    assert_eq!(delta.added, Vec::new());
    assert_eq!(delta.updated, vec![EntityRef::Individual(iid("I1"))]);

    history.undo(&mut project).expect("undo");
    assert!(project.document().contains_tag(&tid("t1")));
    assert_eq!(project.document().tags()[&tid("t1")].name(), "Emigrant");

    // I2 already carries t1: assigning a fresh t3 to I2 registers and attaches.
    let delta = history
        .execute(&mut project, assign(Owner::Individual(iid("I2")), "t3", "Sailor"))
        .expect("assign new tag");
    assert_eq!(delta.added, vec![EntityRef::Tag(tid("t3"))]);

    history.undo(&mut project).expect("undo");
    assert!(!project.document().contains_tag(&tid("t3")));
    let tags = project.document().individual(&iid("I2")).map(|p| p.tag_ids().to_vec());
    assert_eq!(tags, Some(vec![tid("t1")]));
}

#[test]
fn assign_tag_already_attached_and_registered_is_a_clean_noop() {
    let mut project = project();
    let mut history = History::new();

    let delta = history
        .execute(&mut project, assign(Owner::Individual(iid("I2")), "t1", "x"))
        .expect("assign");

    assert!(delta.is_empty());
    assert!(!project.is_dirty());
}

#[test]
fn detach_media_undo_restores_payload_at_its_index() {
    let mut project = project();
    let mut history = History::new();
    let mut scan = MediaAttachment::new(mid("m2"), "scans/certificate.pdf");
    scan.set_caption(Some("Marriage certificate"));
    scan.set_mime_type(Some("application/pdf"));

    let attach = Command::AttachMedia { owner: Owner::Family(fid("F1")), media: scan.clone() };
    history.execute(&mut project, attach).expect("attach");
    let detach = Command::DetachMedia { owner: Owner::Family(fid("F1")), media_id: mid("m1") };
    history.execute(&mut project, detach).expect("detach");
    assert_eq!(project.document().family(&fid("F1")).map(|f| f.media().len()), Some(1));

    history.undo(&mut project).expect("undo detach");

    let media =
        project.document().family(&fid("F1")).map(|f| f.media().to_vec()).unwrap_or_default();
    assert_eq!(media.len(), 2);
    assert_eq!(media[0].media_id(), &mid("m1"));
    assert_eq!(media[0].path(), "photos/wedding.jpg");
    assert_eq!(media[1], scan);
}

#[test]
fn move_node_notifies_on_execute_and_undo_without_dirtying() {
    let mut project = project();
    let mut history = History::new();

    let command = Command::MoveNode { node_id: nid("I1"), to: LayoutPoint::new(50.0, 10.0) };
    let delta = history.execute(&mut project, command).expect("move");
    assert_eq!(delta.moved, vec![nid("I1")]);
    assert_eq!(project.layout().position(&nid("I1")), Some(LayoutPoint::new(50.0, 10.0)));
    assert!(!project.is_dirty());

    let delta = history.undo(&mut project).expect("undo").expect("undoable");
    assert_eq!(delta.moved, vec![nid("I1")]);
    assert_eq!(project.layout().position(&nid("I1")), Some(LayoutPoint::new(0.0, 0.0)));
}

#[test]
fn history_limit_drops_oldest_entries() {
    let mut project = project();
    let mut history = History::with_limit(2);

    for id in ["I7", "I8", "I9"] {
        history.execute(&mut project, add(id, "N", "P")).expect("add");
    }
    assert_eq!(history.len(), 2);

    assert!(history.undo(&mut project).expect("undo I9").is_some());
    assert!(history.undo(&mut project).expect("undo I8").is_some());
    assert!(history.undo(&mut project).expect("nothing left").is_none());
    assert!(project.document().individual(&iid("I7")).is_some());
    assert!(project.is_dirty());
}

#[test]
fn undo_of_an_edit_reverted_elsewhere_is_not_applied() {
    let mut project = project();
    let (document, layout) = project.parts_mut();

    let media = MediaAttachment::new(mid("m9"), "a.jpg");
    let applied = Command::AttachMedia { owner: Owner::Individual(iid("I1")), media }
        .execute(document, layout)
        .expect("attach");
    document
        .update_individual(&iid("I1"), |individual| individual.media_mut().clear())
        .expect("external edit");

    let err = applied.undo(document, layout).expect_err("attachment is gone");
    assert_eq!(err, CommandError::NotApplied { kind: CommandKind::AttachMedia });
    assert!(document.is_dirty());
}
