// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::{
    replace_file, ArchiveEntry, PayloadError, ProjectArchive, StoreError, TempFile,
    WriteDurability, DEFAULT_BACKUP_LIMIT,
};
use crate::model::fixtures::{iid, mid, nid, three_generations, tid};
use crate::model::{
    Individual, LayoutPoint, LifeEvent, MediaAttachment, Project, ProjectData, ProjectLayout,
    ProjectMetadata, Source, SourceCitation, SourceId, Tag, Viewport, CURRENT_FORMAT_VERSION,
};

struct ArchiveTestCtx {
    tmp: TempDir,
    archive: ProjectArchive,
}

impl ArchiveTestCtx {
    fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    fn dir_entries(&self) -> Vec<String> {
        let mut names = fs::read_dir(self.tmp.path())
            .expect("read dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

#[fixture]
fn ctx() -> ArchiveTestCtx {
    ArchiveTestCtx { tmp: TempDir::new().expect("temp dir"), archive: ProjectArchive::new() }
}

fn rich_data() -> ProjectData {
    let mut data = three_generations();
    let source_id = SourceId::new("S1").expect("source id");
    let mut source = Source::new(source_id.clone(), "Parish register");
    source.set_author(Some("St. Mary"));
    data.insert_source(source).expect("source");

    let mut tag = Tag::new(tid("t1"), "Emigrant");
    tag.set_color(Some("#aa3300"));
    data.insert_tag(tag).expect("tag");

    let mut birth = LifeEvent::new("BIRT");
    birth.set_date(Some("1 JAN 1900"));
    birth.set_place(Some("Hamburg"));
    birth.citations_mut().push(SourceCitation::with_page(source_id.clone(), "p. 12"));

    let mut tom = Individual::new(iid("I7"), "Tom", "Smith");
    tom.set_birth_year(Some(1900));
    tom.events_mut().push(birth);
    tom.tag_ids_mut().push(tid("t1"));
    let mut photo = MediaAttachment::new(mid("m1"), "photos/tom.jpg");
    photo.set_caption(Some("Harbour, 1920"));
    tom.media_mut().push(photo);
    tom.citations_mut().push(SourceCitation::new(source_id));
    data.insert_individual(tom).expect("individual");

    let relationships = data.derive_relationships();
    data.set_relationships(relationships);
    data.set_viewport(Viewport { pan_x: -12.5, pan_y: 40.0, scale: 1.5 });
    data
}

fn sample_layout() -> ProjectLayout {
    let mut layout = ProjectLayout::default();
    layout.set_zoom(0.75);
    layout.set_view_origin(LayoutPoint::new(10.0, -20.0));
    layout.set_position(nid("I1"), LayoutPoint::new(0.0, 0.0));
    layout.set_position(nid("F1"), LayoutPoint::new(200.0, 0.0));
    layout
}

fn data_with_marker(marker: usize) -> ProjectData {
    let mut data = ProjectData::default();
    let individual = Individual::new(iid("I1"), format!("Save {marker}"), "Doe");
    data.insert_individual(individual).expect("individual");
    data
}

fn write_raw_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).expect("create archive");
    let mut zip = ZipWriter::new(file);
    for (name, bytes) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).expect("start entry");
        zip.write_all(bytes).expect("write entry");
    }
    zip.finish().expect("finish archive");
}

/// Accepts `budget` bytes, then fails every write.
struct FailingWriter {
    file: fs::File,
    budget: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() > self.budget {
            return Err(io::Error::other("disk full"));
        }
        self.budget -= buf.len();
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FailingWriter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl TempFile for FailingWriter {
    fn sync_to_disk(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[rstest]
fn write_then_read_restores_every_payload(ctx: ArchiveTestCtx) {
    let path = ctx.path("doe.kindred");
    let data = rich_data();
    let layout = sample_layout();
    let metadata = ProjectMetadata::from_parts("Doe family", 1_000, 1_000, CURRENT_FORMAT_VERSION);

    let written = ctx.archive.write(&path, &data, &layout, &metadata).expect("write");
    let contents = ctx.archive.read(&path).expect("read");

    assert!(contents.issues.is_empty(), "{:?}", contents.issues);
    assert_eq!(contents.data, data);
    assert_eq!(
        contents.data.individuals().keys().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["I1", "I2", "I3", "I4", "I5", "I6", "I7"]
    );
    assert_eq!(contents.layout, layout);
    assert_eq!(contents.metadata, written);
    assert_eq!(contents.metadata.name(), "Doe family");
    assert_eq!(contents.metadata.created_at(), 1_000);
    assert!(contents.metadata.modified_at() > 1_000);
}

#[rstest]
fn save_marks_project_clean_and_stamps_metadata(ctx: ArchiveTestCtx) {
    let path = ctx.path("doe.kindred");
    let metadata = ProjectMetadata::new("Doe");
    let mut project = Project::from_parts(three_generations(), ProjectLayout::default(), metadata);
    project
        .document_mut()
        .insert_individual(Individual::new(iid("I9"), "New", "Person"))
        .expect("insert");
    assert!(project.is_dirty());

    ctx.archive.save(&path, &mut project).expect("save");

    assert!(!project.is_dirty());
    let opened = ctx.archive.open(&path).expect("open");
    assert!(opened.issues.is_empty());
    assert!(!opened.project.is_dirty());
    assert_eq!(opened.project.document().data(), project.document().data());
    assert_eq!(opened.project.metadata().modified_at(), project.metadata().modified_at());
    assert_eq!(opened.project.document().search("person").len(), 1);
}

#[rstest]
fn failed_save_keeps_project_dirty(ctx: ArchiveTestCtx) {
    let path = ctx.path("missing-dir").join("doe.kindred");
    let mut project = Project::new("Doe");
    project
        .document_mut()
        .insert_individual(Individual::new(iid("I1"), "Ann", "Doe"))
        .expect("insert");

    let err = ctx.archive.save(&path, &mut project).expect_err("parent dir is missing");

    assert!(matches!(err, StoreError::Io { .. }));
    assert!(project.is_dirty());
}

#[rstest]
#[case(1, 3, 0)]
#[case(2, 3, 1)]
#[case(4, 3, 3)]
#[case(6, 3, 3)]
#[case(4, 0, 0)]
#[case(3, 1, 1)]
fn backups_are_bounded_and_newest_first(
    ctx: ArchiveTestCtx,
    #[case] saves: usize,
    #[case] limit: usize,
    #[case] expected: usize,
) {
    let archive = ctx.archive.with_backup_limit(limit);
    let path = ctx.path("tree.kindred");
    let metadata = ProjectMetadata::new("t");
    for marker in 1..=saves {
        archive
            .write(&path, &data_with_marker(marker), &ProjectLayout::default(), &metadata)
            .expect("write");
    }

    let present =
        (1..=limit + 1).filter(|&index| ProjectArchive::backup_path(&path, index).exists()).count();
    assert_eq!(present, expected);
    assert!(!ProjectArchive::backup_path(&path, limit + 1).exists());
    assert!(!ProjectArchive::staged_backup_path(&path).exists());

    let current = archive.read(&path).expect("read current");
    assert_eq!(current.data.individuals()[&iid("I1")].first_name(), format!("Save {saves}"));
    if expected > 0 {
        let newest = archive.read(&ProjectArchive::backup_path(&path, 1)).expect("read backup");
        let first_name = newest.data.individuals()[&iid("I1")].first_name();
        assert_eq!(first_name, format!("Save {}", saves - 1));
    }
}

#[rstest]
fn interrupted_write_leaves_target_and_backups_untouched(ctx: ArchiveTestCtx) {
    let path = ctx.path("tree.kindred");
    ctx.archive
        .write(&path, &data_with_marker(1), &ProjectLayout::default(), &ProjectMetadata::new("t"))
        .expect("first write");
    let before = fs::read(&path).expect("read target");

    let err = ctx
        .archive
        .write_with(&path, &rich_data(), &sample_layout(), &ProjectMetadata::new("t"), |tmp_path| {
            let file = fs::OpenOptions::new().write(true).create_new(true).open(tmp_path)?;
            Ok(FailingWriter { file, budget: 64 })
        })
        .expect_err("writer fails");

    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(fs::read(&path).expect("read target"), before);
    assert_eq!(ctx.dir_entries(), vec!["tree.kindred".to_owned()]);
}

fn first_name_in(archive: &ProjectArchive, path: &Path) -> String {
    let contents = archive.read(path).expect("read archive");
    contents.data.individuals()[&iid("I1")].first_name().to_owned()
}

#[rstest]
fn failed_backup_copy_leaves_existing_backups_untouched(ctx: ArchiveTestCtx) {
    let path = ctx.path("tree.kindred");
    let metadata = ProjectMetadata::new("t");
    for marker in 1..=3 {
        ctx.archive
            .write(&path, &data_with_marker(marker), &ProjectLayout::default(), &metadata)
            .expect("write");
    }
    // A directory in the staging slot makes the backup copy fail.
    let staged = ProjectArchive::staged_backup_path(&path);
    fs::create_dir(&staged).expect("block staging path");

    let err = ctx
        .archive
        .write(&path, &data_with_marker(4), &ProjectLayout::default(), &metadata)
        .expect_err("backup copy fails");

    assert!(matches!(&err, StoreError::Io { path, .. } if path == &staged));
    assert_eq!(first_name_in(&ctx.archive, &path), "Save 3");
    assert_eq!(first_name_in(&ctx.archive, &ProjectArchive::backup_path(&path, 1)), "Save 2");
    assert_eq!(first_name_in(&ctx.archive, &ProjectArchive::backup_path(&path, 2)), "Save 1");
    assert_eq!(
        ctx.dir_entries(),
        vec!["tree.kindred", "tree.kindred.bak.tmp", "tree.kindred.bak1", "tree.kindred.bak2"]
    );
}

#[rstest]
#[case::viewport(
    |data: &mut ProjectData, _: &mut ProjectLayout| data.set_viewport(Viewport {
        pan_x: f64::NAN,
        pan_y: 0.0,
        scale: 1.0,
    }),
    ArchiveEntry::Data,
    "viewport.panX"
)]
#[case::zoom(
    |_: &mut ProjectData, layout: &mut ProjectLayout| layout.set_zoom(f64::INFINITY),
    ArchiveEntry::Layout,
    "zoom"
)]
#[case::position(
    |_: &mut ProjectData, layout: &mut ProjectLayout| {
        layout.set_position(nid("I1"), LayoutPoint::new(0.0, f64::NEG_INFINITY));
    },
    ArchiveEntry::Layout,
    "positions.I1"
)]
fn non_finite_numbers_are_rejected_before_writing(
    ctx: ArchiveTestCtx,
    #[case] corrupt: fn(&mut ProjectData, &mut ProjectLayout),
    #[case] expected_entry: ArchiveEntry,
    #[case] expected_field: &str,
) {
    let path = ctx.path("tree.kindred");
    ctx.archive
        .write(&path, &data_with_marker(1), &ProjectLayout::default(), &ProjectMetadata::new("t"))
        .expect("first write");
    let before = fs::read(&path).expect("read target");

    let mut data = three_generations();
    let mut layout = sample_layout();
    corrupt(&mut data, &mut layout);
    let err = ctx
        .archive
        .write(&path, &data, &layout, &ProjectMetadata::new("t"))
        .expect_err("non-finite value");

    match err {
        StoreError::NonFinite { entry, field } => {
            assert_eq!(entry, expected_entry);
            assert_eq!(field, expected_field);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fs::read(&path).expect("read target"), before);
    assert_eq!(ctx.dir_entries(), vec!["tree.kindred".to_owned()]);
}

#[rstest]
fn failed_replace_keeps_the_finished_temp_file(ctx: ArchiveTestCtx) {
    let tmp_path = ctx.path(".kindred.tmp.tree.kindred.1");
    fs::write(&tmp_path, b"finished archive").expect("write temp");
    // Neither a rename nor a copy can replace a directory.
    let target = ctx.path("tree.kindred");
    fs::create_dir(&target).expect("target dir");

    let err = replace_file(&tmp_path, &target).expect_err("target is a directory");

    match err {
        StoreError::Replace { path, kept, .. } => {
            assert_eq!(path, target);
            assert_eq!(kept, tmp_path);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fs::read(&tmp_path).expect("temp survives"), b"finished archive");
}

#[rstest]
fn durable_writes_round_trip(ctx: ArchiveTestCtx) {
    let archive = ctx.archive.with_durability(WriteDurability::Durable);
    let path = ctx.path("tree.kindred");

    let metadata = ProjectMetadata::new("t");
    archive.write(&path, &rich_data(), &sample_layout(), &metadata).expect("write");

    assert_eq!(archive.read(&path).expect("read").data, rich_data());
    assert_eq!(ctx.archive.backup_limit(), DEFAULT_BACKUP_LIMIT);
}

#[rstest]
fn missing_entries_fall_back_to_defaults(ctx: ArchiveTestCtx) {
    let path = ctx.path("minimal.kindred");
    let data = br#"{"individuals":[{"id":"I1","firstName":"Ann"}]}"#;
    write_raw_archive(&path, &[("data.json", data)]);

    let contents = ctx.archive.read(&path).expect("read");

    assert!(contents.issues.is_empty());
    assert_eq!(contents.data.individuals()[&iid("I1")].first_name(), "Ann");
    assert_eq!(contents.layout, ProjectLayout::default());
    assert_eq!(contents.metadata.name(), "minimal");
}

#[rstest]
fn corrupt_layout_entry_is_isolated(ctx: ArchiveTestCtx) {
    let path = ctx.path("tree.kindred");
    let data = br#"{"individuals":[{"id":"I1","firstName":"Ann","lastName":"Doe"}]}"#;
    let meta = br#"{"name":"Doe","createdAt":1000,"modifiedAt":2000,"formatVersion":1}"#;
    write_raw_archive(
        &path,
        &[("data.json", data), ("layout.json", b"{not json"), ("meta.json", meta)],
    );

    let opened = ctx.archive.open(&path).expect("open");

    assert_eq!(opened.issues.len(), 1);
    assert!(matches!(
        &opened.issues[0],
        StoreError::Parse { entry: ArchiveEntry::Layout, source: PayloadError::Json(_) }
    ));
    assert_eq!(opened.project.document().individuals().len(), 1);
    assert_eq!(opened.project.layout(), &ProjectLayout::default());
    assert_eq!(opened.project.metadata().name(), "Doe");
}

#[rstest]
fn invalid_ids_and_duplicates_are_reported_per_entry(ctx: ArchiveTestCtx) {
    let path = ctx.path("tree.kindred");
    let data = br#"{"individuals":[{"id":"I1"},{"id":"I1"}]}"#;
    let layout = br#"{"positions":{" I1":{"x":1,"y":2}}}"#;
    write_raw_archive(&path, &[("data.json", data), ("layout.json", layout)]);

    let contents = ctx.archive.read(&path).expect("read");

    assert_eq!(contents.issues.len(), 2);
    assert!(matches!(
        &contents.issues[0],
        StoreError::Parse { entry: ArchiveEntry::Data, source: PayloadError::Document(_) }
    ));
    assert!(matches!(
        &contents.issues[1],
        StoreError::Parse {
            entry: ArchiveEntry::Layout,
            source: PayloadError::InvalidId { field: "node id", .. }
        }
    ));
    assert!(contents.data.is_empty());
}

#[rstest]
fn legacy_second_timestamps_are_converted(ctx: ArchiveTestCtx) {
    let path = ctx.path("legacy.kindred");
    let meta =
        br#"{"name":"Old","createdAt":1700000000.25,"modifiedAt":1700000500000,"formatVersion":0}"#;
    write_raw_archive(&path, &[("meta.json", meta)]);

    let contents = ctx.archive.read(&path).expect("read");

    assert_eq!(contents.metadata.created_at(), 1_700_000_000_250);
    assert_eq!(contents.metadata.modified_at(), 1_700_000_500_000);
    assert_eq!(contents.metadata.format_version(), 0);

    let rewritten = ctx.path("rewritten.kindred");
    let stamped = ctx
        .archive
        .write(&rewritten, &contents.data, &contents.layout, &contents.metadata)
        .expect("write");
    assert_eq!(stamped.format_version(), CURRENT_FORMAT_VERSION);
    let reread = ctx.archive.read(&rewritten).expect("reread");
    assert_eq!(reread.metadata.created_at(), 1_700_000_000_250);
}

#[rstest]
fn newer_format_versions_still_load(ctx: ArchiveTestCtx) {
    let path = ctx.path("future.kindred");
    let meta = br#"{"name":"Future","createdAt":1,"modifiedAt":2,"formatVersion":99}"#;
    let data = br#"{"individuals":[{"id":"I1"}]}"#;
    write_raw_archive(&path, &[("meta.json", meta), ("data.json", data)]);

    let contents = ctx.archive.read(&path).expect("read");

    assert!(contents.issues.is_empty());
    assert_eq!(contents.metadata.format_version(), 99);
    assert_eq!(contents.data.individuals().len(), 1);
}

#[rstest]
fn broken_container_fails_the_whole_read(ctx: ArchiveTestCtx) {
    let path = ctx.path("garbage.kindred");
    fs::write(&path, b"definitely not a zip file").expect("write garbage");

    let err = ctx.archive.read(&path).expect_err("corrupt container");

    assert!(matches!(err, StoreError::CorruptArchive { .. }));
}

#[rstest]
fn missing_file_surfaces_the_os_error(ctx: ArchiveTestCtx) {
    let err = ctx.archive.open(&ctx.path("nope.kindred")).expect_err("missing file");

    match err {
        StoreError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::NotFound),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn in_memory_archives_read_without_a_file() {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        zip.start_file("meta.json", SimpleFileOptions::default()).expect("start entry");
        zip.write_all(br#"{"name":"Mem"}"#).expect("write entry");
        zip.finish().expect("finish");
    }
    cursor.set_position(0);

    let contents = super::read_archive(cursor, Path::new("mem.kindred")).expect("read");

    assert_eq!(contents.metadata.name(), "Mem");
    assert_eq!(contents.metadata.created_at(), 0);
    assert!(contents.data.is_empty());
}
