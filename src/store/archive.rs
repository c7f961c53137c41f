// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::model::{
    DocumentError, Family, Gender, Id, IdError, Individual, LayoutPoint, LifeEvent, MediaAttachment,
    NodeId, Project, ProjectData, ProjectLayout, ProjectMetadata, Relationship, RelationshipKind,
    Source, SourceCitation, Tag, Viewport, CURRENT_FORMAT_VERSION,
};

/// Backups kept by [`ProjectArchive::new`].
pub const DEFAULT_BACKUP_LIMIT: usize = 3;

/// The named entries of a project archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveEntry {
    Data,
    Layout,
    Meta,
}

impl ArchiveEntry {
    pub const ALL: [Self; 3] = [Self::Data, Self::Layout, Self::Meta];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Data => "data.json",
            Self::Layout => "layout.json",
            Self::Meta => "meta.json",
        }
    }
}

impl fmt::Display for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Why one archive entry could not be decoded.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("cannot read entry: {0}")]
    Read(#[from] io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field} '{value}': {source}")]
    InvalidId {
        field: &'static str,
        value: String,
        #[source]
        source: IdError,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure; `source` is the unchanged OS error.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt archive {}: {source}", path.display())]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("cannot parse {entry}: {source}")]
    Parse {
        entry: ArchiveEntry,
        #[source]
        source: PayloadError,
    },
    #[error("cannot serialize {entry}: {source}")]
    Serialize {
        entry: ArchiveEntry,
        #[source]
        source: serde_json::Error,
    },
    /// JSON has no encoding for NaN or infinity; nothing is written.
    #[error("cannot serialize {entry}: {field} is not a finite number")]
    NonFinite { entry: ArchiveEntry, field: String },
    /// The new archive is complete at `kept` but could not be moved over `path`.
    #[error("cannot replace {}, new archive kept at {}: {source}", path.display(), kept.display())]
    Replace {
        path: PathBuf,
        kept: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus rename, no fsync.
    #[default]
    BestEffort,

    /// Also syncs the temp file before the rename and the parent directory after it.
    /// Exact guarantees depend on platform and filesystem.
    Durable,
}

/// Decoded archive payloads. Entries that were missing or failed to decode hold their default
/// value; failures are listed in `issues`.
#[derive(Debug, Default)]
pub struct ArchiveContents {
    pub data: ProjectData,
    pub layout: ProjectLayout,
    pub metadata: ProjectMetadata,
    pub issues: Vec<StoreError>,
}

/// A project loaded from disk, clean, plus the entry failures that were tolerated.
#[derive(Debug)]
pub struct OpenedProject {
    pub project: Project,
    pub issues: Vec<StoreError>,
}

/// Reads and writes project archives: one zip file holding `data.json`, `layout.json` and
/// `meta.json`.
///
/// Writes go to a temp sibling first and replace the target by rename, so readers never see a
/// half-written archive. Before the replace, the previous target is rotated into numbered
/// backups (`file.bak1` newest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectArchive {
    backup_limit: usize,
    durability: WriteDurability,
}

impl Default for ProjectArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectArchive {
    pub fn new() -> Self {
        Self { backup_limit: DEFAULT_BACKUP_LIMIT, durability: WriteDurability::default() }
    }

    /// `0` disables backups.
    pub fn with_backup_limit(mut self, backup_limit: usize) -> Self {
        self.backup_limit = backup_limit;
        self
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn backup_limit(&self) -> usize {
        self.backup_limit
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    /// `<file name>.bak<index>` next to `path`.
    pub fn backup_path(path: &Path, index: usize) -> PathBuf {
        let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
        name.push(format!(".bak{index}"));
        path.with_file_name(name)
    }

    /// Writes the three payloads to `path`.
    ///
    /// Returns the metadata as written (`modified_at` stamped with the current time, format
    /// version upgraded). On error the target and its backups are unchanged.
    pub fn write(
        &self,
        path: &Path,
        data: &ProjectData,
        layout: &ProjectLayout,
        metadata: &ProjectMetadata,
    ) -> Result<ProjectMetadata, StoreError> {
        self.write_with(path, data, layout, metadata, |tmp_path| {
            fs::OpenOptions::new().write(true).create_new(true).open(tmp_path)
        })
    }

    /// Writes the project and marks its document saved. A failed save leaves it dirty.
    pub fn save(&self, path: &Path, project: &mut Project) -> Result<(), StoreError> {
        let stamped =
            self.write(path, project.document().data(), project.layout(), project.metadata())?;
        *project.metadata_mut() = stamped;
        project.document_mut().mark_saved();
        Ok(())
    }

    fn write_with<W, F>(
        &self,
        path: &Path,
        data: &ProjectData,
        layout: &ProjectLayout,
        metadata: &ProjectMetadata,
        open_temp: F,
    ) -> Result<ProjectMetadata, StoreError>
    where
        W: TempFile,
        F: FnOnce(&Path) -> io::Result<W>,
    {
        let mut stamped = metadata.clone();
        stamped.touch();
        let payloads = encode_payloads(data, layout, &stamped)?;

        let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: io::Error::other("path has no parent or file name"),
            });
        };
        let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };

        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let tmp_path =
            parent.join(format!(".kindred.tmp.{}.{}", file_name.to_string_lossy(), nanos));

        let sink = open_temp(&tmp_path)
            .map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
        if let Err(source) = write_zip(sink, &payloads, self.durability) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::Io { path: tmp_path, source });
        }

        if let Err(err) = self.rotate_backups(path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }

        replace_file(&tmp_path, path)?;

        if self.durability == WriteDurability::Durable {
            #[cfg(unix)]
            {
                let dir = fs::File::open(parent)
                    .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
                dir.sync_all()
                    .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
            }
        }

        log::info!(
            "event=archive_written path={} individuals={} families={} backups={}",
            path.display(),
            data.individuals().len(),
            data.families().len(),
            self.backup_limit
        );
        Ok(stamped)
    }

    /// `<file name>.bak.tmp` next to `path`, where the next `.bak1` is staged.
    fn staged_backup_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
        name.push(".bak.tmp");
        path.with_file_name(name)
    }

    /// Copies the current target to a staging file, then shifts `.bak1..` up by one (dropping
    /// the oldest) and moves the staged copy to `.bak1`. No-op when the target does not exist
    /// yet.
    ///
    /// A failed copy leaves every backup untouched. A failed rename during the shift can leave
    /// a gap in the numbering; no backup other than the oldest is lost.
    fn rotate_backups(&self, path: &Path) -> Result<(), StoreError> {
        if self.backup_limit == 0 {
            return Ok(());
        }
        match fs::metadata(path) {
            Ok(md) if md.is_file() => {}
            Ok(_) => return Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
        }

        let staged = Self::staged_backup_path(path);
        if let Err(source) = fs::copy(path, &staged) {
            let _ = fs::remove_file(&staged);
            return Err(StoreError::Io { path: staged, source });
        }

        let shifted = self.shift_backups(path, &staged);
        if shifted.is_err() {
            let _ = fs::remove_file(&staged);
        }
        shifted?;
        log::debug!("event=backups_rotated path={} limit={}", path.display(), self.backup_limit);
        Ok(())
    }

    fn shift_backups(&self, path: &Path, staged: &Path) -> Result<(), StoreError> {
        let oldest = Self::backup_path(path, self.backup_limit);
        match fs::remove_file(&oldest) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(StoreError::Io { path: oldest, source }),
        }

        for index in (1..self.backup_limit).rev() {
            let from = Self::backup_path(path, index);
            if !from.exists() {
                continue;
            }
            let to = Self::backup_path(path, index + 1);
            rename_overwrite(&from, &to)
                .map_err(|source| StoreError::Io { path: from.clone(), source })?;
        }

        let newest = Self::backup_path(path, 1);
        rename_overwrite(staged, &newest)
            .map_err(|source| StoreError::Io { path: newest.clone(), source })
    }

    /// Decodes an archive. Only an unreadable file or a broken zip container fails the whole
    /// read; each entry is decoded on its own.
    pub fn read(&self, path: &Path) -> Result<ArchiveContents, StoreError> {
        let file = fs::File::open(path)
            .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
        let mut contents = read_archive(file, path)?;

        if contents.metadata.name().is_empty() {
            if let Some(stem) = path.file_stem() {
                contents.metadata.set_name(stem.to_string_lossy());
            }
        }
        Ok(contents)
    }

    /// Reads a project ready for editing: the document is clean and its search index built.
    pub fn open(&self, path: &Path) -> Result<OpenedProject, StoreError> {
        let ArchiveContents { data, layout, metadata, issues } = self.read(path)?;
        log::info!(
            "event=archive_opened path={} individuals={} families={} issues={}",
            path.display(),
            data.individuals().len(),
            data.families().len(),
            issues.len()
        );
        Ok(OpenedProject { project: Project::from_parts(data, layout, metadata), issues })
    }
}

/// Destination of the in-progress archive write.
trait TempFile: Write + Seek {
    fn sync_to_disk(&mut self) -> io::Result<()>;
}

impl TempFile for fs::File {
    fn sync_to_disk(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

struct Payloads {
    data: Vec<u8>,
    layout: Vec<u8>,
    meta: Vec<u8>,
}

impl Payloads {
    fn entries(&self) -> [(ArchiveEntry, &[u8]); 3] {
        [
            (ArchiveEntry::Data, self.data.as_slice()),
            (ArchiveEntry::Layout, self.layout.as_slice()),
            (ArchiveEntry::Meta, self.meta.as_slice()),
        ]
    }
}

fn encode_payloads(
    data: &ProjectData,
    layout: &ProjectLayout,
    metadata: &ProjectMetadata,
) -> Result<Payloads, StoreError> {
    ensure_finite(data, layout)?;
    Ok(Payloads {
        data: encode_entry(ArchiveEntry::Data, &data_to_json(data))?,
        layout: encode_entry(ArchiveEntry::Layout, &layout_to_json(layout))?,
        meta: encode_entry(ArchiveEntry::Meta, &meta_to_json(metadata))?,
    })
}

fn ensure_finite(data: &ProjectData, layout: &ProjectLayout) -> Result<(), StoreError> {
    let viewport = data.viewport();
    let origin = layout.view_origin();
    let scalars = [
        (ArchiveEntry::Data, "viewport.panX", viewport.pan_x),
        (ArchiveEntry::Data, "viewport.panY", viewport.pan_y),
        (ArchiveEntry::Data, "viewport.scale", viewport.scale),
        (ArchiveEntry::Layout, "zoom", layout.zoom()),
        (ArchiveEntry::Layout, "viewOrigin.x", origin.x),
        (ArchiveEntry::Layout, "viewOrigin.y", origin.y),
    ];
    if let Some((entry, field, _)) = scalars.into_iter().find(|(_, _, value)| !value.is_finite()) {
        return Err(StoreError::NonFinite { entry, field: field.to_owned() });
    }

    let unplaceable =
        layout.positions().iter().find(|(_, point)| !(point.x.is_finite() && point.y.is_finite()));
    match unplaceable {
        Some((node_id, _)) => Err(StoreError::NonFinite {
            entry: ArchiveEntry::Layout,
            field: format!("positions.{node_id}"),
        }),
        None => Ok(()),
    }
}

fn encode_entry<T: Serialize>(entry: ArchiveEntry, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize { entry, source })
}

fn write_zip<W: TempFile>(
    sink: W,
    payloads: &Payloads,
    durability: WriteDurability,
) -> io::Result<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(sink);
    for (entry, bytes) in payloads.entries() {
        zip.start_file(entry.file_name(), options).map_err(zip_to_io)?;
        zip.write_all(bytes)?;
    }
    let mut sink = zip.finish().map_err(zip_to_io)?;
    sink.flush()?;
    if durability == WriteDurability::Durable {
        sink.sync_to_disk()?;
    }
    Ok(())
}

fn zip_to_io(err: ZipError) -> io::Error {
    match err {
        ZipError::Io(err) => err,
        other => io::Error::other(other),
    }
}

fn read_archive<R: Read + Seek>(reader: R, path: &Path) -> Result<ArchiveContents, StoreError> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|source| StoreError::CorruptArchive { path: path.to_path_buf(), source })?;
    let mut issues = Vec::new();

    let metadata = decode_entry(&mut archive, ArchiveEntry::Meta, &mut issues, |bytes| {
        meta_from_json(serde_json::from_slice(bytes)?)
    })
    .unwrap_or_else(|| ProjectMetadata::new(""));
    if metadata.format_version() > CURRENT_FORMAT_VERSION {
        log::warn!(
            "event=archive_newer_format path={} format_version={} supported={}",
            path.display(),
            metadata.format_version(),
            CURRENT_FORMAT_VERSION
        );
    }

    let data = decode_entry(&mut archive, ArchiveEntry::Data, &mut issues, |bytes| {
        data_from_json(serde_json::from_slice(bytes)?)
    })
    .unwrap_or_default();
    let layout = decode_entry(&mut archive, ArchiveEntry::Layout, &mut issues, |bytes| {
        layout_from_json(serde_json::from_slice(bytes)?)
    })
    .unwrap_or_default();

    Ok(ArchiveContents { data, layout, metadata, issues })
}

/// `None` when the entry is missing or failed to decode; failures are pushed to `issues`.
fn decode_entry<R, T>(
    archive: &mut ZipArchive<R>,
    entry: ArchiveEntry,
    issues: &mut Vec<StoreError>,
    decode: impl FnOnce(&[u8]) -> Result<T, PayloadError>,
) -> Option<T>
where
    R: Read + Seek,
{
    let result = match read_entry_bytes(archive, entry) {
        Ok(None) => return None,
        Ok(Some(bytes)) => decode(&bytes),
        Err(err) => Err(PayloadError::Read(err)),
    };
    match result {
        Ok(value) => Some(value),
        Err(source) => {
            log::warn!("event=archive_entry_skipped entry={entry} error={source}");
            issues.push(StoreError::Parse { entry, source });
            None
        }
    }
}

fn read_entry_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    entry: ArchiveEntry,
) -> io::Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(entry.file_name()) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(zip_to_io(err)),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(Some(bytes))
}

/// Atomic rename, or copy-then-delete when the filesystem refuses the rename. The temp file
/// survives a failed copy.
fn replace_file(tmp_path: &Path, path: &Path) -> Result<(), StoreError> {
    let Err(rename_err) = rename_overwrite(tmp_path, path) else {
        return Ok(());
    };

    log::warn!("event=archive_rename_fallback path={} error={rename_err}", path.display());
    if let Err(source) = fs::copy(tmp_path, path) {
        log::warn!(
            "event=archive_replace_failed path={} kept={} error={source}",
            path.display(),
            tmp_path.display()
        );
        return Err(StoreError::Replace {
            path: path.to_path_buf(),
            kept: tmp_path.to_path_buf(),
            source,
        });
    }
    let _ = fs::remove_file(tmp_path);
    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        use std::io::ErrorKind::{AlreadyExists, PermissionDenied};

        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err) if matches!(err.kind(), AlreadyExists | PermissionDenied) => {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

// JSON payload types and model conversion.
include!("archive/helpers.rs");

#[cfg(test)]
mod tests;
