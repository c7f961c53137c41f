// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for projects on disk.
//!
//! A project is one zip archive with three JSON entries (data, layout, metadata). Writes are
//! atomic and keep a bounded set of numbered backups; reads tolerate damaged entries.

pub mod archive;
pub mod save_queue;

pub use archive::{
    ArchiveContents, ArchiveEntry, OpenedProject, PayloadError, ProjectArchive, StoreError,
    WriteDurability, DEFAULT_BACKUP_LIMIT,
};
pub use save_queue::{SaveOutcome, SaveQueue, SaveRequest};
