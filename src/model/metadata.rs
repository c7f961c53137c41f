// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{SystemTime, UNIX_EPOCH};

/// Archive format version written by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Milliseconds since the Unix epoch, saturating to 0 for clocks set before 1970.
pub fn now_epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Document name, timestamps and format version (`meta.json`).
///
/// Stored apart from the data payload so readers can branch on `format_version` before
/// touching `data.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    name: String,
    created_at: i64,
    modified_at: i64,
    format_version: u32,
}

impl ProjectMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_epoch_millis();
        Self {
            name: name.into(),
            created_at: now,
            modified_at: now,
            format_version: CURRENT_FORMAT_VERSION,
        }
    }

    pub fn from_parts(
        name: impl Into<String>,
        created_at: i64,
        modified_at: i64,
        format_version: u32,
    ) -> Self {
        Self { name: name.into(), created_at, modified_at, format_version }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn modified_at(&self) -> i64 {
        self.modified_at
    }

    pub fn set_modified_at(&mut self, modified_at: i64) {
        self.modified_at = modified_at;
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Stamps the metadata for a write: `modified_at = now`, current format version.
    pub fn touch(&mut self) {
        self.modified_at = now_epoch_millis().max(self.created_at);
        self.format_version = CURRENT_FORMAT_VERSION;
    }
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
