// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use thiserror::Error;

/// An opaque identifier, unique within one document.
///
/// Ids are free-form strings (imports keep GEDCOM xref ids like `I12`); the type only rejects
/// values that would be unusable as map keys in the archive: empty strings and strings with
/// leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id(&value)?;
        Ok(Self { value, _marker: PhantomData })
    }

    /// For ids built by the crate itself (e.g. `I12`), which are valid by construction.
    pub(crate) fn new_generated(value: String) -> Self {
        debug_assert!(validate_id(&value).is_ok());
        Self { value, _marker: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    /// Reinterprets the id under another tag. Layout nodes share the id space of the
    /// entities they draw.
    pub fn retag<U>(&self) -> Id<U> {
        Id { value: self.value.clone(), _marker: PhantomData }
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not start or end with whitespace")]
    SurroundingWhitespace,
}

fn validate_id(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.trim() != value {
        return Err(IdError::SurroundingWhitespace);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndividualIdTag {}
pub type IndividualId = Id<IndividualIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FamilyIdTag {}
pub type FamilyId = Id<FamilyIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagIdTag {}
pub type TagId = Id<TagIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceIdTag {}
pub type SourceId = Id<SourceIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaIdTag {}
pub type MediaId = Id<MediaIdTag>;

/// A drawable layout node: either an individual or a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

impl From<&IndividualId> for NodeId {
    fn from(id: &IndividualId) -> Self {
        id.retag()
    }
}

impl From<&FamilyId> for NodeId {
    fn from(id: &FamilyId) -> Self {
        id.retag()
    }
}
