// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use super::archive::{ProjectArchive, StoreError};
use crate::model::{DocumentSnapshot, Project, ProjectLayout, ProjectMetadata, Revision};

/// Everything a background save needs, detached from the live project.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    path: PathBuf,
    snapshot: DocumentSnapshot,
    layout: ProjectLayout,
    metadata: ProjectMetadata,
}

impl SaveRequest {
    pub fn of_project(path: impl Into<PathBuf>, project: &Project) -> Self {
        Self {
            path: path.into(),
            snapshot: project.document().snapshot(),
            layout: project.layout().clone(),
            metadata: project.metadata().clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn revision(&self) -> Revision {
        self.snapshot.revision
    }
}

/// Result of one background save. `result` holds the metadata as written.
#[derive(Debug)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub revision: Revision,
    pub result: Result<ProjectMetadata, StoreError>,
}

impl SaveOutcome {
    /// Records a successful save on the project it was taken from.
    ///
    /// Returns whether the project is clean afterwards; edits made after the snapshot keep it
    /// dirty.
    pub fn apply_to(self, project: &mut Project) -> Result<bool, StoreError> {
        let metadata = self.result?;
        *project.metadata_mut() = metadata;
        Ok(project.document_mut().mark_saved_at(self.revision))
    }
}

#[derive(Debug, Default)]
struct SaveQueueState {
    pending: HashMap<PathBuf, SaveRequest>,
    queue: VecDeque<PathBuf>,
    in_flight: Option<PathBuf>,
    completed: Vec<SaveOutcome>,
    shutdown: bool,
}

#[derive(Debug)]
struct SaveQueueInner {
    state: Mutex<SaveQueueState>,
    cv: Condvar,
}

impl SaveQueueInner {
    fn lock(&self) -> MutexGuard<'_, SaveQueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, SaveQueueState>) -> MutexGuard<'a, SaveQueueState> {
        self.cv.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs archive writes on a worker thread so the editor never blocks on disk.
///
/// Requests for the same path coalesce: only the newest pending snapshot is written.
/// Dropping the queue finishes pending saves, then stops the worker.
#[derive(Debug)]
pub struct SaveQueue {
    inner: Arc<SaveQueueInner>,
    worker: Option<JoinHandle<()>>,
}

impl SaveQueue {
    pub fn new(archive: ProjectArchive) -> io::Result<Self> {
        let inner = Arc::new(SaveQueueInner {
            state: Mutex::new(SaveQueueState::default()),
            cv: Condvar::new(),
        });

        let worker = std::thread::Builder::new().name("kindred-save".to_owned()).spawn({
            let inner = inner.clone();
            move || run_worker(&inner, archive)
        })?;

        Ok(Self { inner, worker: Some(worker) })
    }

    pub fn schedule(&self, request: SaveRequest) {
        let path = request.path.clone();
        log::debug!(
            "event=save_scheduled path={} revision={}",
            path.display(),
            request.revision().get()
        );

        let mut state = self.inner.lock();
        if state.pending.insert(path.clone(), request).is_none() {
            state.queue.push_back(path);
        }
        self.inner.cv.notify_all();
    }

    /// Blocks until every scheduled save has finished.
    pub fn flush(&self) {
        let mut state = self.inner.lock();
        while state.in_flight.is_some() || !state.pending.is_empty() {
            state = self.inner.wait(state);
        }
    }

    /// Finished saves since the last call, oldest first.
    pub fn take_completed(&self) -> Vec<SaveOutcome> {
        std::mem::take(&mut self.inner.lock().completed)
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        self.inner.lock().shutdown = true;
        self.inner.cv.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(inner: &SaveQueueInner, archive: ProjectArchive) {
    loop {
        let request = {
            let mut state = inner.lock();
            loop {
                if let Some(path) = state.queue.pop_front() {
                    if let Some(request) = state.pending.remove(&path) {
                        state.in_flight = Some(path);
                        break request;
                    }
                    continue;
                }
                if state.shutdown {
                    return;
                }
                state = inner.wait(state);
            }
        };

        let SaveRequest { path, snapshot, layout, metadata } = request;
        let result = archive.write(&path, &snapshot.data, &layout, &metadata);
        if let Err(err) = &result {
            log::warn!("event=save_failed path={} error={err}", path.display());
        }

        let mut state = inner.lock();
        state.in_flight = None;
        state.completed.push(SaveOutcome { path, revision: snapshot.revision, result });
        inner.cv.notify_all();
    }
}
