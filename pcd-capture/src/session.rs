use std::{
    io,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    thread::{self, JoinHandle},
};

use crossbeam::channel::Receiver;
use pcd_core::pointcloud::store::ColoredPointStore;

use crate::{
    frame::{FrameCache, FrameSnapshot},
    ingest::{IngestConfig, MeshIngestor},
    mesh::MeshUpdate,
};

/// Updates pushed by the AR runtime, in arrival order.
#[derive(Debug)]
pub enum SessionEvent {
    Frame(FrameSnapshot),
    Mesh(MeshUpdate),
}

/// Capture state of one scan: the latest frame, the accumulated points, and
/// whether mesh updates are still being taken in.
///
/// Scanning stops on [`ScanSession::freeze`] (done before exporting) and
/// restarts on [`ScanSession::reset`]. Both wait for mesh updates that are
/// still being ingested.
#[derive(Debug)]
pub struct ScanSession {
    frame_cache: FrameCache,
    store: ColoredPointStore,
    ingestor: MeshIngestor,
    // held for reading across a whole ingest
    scanning: RwLock<bool>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

impl ScanSession {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            frame_cache: FrameCache::new(),
            store: ColoredPointStore::new(),
            ingestor: MeshIngestor::new(config),
            scanning: RwLock::new(true),
        }
    }

    pub fn on_frame(&self, snapshot: FrameSnapshot) {
        self.frame_cache.update(snapshot);
    }

    /// Returns the number of points added; always 0 while frozen.
    pub fn on_mesh(&self, update: &MeshUpdate) -> usize {
        let scanning = self.read_state();
        if !*scanning {
            return 0;
        }
        self.ingestor.ingest(update, &self.frame_cache, &self.store)
    }

    pub fn handle(&self, event: SessionEvent) -> usize {
        match event {
            SessionEvent::Frame(snapshot) => {
                self.on_frame(snapshot);
                0
            }
            SessionEvent::Mesh(update) => self.on_mesh(&update),
        }
    }

    /// Stops accepting mesh updates and returns the store for export.
    pub fn freeze(&self) -> &ColoredPointStore {
        *self.write_state() = false;
        log::debug!("scan frozen with {} points", self.store.len());
        &self.store
    }

    /// Drops every captured point and resumes scanning.
    pub fn reset(&self) {
        let mut scanning = self.write_state();
        self.store.reset();
        *scanning = true;
        log::debug!("scan reset");
    }

    pub fn is_scanning(&self) -> bool {
        *self.read_state()
    }

    pub fn point_count(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &ColoredPointStore {
        &self.store
    }

    pub fn frame_cache(&self) -> &FrameCache {
        &self.frame_cache
    }

    fn read_state(&self) -> RwLockReadGuard<'_, bool> {
        self.scanning.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, bool> {
        self.scanning.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Applies events from `events` to `session` on a dedicated thread until every
/// sender is dropped. The handle yields the total number of points added.
pub fn spawn_session_worker(
    session: Arc<ScanSession>,
    events: Receiver<SessionEvent>,
) -> io::Result<JoinHandle<usize>> {
    thread::Builder::new()
        .name("scan-session".to_string())
        .spawn(move || {
            let mut appended = 0;
            for event in events {
                appended += session.handle(event);
            }
            log::debug!("event stream closed after {appended} points");
            appended
        })
}
