use std::sync::{Arc, PoisonError, RwLock};

use crate::frame::FrameSnapshot;

/// Holds the most recent camera frame. Last write wins.
///
/// Snapshots are swapped as a whole `Arc`, so a reader gets either the old or
/// the new frame and keeps it alive for as long as it needs it.
#[derive(Debug, Default)]
pub struct FrameCache {
    current: RwLock<Option<Arc<FrameSnapshot>>>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, snapshot: FrameSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    pub fn current(&self) -> Option<Arc<FrameSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
