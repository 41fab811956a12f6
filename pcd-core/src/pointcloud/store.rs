use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::pointcloud::point::{ColoredPoint, PointCloud};

/// Append-only accumulation of colored points for one scanning session.
///
/// All access goes through a single mutex, so the ingest context can append
/// while another context resets or takes a snapshot for export.
#[derive(Debug, Default)]
pub struct ColoredPointStore {
    points: Mutex<Vec<ColoredPoint>>,
}

impl ColoredPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, point: ColoredPoint) {
        self.lock().push(point);
    }

    /// Appends a batch under one lock acquisition, preserving its order.
    pub fn extend<I>(&self, points: I)
    where
        I: IntoIterator<Item = ColoredPoint>,
    {
        self.lock().extend(points);
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> PointCloud {
        let points = self.lock().clone();
        PointCloud::new(points)
    }

    // The vector is always left whole, so a panic elsewhere does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Vec<ColoredPoint>> {
        self.points.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
