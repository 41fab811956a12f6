use glam::Vec3;
use pcd_core::pointcloud::{point::ColoredPoint, store::ColoredPointStore};
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};
use serde::{Deserialize, Serialize};

use crate::{
    frame::{FrameCache, FrameSnapshot},
    mesh::MeshUpdate,
    projection::Projector,
    sampler::PixelSampler,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Color vertices on the rayon pool. Output order is the same either way.
    pub parallel: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Turns mesh anchor geometry into colored points using the latest frame.
#[derive(Debug, Clone, Default)]
pub struct MeshIngestor {
    config: IngestConfig,
}

impl MeshIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Colors every vertex of `update` that is visible in the cached frame and
    /// appends it to `store`. Returns the number of points appended.
    ///
    /// All vertices are processed on every call, so repeated updates of the
    /// same anchor add their points again.
    pub fn ingest(
        &self,
        update: &MeshUpdate,
        frame_cache: &FrameCache,
        store: &ColoredPointStore,
    ) -> usize {
        let Some(snapshot) = frame_cache.current() else {
            log::debug!(
                "no camera frame yet, skipping {} vertices",
                update.vertices.len()
            );
            return 0;
        };
        let Some(projector) = Projector::for_frame(&snapshot) else {
            log::debug!("camera frame has an empty image or viewport, skipping mesh update");
            return 0;
        };

        let points: Vec<ColoredPoint> = if self.config.parallel {
            update
                .vertices
                .par_iter()
                .filter_map(|&local| color_vertex(update, &projector, &snapshot, local))
                .collect()
        } else {
            update
                .vertices
                .iter()
                .filter_map(|&local| color_vertex(update, &projector, &snapshot, local))
                .collect()
        };

        let appended = points.len();
        store.extend(points);

        log::debug!(
            "colored {appended} of {} mesh vertices",
            update.vertices.len()
        );
        appended
    }
}

fn color_vertex(
    update: &MeshUpdate,
    projector: &Projector,
    snapshot: &FrameSnapshot,
    local: Vec3,
) -> Option<ColoredPoint> {
    let world = update.world_vertex(local);
    let normalized = projector.project_point(world)?;
    let color = PixelSampler::sample(normalized, snapshot)?;
    Some(ColoredPoint::new(world.to_array(), color))
}
