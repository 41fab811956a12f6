pub mod buffer;
pub mod cache;

use std::sync::Arc;

use glam::Vec2;

pub use buffer::{PixelBuffer, PixelFormat, Plane, YuvRange};
pub use cache::FrameCache;

use crate::projection::{CameraParams, Orientation};

/// Everything needed to project world points into one captured camera image.
///
/// The viewport size and orientation are copied in at capture time instead of
/// being looked up on the live view.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub image: Arc<PixelBuffer>,
    pub camera: CameraParams,
    pub orientation: Orientation,
    pub viewport_size: Vec2,
}

impl FrameSnapshot {
    pub fn new(
        image: PixelBuffer,
        camera: CameraParams,
        orientation: Orientation,
        viewport_size: Vec2,
    ) -> Self {
        Self {
            image: Arc::new(image),
            camera,
            orientation,
            viewport_size,
        }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.image.format()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Sensor image size in pixels.
    pub fn image_resolution(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }
}
