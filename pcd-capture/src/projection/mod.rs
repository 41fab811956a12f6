pub mod camera;
pub mod display;

use glam::{Affine2, Mat4, Vec2, Vec3};

pub use camera::{CameraIntrinsics, CameraParams};
pub use display::{display_transform, Orientation};

use crate::frame::FrameSnapshot;

/// World space to normalized sensor-image coordinates for one frame.
///
/// The camera inverse and the display transform are computed once in
/// [`Projector::for_frame`] and shared by every projected point.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    camera: CameraParams,
    world_to_camera: Mat4,
    resolution: Vec2,
    viewport: Vec2,
    display: Affine2,
    display_inverse: Affine2,
}

impl Projector {
    /// Returns `None` for frames with an empty or non-finite image or viewport.
    pub fn for_frame(snapshot: &FrameSnapshot) -> Option<Self> {
        let viewport = snapshot.viewport_size;
        let resolution = snapshot.image_resolution();
        if !is_positive_size(viewport) || !is_positive_size(resolution) {
            return None;
        }

        let display = display_transform(snapshot.orientation, resolution, viewport);
        Some(Self {
            camera: snapshot.camera,
            world_to_camera: snapshot.camera.world_to_camera(),
            resolution,
            viewport,
            display,
            display_inverse: display.inverse(),
        })
    }

    /// Returns where `world` lands in `snapshot`'s image buffer, with (0, 0)
    /// the top-left and (1, 1) the bottom-right corner of the sensor image.
    ///
    /// Projecting many points into one frame is cheaper through
    /// [`Projector::for_frame`] and [`Projector::project_point`].
    pub fn project(world: Vec3, snapshot: &FrameSnapshot) -> Option<Vec2> {
        Self::for_frame(snapshot)?.project_point(world)
    }

    /// The camera projects into the on-screen viewport, which is rotated and
    /// cropped relative to the buffer, so the display transform is undone
    /// afterwards. Results outside the unit square are returned as-is; only
    /// points behind the camera or with non-finite coordinates give `None`.
    pub fn project_point(&self, world: Vec3) -> Option<Vec2> {
        let camera = self.world_to_camera.transform_point3(world);
        let depth = -camera.z;
        if depth.is_nan() || depth <= 0.0 {
            return None;
        }

        let on_screen = self.camera.project_to_viewport(
            camera,
            self.resolution,
            self.display,
            self.viewport,
        );
        if !on_screen.is_finite() {
            return None;
        }

        let normalized_view = on_screen / self.viewport;
        let normalized_image = self.display_inverse.transform_point2(normalized_view);

        normalized_image.is_finite().then_some(normalized_image)
    }
}

fn is_positive_size(size: Vec2) -> bool {
    size.is_finite() && size.x > 0.0 && size.y > 0.0
}
