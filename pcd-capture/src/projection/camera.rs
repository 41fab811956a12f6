use glam::{Affine2, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::projection::display::{display_transform, Orientation};

/// Pinhole intrinsics in sensor-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

impl CameraIntrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }
}

/// Pose and intrinsics of the camera that captured a frame.
///
/// `transform` is camera-to-world. Camera space looks down -Z with +Y up;
/// image rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub transform: Mat4,
    pub intrinsics: CameraIntrinsics,
}

impl CameraParams {
    pub fn new(transform: Mat4, intrinsics: CameraIntrinsics) -> Self {
        Self {
            transform,
            intrinsics,
        }
    }

    pub fn world_to_camera(&self) -> Mat4 {
        self.transform.inverse()
    }

    pub fn to_camera_space(&self, world: Vec3) -> Vec3 {
        self.world_to_camera().transform_point3(world)
    }

    /// Projects a camera-space point onto the sensor image, in pixels.
    pub fn project_to_image(&self, camera: Vec3) -> Vec2 {
        let depth = -camera.z;
        let k = &self.intrinsics;
        Vec2::new(
            k.fx * (camera.x / depth) + k.cx,
            k.fy * (-camera.y / depth) + k.cy,
        )
    }

    /// Projects a world point to on-screen pixel coordinates of a viewport
    /// showing this camera's image in `orientation`.
    ///
    /// No clipping happens here: points at the camera center come out
    /// non-finite, and points behind the camera are mirrored.
    pub fn project_point(
        &self,
        world: Vec3,
        image_resolution: Vec2,
        orientation: Orientation,
        viewport_size: Vec2,
    ) -> Vec2 {
        let display = display_transform(orientation, image_resolution, viewport_size);
        self.project_to_viewport(
            self.to_camera_space(world),
            image_resolution,
            display,
            viewport_size,
        )
    }

    /// Same as [`CameraParams::project_point`] for a point already in camera
    /// space and a precomputed display transform.
    pub fn project_to_viewport(
        &self,
        camera: Vec3,
        image_resolution: Vec2,
        display: Affine2,
        viewport_size: Vec2,
    ) -> Vec2 {
        let normalized_image = self.project_to_image(camera) / image_resolution;
        display.transform_point2(normalized_image) * viewport_size
    }
}
