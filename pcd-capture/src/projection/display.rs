use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// On-screen interface orientation. The image sensor is natively landscape-right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl Orientation {
    pub fn is_portrait(&self) -> bool {
        matches!(self, Orientation::Portrait | Orientation::PortraitUpsideDown)
    }

    // Maps normalized sensor coordinates onto the unit square as seen on screen.
    fn rotation(&self) -> Affine2 {
        match self {
            Orientation::LandscapeRight => Affine2::IDENTITY,
            // (u, v) -> (1 - u, 1 - v)
            Orientation::LandscapeLeft => Affine2::from_cols(
                Vec2::new(-1.0, 0.0),
                Vec2::new(0.0, -1.0),
                Vec2::new(1.0, 1.0),
            ),
            // (u, v) -> (1 - v, u)
            Orientation::Portrait => Affine2::from_cols(
                Vec2::new(0.0, 1.0),
                Vec2::new(-1.0, 0.0),
                Vec2::new(1.0, 0.0),
            ),
            // (u, v) -> (v, 1 - u)
            Orientation::PortraitUpsideDown => Affine2::from_cols(
                Vec2::new(0.0, -1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
            ),
        }
    }
}

/// Transform from normalized image-buffer coordinates to normalized view
/// coordinates for a viewport showing the image aspect-filled.
///
/// Invert it to go from a point on screen back into the sensor buffer.
pub fn display_transform(
    orientation: Orientation,
    image_resolution: Vec2,
    viewport_size: Vec2,
) -> Affine2 {
    let rotated = if orientation.is_portrait() {
        Vec2::new(image_resolution.y, image_resolution.x)
    } else {
        image_resolution
    };

    // aspect fill: the image covers the viewport, overflow is cropped equally on both sides
    let fill = (viewport_size.x / rotated.x).max(viewport_size.y / rotated.y);
    let scale = rotated * fill / viewport_size;
    let crop = Affine2::from_cols(
        Vec2::new(scale.x, 0.0),
        Vec2::new(0.0, scale.y),
        (Vec2::ONE - scale) * 0.5,
    );

    crop * orientation.rotation()
}
