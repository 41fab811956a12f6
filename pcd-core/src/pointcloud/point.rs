use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// A world-space sample with the color read from the camera image.
// Positions are single precision because that is what the mesh buffers carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: Color,
}

impl ColoredPoint {
    pub fn new(position: [f32; 3], color: Color) -> Self {
        let [x, y, z] = position;
        Self { x, y, z, color }
    }

    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Read-only copy of a store's contents, in capture order.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    pub points: Vec<ColoredPoint>,
    pub metadata: Metadata,
}

impl PointCloud {
    pub fn new(points: Vec<ColoredPoint>) -> Self {
        let mut bounding_volume = BoundingVolume {
            min: [f32::MAX, f32::MAX, f32::MAX],
            max: [f32::MIN, f32::MIN, f32::MIN],
        };

        for point in &points {
            bounding_volume.max[0] = bounding_volume.max[0].max(point.x);
            bounding_volume.max[1] = bounding_volume.max[1].max(point.y);
            bounding_volume.max[2] = bounding_volume.max[2].max(point.z);
            bounding_volume.min[0] = bounding_volume.min[0].min(point.x);
            bounding_volume.min[1] = bounding_volume.min[1].min(point.y);
            bounding_volume.min[2] = bounding_volume.min[2].min(point.z);
        }

        if points.is_empty() {
            bounding_volume = BoundingVolume::default();
        }

        let metadata = Metadata {
            point_count: points.len(),
            bounding_volume,
        };

        PointCloud { points, metadata }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f32, f32, f32, &ColoredPoint)> {
        self.points
            .iter()
            .map(|point| (point.x, point.y, point.z, point))
    }
}

// Axis-aligned bounds of the captured positions. Zeroed for an empty cloud.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingVolume {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub point_count: usize,
    pub bounding_volume: BoundingVolume,
}
