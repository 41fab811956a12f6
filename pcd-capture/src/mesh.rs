use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

const VERTEX_SIZE: usize = std::mem::size_of::<[f32; 3]>();

/// Geometry of one mesh anchor after an add or update event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshUpdate {
    /// Vertex positions in the anchor's local frame.
    pub vertices: Vec<Vec3>,
    pub anchor_to_world: Mat4,
}

impl MeshUpdate {
    pub fn new(vertices: Vec<Vec3>, anchor_to_world: Mat4) -> Self {
        Self {
            vertices,
            anchor_to_world,
        }
    }

    /// Decodes `count` vertices of three native-endian `f32`s from a strided
    /// buffer, the first one starting at `offset`.
    pub fn from_raw(
        bytes: &[u8],
        offset: usize,
        stride: usize,
        count: usize,
        anchor_to_world: Mat4,
    ) -> Result<Self, CaptureError> {
        if stride < VERTEX_SIZE {
            return Err(CaptureError::InvalidStride(stride));
        }

        let vertices = (0..count)
            .map(|index| {
                let start = index
                    .checked_mul(stride)
                    .and_then(|step| step.checked_add(offset));
                let end = start.and_then(|start| start.checked_add(VERTEX_SIZE));
                let raw = start
                    .zip(end)
                    .and_then(|(start, end)| bytes.get(start..end))
                    .ok_or(CaptureError::VertexBufferOutOfRange {
                        index,
                        end: end.unwrap_or(usize::MAX),
                        len: bytes.len(),
                    })?;
                Ok(Vec3::from_array(bytemuck::pod_read_unaligned::<[f32; 3]>(raw)))
            })
            .collect::<Result<Vec<_>, CaptureError>>()?;

        Ok(Self::new(vertices, anchor_to_world))
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn world_vertex(&self, local: Vec3) -> Vec3 {
        self.anchor_to_world.transform_point3(local)
    }
}
