use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YuvRange {
    Full,
    Video,
}

/// Raw encodings a camera frame can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Bi-planar 4:2:0: full-resolution luma plane, half-resolution interleaved CbCr plane.
    PlanarYuv420(YuvRange),
    /// One plane of B, G, R, A bytes per pixel.
    PackedBgra8,
    /// Anything else, identified by its four-character code. Never sampled.
    Other(u32),
}

impl PixelFormat {
    /// Minimum row length and row count of each plane, for formats we can decode.
    fn plane_layout(&self, width: usize, height: usize) -> Option<Vec<(usize, usize)>> {
        match self {
            PixelFormat::PlanarYuv420(_) => Some(vec![
                (width, height),
                (width.div_ceil(2) * 2, height.div_ceil(2)),
            ]),
            PixelFormat::PackedBgra8 => Some(vec![(width * 4, height)]),
            PixelFormat::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plane {
    pub bytes_per_row: usize,
    pub data: Vec<u8>,
}

impl Plane {
    pub fn new(bytes_per_row: usize, data: Vec<u8>) -> Self {
        Self {
            bytes_per_row,
            data,
        }
    }

    pub fn byte_at(&self, x: usize, y: usize) -> Option<u8> {
        self.data.get(self.offset(x, y)?).copied()
    }

    pub fn bytes_at(&self, x: usize, y: usize, len: usize) -> Option<&[u8]> {
        let start = self.offset(x, y)?;
        self.data.get(start..start.checked_add(len)?)
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        y.checked_mul(self.bytes_per_row)?.checked_add(x)
    }
}

/// Camera image storage shared between the frame producer and the sampler.
///
/// Plane contents are only reachable through [`PixelBuffer::read`] and
/// [`PixelBuffer::write`], whose guards release the buffer when dropped.
#[derive(Debug)]
pub struct PixelBuffer {
    format: PixelFormat,
    width: u32,
    height: u32,
    planes: RwLock<Vec<Plane>>,
}

impl PixelBuffer {
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        planes: Vec<Plane>,
    ) -> Result<Self, CaptureError> {
        if let Some(layout) = format.plane_layout(width as usize, height as usize) {
            if layout.len() != planes.len() {
                return Err(CaptureError::PlaneCount {
                    expected: layout.len(),
                    found: planes.len(),
                });
            }

            for (index, (plane, (minimum, rows))) in planes.iter().zip(layout).enumerate() {
                if plane.bytes_per_row < minimum {
                    return Err(CaptureError::RowTooShort {
                        plane: index,
                        bytes_per_row: plane.bytes_per_row,
                        minimum,
                    });
                }
                // an overflowing size can never be backed by `data`
                let required = plane.bytes_per_row.checked_mul(rows).unwrap_or(usize::MAX);
                if plane.data.len() < required {
                    return Err(CaptureError::PlaneTooSmall {
                        plane: index,
                        required,
                        actual: plane.data.len(),
                    });
                }
            }
        }

        Ok(Self {
            format,
            width,
            height,
            planes: RwLock::new(planes),
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn read(&self) -> PixelBufferReadGuard<'_> {
        PixelBufferReadGuard {
            planes: self.planes.read().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Exclusive access for a producer that recycles the buffer.
    pub fn write(&self) -> PixelBufferWriteGuard<'_> {
        PixelBufferWriteGuard {
            planes: self.planes.write().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

pub struct PixelBufferReadGuard<'a> {
    planes: RwLockReadGuard<'a, Vec<Plane>>,
}

impl PixelBufferReadGuard<'_> {
    pub fn plane(&self, index: usize) -> Option<&Plane> {
        self.planes.get(index)
    }
}

pub struct PixelBufferWriteGuard<'a> {
    planes: RwLockWriteGuard<'a, Vec<Plane>>,
}

impl PixelBufferWriteGuard<'_> {
    pub fn plane_mut(&mut self, index: usize) -> Option<&mut Plane> {
        self.planes.get_mut(index)
    }
}
