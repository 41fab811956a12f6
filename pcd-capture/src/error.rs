use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("pixel format expects {expected} planes, got {found}")]
    PlaneCount { expected: usize, found: usize },

    #[error("plane {plane}: rows of {bytes_per_row} bytes, at least {minimum} needed")]
    RowTooShort {
        plane: usize,
        bytes_per_row: usize,
        minimum: usize,
    },

    #[error("plane {plane}: {actual} bytes available, {required} required")]
    PlaneTooSmall {
        plane: usize,
        required: usize,
        actual: usize,
    },

    #[error("vertex stride {0} is smaller than one vertex (12 bytes)")]
    InvalidStride(usize),

    #[error("vertex {index} ends at byte {end}, past the buffer length {len}")]
    VertexBufferOutOfRange {
        index: usize,
        end: usize,
        len: usize,
    },
}
