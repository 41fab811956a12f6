pub mod error;
pub mod frame;
pub mod ingest;
pub mod mesh;
pub mod projection;
pub mod sampler;
pub mod session;

pub use error::CaptureError;
pub use frame::{FrameCache, FrameSnapshot, PixelBuffer, PixelFormat, Plane, YuvRange};
pub use ingest::{IngestConfig, MeshIngestor};
pub use mesh::MeshUpdate;
pub use projection::{CameraIntrinsics, CameraParams, Orientation, Projector};
pub use sampler::PixelSampler;
pub use session::{spawn_session_worker, ScanSession, SessionEvent};
