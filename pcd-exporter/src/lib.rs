pub mod config;
pub mod error;
pub mod ply;

pub use config::ExportConfig;
pub use error::ExportError;
pub use ply::{write_ply, CancelToken, Exporter};
