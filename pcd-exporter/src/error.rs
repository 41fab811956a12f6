use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("point cloud is empty, nothing to export")]
    EmptyCloud,

    #[error("export was cancelled")]
    Cancelled,

    #[error("failed to write point cloud: {0}")]
    Io(#[from] std::io::Error),
}
