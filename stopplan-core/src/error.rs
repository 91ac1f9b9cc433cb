use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid node index")]
    InvalidNodeIndex,
    #[error("Road network has no nodes")]
    EmptyNetwork,
    #[error("Invalid placement parameters: {0}")]
    InvalidParams(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Coverage violation: {0}")]
    CoverageViolation(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
