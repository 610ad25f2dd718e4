use thiserror::Error;

/// Reasons a race could not be set up from a content source
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("content unavailable: {0}")]
    Unavailable(String),
    #[error("unknown content source: {0}")]
    UnknownSource(String),
    #[error("no typeable text left after filtering")]
    EmptyAfterFilter,
    #[error("passage collection is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures talking to the persisted record or the history export
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
