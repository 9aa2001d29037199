use std::io;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("json error at line {line}: {source}")]
    JsonLine {
        line: usize,
        source: serde_json::Error,
    },

    #[error("unsupported transcript document: {0}")]
    UnsupportedDocument(&'static str),

    #[error("unknown event type: {0}")]
    UnknownEventKind(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
