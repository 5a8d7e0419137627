use thiserror::Error;

/// Failure reported by a capability provider (camera, filesystem, store, fetcher).
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("cancelled by user")]
    Cancelled,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Failed to capture photo: {0}")]
    CaptureFailed(#[source] ProviderError),

    #[error("Failed to write file {path}: {source}")]
    FileWriteFailed { path: String, source: ProviderError },

    #[error("Failed to read file {path}: {source}")]
    FileReadFailed { path: String, source: ProviderError },

    #[error("Failed to delete file {path}: {source}")]
    FileDeleteFailed { path: String, source: ProviderError },

    #[error("Failed to read key {key} from store: {source}")]
    StoreReadFailed { key: String, source: ProviderError },

    #[error("Failed to write key {key} to store: {source}")]
    StoreWriteFailed { key: String, source: ProviderError },

    #[error("Stored photo list under {key} is malformed: {source}")]
    MalformedPersistedList {
        key: String,
        source: serde_json::Error,
    },

    #[error("Failed to read captured image {uri}: {reason}")]
    BlobReadFailed { uri: String, reason: String },

    #[error("Failed to serialize photo list: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GalleryError>;
