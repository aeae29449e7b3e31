use async_trait::async_trait;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No blob stored for {id}")]
    NotFound { id: String },

    #[error("Storage root {} is not a directory", path.display())]
    InvalidRoot { path: std::path::PathBuf },

    #[error("I/O failure on blob {id}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn from_read(id: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound { id: id.to_string() }
        } else {
            StoreError::Io { id: id.to_string(), source }
        }
    }
}

/// Persists whole blobs by id. There is no locking: the last completed write wins.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `id`, replacing anything already there.
    async fn save(&self, id: &str, data: &[u8]) -> StoreResult<()>;

    /// Reads back the full blob stored under `id`.
    async fn load(&self, id: &str) -> StoreResult<Vec<u8>>;
}
