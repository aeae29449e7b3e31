pub mod local_store;
pub mod store;

pub use local_store::{LocalFileBlobStore, WriteMode};
pub use store::{BlobStore, StoreError, StoreResult};
