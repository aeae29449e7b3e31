use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::store::{BlobStore, StoreError, StoreResult};

const BLOB_EXTENSION: &str = "json";
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);
#[cfg(unix)]
const OWNER_READ_WRITE: u32 = 0o600;

/// How `save` replaces the contents of an existing blob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate the target and write into it. A concurrent reader may see an
    /// empty or partially written file.
    #[default]
    InPlace,
    /// Write a hidden temp file next to the target, then rename it over the target.
    AtomicRename,
}

/// Stores each blob as `<id>.json` directly under `base_path`.
///
/// Ids are joined onto the base path as-is, so callers must only hand in ids
/// that cannot contain path separators.
#[derive(Clone, Debug)]
pub struct LocalFileBlobStore {
    base_path: PathBuf,
    write_mode: WriteMode,
}

impl LocalFileBlobStore {
    pub fn new(base_path: impl Into<PathBuf>, write_mode: WriteMode) -> Self {
        Self { base_path: base_path.into(), write_mode }
    }

    /// Like `new`, but fails unless `base_path` is an existing directory.
    pub async fn open(base_path: impl Into<PathBuf>, write_mode: WriteMode) -> StoreResult<Self> {
        let base_path = base_path.into();
        match fs::metadata(&base_path).await {
            Ok(meta) if meta.is_dir() => Ok(Self::new(base_path, write_mode)),
            _ => Err(StoreError::InvalidRoot { path: base_path }),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    fn blob_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{id}.{BLOB_EXTENSION}"))
    }

    /// Unique per process and per call, so concurrent saves of one id never share a temp file.
    fn temp_path(&self, id: &str) -> PathBuf {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.base_path
            .join(format!(".{id}.{BLOB_EXTENSION}.{}-{seq}.tmp", std::process::id()))
    }

    async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(OWNER_READ_WRITE);
        let mut file = options.open(path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn write_atomically(&self, id: &str, data: &[u8]) -> std::io::Result<()> {
        let temp = self.temp_path(id);
        let written = async {
            Self::write_file(&temp, data).await?;
            fs::rename(&temp, self.blob_path(id)).await
        }
        .await;
        if written.is_err() {
            // best effort, the write error is the one reported
            let _ = fs::remove_file(&temp).await;
        }
        written
    }
}

#[async_trait]
impl BlobStore for LocalFileBlobStore {
    async fn save(&self, id: &str, data: &[u8]) -> StoreResult<()> {
        let written = match self.write_mode {
            WriteMode::InPlace => Self::write_file(&self.blob_path(id), data).await,
            WriteMode::AtomicRename => self.write_atomically(id, data).await,
        };
        written.map_err(|source| StoreError::Io { id: id.to_string(), source })?;
        tracing::debug!("saved blob {} ({} bytes)", id, data.len());
        Ok(())
    }

    async fn load(&self, id: &str) -> StoreResult<Vec<u8>> {
        fs::read(self.blob_path(id))
            .await
            .map_err(|e| StoreError::from_read(id, e))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_blob() {
        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path(), WriteMode::InPlace);

        let data = b"test data";
        blob_store.save("test-blob", data).await.unwrap();

        // The blob lands in <id>.json under the base path, unwrapped.
        let on_disk = std::fs::read(temp_dir.path().join("test-blob.json")).unwrap();
        assert_eq!(on_disk, data);
        assert_eq!(blob_store.load("test-blob").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_save_blob_overwrite() {
        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path(), WriteMode::InPlace);

        blob_store.save("doc", b"a much longer first body").await.unwrap();
        blob_store.save("doc", b"short").await.unwrap();

        assert_eq!(blob_store.load("doc").await.unwrap(), b"short");
    }

    #[tokio::test]
    async fn test_empty_and_binary_blobs() {
        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path(), WriteMode::InPlace);

        blob_store.save("empty", b"").await.unwrap();
        assert!(blob_store.load("empty").await.unwrap().is_empty());

        let binary = vec![0xff, 0x00, 0xfe, 0xc3, 0x28];
        blob_store.save("binary", &binary).await.unwrap();
        assert_eq!(blob_store.load("binary").await.unwrap(), binary);
    }

    #[tokio::test]
    async fn test_load_missing_blob() {
        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path(), WriteMode::InPlace);

        match blob_store.load("nope").await {
            Err(StoreError::NotFound { id }) => assert_eq!(id, "nope"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_into_missing_root_is_io_error() {
        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path().join("gone"), WriteMode::InPlace);

        assert!(matches!(
            blob_store.save("doc", b"x").await,
            Err(StoreError::Io { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_blob_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path(), WriteMode::InPlace);
        blob_store.save("private", b"secret").await.unwrap();

        let meta = std::fs::metadata(temp_dir.path().join("private.json")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_atomic_rename_leaves_only_the_blob() {
        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path(), WriteMode::AtomicRename);

        blob_store.save("doc", b"first").await.unwrap();
        blob_store.save("doc", b"second").await.unwrap();
        assert_eq!(blob_store.load("doc").await.unwrap(), b"second");

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["doc.json".to_string()]);
    }

    #[test]
    fn test_temp_paths_are_distinct_hidden_siblings() {
        let blob_store = LocalFileBlobStore::new("/store", WriteMode::AtomicRename);
        let first = blob_store.temp_path("doc");
        let second = blob_store.temp_path("doc");

        assert_ne!(first, second);
        for temp in [&first, &second] {
            assert_eq!(temp.parent(), Some(Path::new("/store")));
            let name = temp.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with(".doc.json."), "{name}");
            assert!(name.ends_with(".tmp"), "{name}");
        }
    }

    #[tokio::test]
    async fn test_concurrent_atomic_saves_of_one_id() {
        let temp_dir = tempdir().unwrap();
        let blob_store = LocalFileBlobStore::new(temp_dir.path(), WriteMode::AtomicRename);

        let (a, b) = tokio::join!(blob_store.save("doc", b"aaaa"), blob_store.save("doc", b"bbbb"));
        a.unwrap();
        b.unwrap();

        // Last writer wins, but the result is always one whole body.
        let stored = blob_store.load("doc").await.unwrap();
        assert!(stored == b"aaaa" || stored == b"bbbb");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_open_requires_directory() {
        let temp_dir = tempdir().unwrap();
        assert!(LocalFileBlobStore::open(temp_dir.path(), WriteMode::InPlace).await.is_ok());

        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            LocalFileBlobStore::open(&missing, WriteMode::InPlace).await,
            Err(StoreError::InvalidRoot { .. })
        ));

        let file = temp_dir.path().join("plain-file");
        std::fs::write(&file, b"").unwrap();
        assert!(matches!(
            LocalFileBlobStore::open(&file, WriteMode::InPlace).await,
            Err(StoreError::InvalidRoot { .. })
        ));
    }
}
