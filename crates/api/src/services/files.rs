//! File storage seam for image bytes.
//!
//! The image ledger records metadata only; the bytes go through this trait.
//! [`LocalFileStore`] writes beneath a configured root directory, one
//! subdirectory per product.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use emporium_core::ProductId;

/// Byte storage for product images.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store bytes under the given product and stored file name.
    async fn store(
        &self,
        product_id: ProductId,
        file_name: &str,
        bytes: &[u8],
    ) -> io::Result<()>;

    /// Load stored bytes; `None` if the file does not exist.
    async fn load(&self, product_id: ProductId, file_name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Delete stored bytes. Deleting a missing file is not an error.
    async fn delete(&self, product_id: ProductId, file_name: &str) -> io::Result<()>;
}

/// [`FileStore`] that writes to the local filesystem.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn product_dir(&self, product_id: ProductId) -> PathBuf {
        self.root.join("products").join(product_id.to_string())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        product_id: ProductId,
        file_name: &str,
        bytes: &[u8],
    ) -> io::Result<()> {
        let dir = self.product_dir(product_id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(file_name), bytes).await?;
        tracing::info!(product_id = %product_id, file_name, "stored image file");
        Ok(())
    }

    async fn load(&self, product_id: ProductId, file_name: &str) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.product_dir(product_id).join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, product_id: ProductId, file_name: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.product_dir(product_id).join(file_name)).await {
            Ok(()) => {
                tracing::info!(product_id = %product_id, file_name, "deleted image file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory [`FileStore`] used by the test suite.
#[derive(Default)]
pub struct MemoryFileStore {
    files: std::sync::Mutex<std::collections::HashMap<(i64, String), Vec<u8>>>,
}

impl MemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files, for assertions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, std::collections::HashMap<(i64, String), Vec<u8>>> {
        self.files
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn store(
        &self,
        product_id: ProductId,
        file_name: &str,
        bytes: &[u8],
    ) -> io::Result<()> {
        self.lock()
            .insert((product_id.as_i64(), file_name.to_owned()), bytes.to_vec());
        Ok(())
    }

    async fn load(&self, product_id: ProductId, file_name: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self
            .lock()
            .get(&(product_id.as_i64(), file_name.to_owned()))
            .cloned())
    }

    async fn delete(&self, product_id: ProductId, file_name: &str) -> io::Result<()> {
        self.lock()
            .remove(&(product_id.as_i64(), file_name.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path().to_path_buf());
        let product = ProductId::new(7);

        store.store(product, "a.png", b"bytes").await.unwrap();
        assert_eq!(
            store.load(product, "a.png").await.unwrap(),
            Some(b"bytes".to_vec())
        );

        store.delete(product, "a.png").await.unwrap();
        assert_eq!(store.load(product, "a.png").await.unwrap(), None);

        // Deleting again is not an error
        store.delete(product, "a.png").await.unwrap();
    }
}
