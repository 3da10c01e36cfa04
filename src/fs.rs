use async_trait::async_trait;

use crate::Error;

/// An object that can be used to get and put blobs.
#[async_trait]
pub trait BlobStorageProvider: Send + Sync {
    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, Error>;
    async fn put(&self, blob_name: &str, contents: &[u8]) -> Result<(), Error>;
}

/// A [`BlobStorageProvider`] for local disk, relative to `root`
pub struct LocalDisk {
    pub root: std::path::PathBuf,
}

impl Default for LocalDisk {
    fn default() -> Self {
        Self {
            root: "database".into(),
        }
    }
}

#[async_trait]
impl BlobStorageProvider for LocalDisk {
    async fn maybe_get(&self, blob_name: &str) -> Result<Option<Vec<u8>>, Error> {
        let path = self.root.join(blob_name);
        if path.try_exists()? {
            Ok(Some(std::fs::read(path)?))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, blob_name: &str, contents: &[u8]) -> Result<(), Error> {
        let path = self.root.join(blob_name);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Returns `blob_name` from `provider`. If it does not exist,
/// it awaits `fetch` and writes the result into `provider`.
pub async fn cached<F, P>(blob_name: &str, fetch: F, provider: &P) -> Result<Vec<u8>, Error>
where
    F: futures::Future<Output = Result<Vec<u8>, Error>>,
    P: BlobStorageProvider + ?Sized,
{
    if let Some(data) = provider.maybe_get(blob_name).await? {
        log::info!("{blob_name} - cache hit");
        return Ok(data);
    }
    log::info!("{blob_name} - cache miss");
    let contents = fetch.await?;
    provider.put(blob_name, &contents).await?;
    log::info!("{blob_name} - cache write");
    Ok(contents)
}
