//! TTL cache on fjall, used to remember driving routes between districts

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl PersistentCache {
    /// Open (or create) the cache database under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(path.as_ref()).open()?;
        let items = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(PersistentCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = now_secs()?
            .checked_add(ttl.as_secs())
            .ok_or(anyhow!("TTL overflow"))?;
        let bytes = postcard::to_stdvec(&StoredEntry { value, expires_at })?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        if now_secs()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}
