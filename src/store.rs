//! Saved trips on fjall
//!
//! Records are postcard-encoded under `trip:{id}`; a single `index` entry
//! keeps ids in insertion order so listing does not need a scan.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{Result, TripPlannerError};

const INDEX_KEY: &str = "index";

/// A generated trip document as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for generated trip documents
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// Persist a trip document under a fresh id
    async fn save(&self, details: &str) -> Result<TripRecord>;
    async fn get(&self, id: &str) -> Result<Option<TripRecord>>;
    /// All saved trips, newest first
    async fn list(&self) -> Result<Vec<TripRecord>>;
    /// Returns `false` when no trip had that id
    async fn delete(&self, id: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct TripStore {
    trips: Keyspace,
    // serialises read-modify-write of the index
    index_lock: Arc<Mutex<()>>,
}

fn trip_key(id: &str) -> String {
    format!("trip:{id}")
}

fn read(store: &Keyspace, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key.as_bytes())?.map(|v| v.to_vec()))
}

fn read_index(store: &Keyspace) -> anyhow::Result<Vec<String>> {
    match read(store, INDEX_KEY)? {
        Some(bytes) => postcard::from_bytes(&bytes).context("corrupt trip index"),
        None => Ok(Vec::new()),
    }
}

fn write_index(store: &Keyspace, ids: &[String]) -> anyhow::Result<()> {
    let bytes = postcard::to_stdvec(ids)?;
    store.insert(INDEX_KEY.as_bytes().to_vec(), bytes)?;
    Ok(())
}

fn store_error(e: anyhow::Error) -> TripPlannerError {
    TripPlannerError::store(format!("{e:#}"))
}

impl TripStore {
    /// Open (or create) the trip database under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let open = || -> anyhow::Result<Keyspace> {
            let db = fjall::Database::builder(path.as_ref()).open()?;
            Ok(db.keyspace("trips", fjall::KeyspaceCreateOptions::default)?)
        };
        let trips = open().map_err(store_error)?;
        info!("Trip store opened at {}", path.as_ref().display());
        Ok(Self {
            trips,
            index_lock: Arc::new(Mutex::new(())),
        })
    }

}

#[async_trait]
impl TripRepository for TripStore {
    #[instrument(skip_all)]
    async fn save(&self, details: &str) -> Result<TripRecord> {
        let record = TripRecord {
            id: Uuid::new_v4().to_string(),
            details: details.to_string(),
            created_at: Utc::now(),
        };

        let _guard = self.index_lock.lock().await;
        let store = self.trips.clone();
        let to_write = record.clone();
        task::spawn_blocking(move || -> anyhow::Result<()> {
            let bytes = postcard::to_stdvec(&to_write)?;
            store.insert(trip_key(&to_write.id).into_bytes(), bytes)?;
            let mut ids = read_index(&store)?;
            ids.push(to_write.id);
            write_index(&store, &ids)
        })
        .await
        .map_err(|e| TripPlannerError::store(format!("save task failed: {e}")))?
        .map_err(store_error)?;

        debug!("Saved trip {}", record.id);
        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<Option<TripRecord>> {
        let store = self.trips.clone();
        let key = trip_key(id);
        task::spawn_blocking(move || -> anyhow::Result<Option<TripRecord>> {
            match read(&store, &key)? {
                Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| TripPlannerError::store(format!("read task failed: {e}")))?
        .map_err(store_error)
    }

    async fn list(&self) -> Result<Vec<TripRecord>> {
        let store = self.trips.clone();
        task::spawn_blocking(move || -> anyhow::Result<Vec<TripRecord>> {
            let ids = read_index(&store)?;
            let mut records = Vec::with_capacity(ids.len());
            for id in ids.iter().rev() {
                if let Some(bytes) = read(&store, &trip_key(id))? {
                    records.push(postcard::from_bytes(&bytes)?);
                }
            }
            Ok(records)
        })
        .await
        .map_err(|e| TripPlannerError::store(format!("list task failed: {e}")))?
        .map_err(store_error)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.index_lock.lock().await;
        let store = self.trips.clone();
        let id = id.to_string();
        task::spawn_blocking(move || -> anyhow::Result<bool> {
            let key = trip_key(&id);
            if read(&store, &key)?.is_none() {
                return Ok(false);
            }
            store.remove(key.into_bytes())?;
            let mut ids = read_index(&store)?;
            ids.retain(|existing| existing != &id);
            write_index(&store, &ids)?;
            Ok(true)
        })
        .await
        .map_err(|e| TripPlannerError::store(format!("delete task failed: {e}")))?
        .map_err(store_error)
    }
}
