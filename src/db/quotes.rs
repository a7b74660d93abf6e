use crate::models::quotes::{Quote, QuoteRecord};
use log::info;
use sled::{Db, Tree};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug)]
pub enum QuoteDbError {
    #[error("Sled DB error: {0}")]
    SledError(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Blocking task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

const QUOTES_TREE_NAME: &str = "quotes";

#[derive(Clone)]
struct Handle {
    db: Db,
    tree: Tree,
}

/// Record that has an id and encoded bytes but is not written yet.
#[derive(Debug)]
pub struct PreparedRecord {
    pub record: QuoteRecord,
    bytes: Vec<u8>,
}

/// Append-only sled store, one `quotes` tree entry per persisted quote.
///
/// The database is opened on first use. A failed open is not cached, so the
/// next call tries again.
pub struct QuoteStore {
    path: PathBuf,
    handle: OnceCell<Handle>,
}

fn open_db(path: &Path) -> Result<Handle, QuoteDbError> {
    let db = sled::open(path)?;
    let tree = db.open_tree(QUOTES_TREE_NAME)?;

    Ok(Handle { db, tree })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl QuoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        QuoteStore {
            path: path.into(),
            handle: OnceCell::new(),
        }
    }

    async fn handle(&self) -> Result<&Handle, QuoteDbError> {
        self.handle
            .get_or_try_init(|| async move {
                let path = self.path.clone();
                let handle = tokio::task::spawn_blocking(move || open_db(&path)).await??;

                info!("opened quote store at {}", self.path.display());

                Ok::<Handle, QuoteDbError>(handle)
            })
            .await
    }

    /// Opens the database and the `quotes` tree if not already open.
    pub async fn open(&self) -> Result<(), QuoteDbError> {
        self.handle().await.map(|_| ())
    }

    /// Assigns an id and encodes the record without touching the tree.
    pub async fn prepare(&self, quote: &Quote) -> Result<PreparedRecord, QuoteDbError> {
        let handle = self.handle().await?;
        let record = QuoteRecord {
            id: handle.db.generate_id()?,
            quote: quote.clone(),
            created_at: now_millis(),
            deleted_at: None,
        };
        let bytes = serde_json::to_vec(&record)?;

        Ok(PreparedRecord { record, bytes })
    }

    /// Inserts a prepared record and flushes it to disk.
    pub async fn write(&self, prepared: PreparedRecord) -> Result<u64, QuoteDbError> {
        let handle = self.handle().await?.clone();
        let id = prepared.record.id;

        tokio::task::spawn_blocking(move || -> Result<(), QuoteDbError> {
            handle.tree.insert(id.to_be_bytes(), prepared.bytes)?;
            handle.tree.flush()?;

            Ok(())
        })
        .await??;

        Ok(id)
    }

    /// All records in id order.
    pub async fn records(&self) -> Result<Vec<QuoteRecord>, QuoteDbError> {
        let tree = self.handle().await?.tree.clone();

        tokio::task::spawn_blocking(move || {
            tree.iter()
                .values()
                .map(|value| -> Result<QuoteRecord, QuoteDbError> {
                    Ok(serde_json::from_slice(&value?)?)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await?
    }

    pub async fn len(&self) -> Result<usize, QuoteDbError> {
        Ok(self.handle().await?.tree.len())
    }
}
