//! Read access to the record store.
//!
//! The aggregator only needs two kinds of reads:
//! - a full scan of a collection
//! - a scan of a collection bounded by an inclusive date range on one field
//!
//! Backends implement [`RecordStore`] and hand back raw [`Document`]s; typed
//! decoding happens here so every backend shares the same field semantics.

pub mod firestore;
pub mod jsonl;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::models::WeekRange;

pub use firestore::FirestoreStore;
pub use jsonl::JsonlStore;

/// Errors that can occur while reading from the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store is not configured: {0}")]
    NotConfigured(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to decode {collection}/{id}: {message}")]
    Decode {
        collection: &'static str,
        id: String,
        message: String,
    },
}

/// Collections the leaderboard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    RawData,
    Agents,
    Depots,
    Companies,
    Platoons,
}

impl Collection {
    /// Collection name in the store.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::RawData => "raw_data",
            Collection::Agents => "agents",
            Collection::Depots => "depots",
            Collection::Companies => "companies",
            Collection::Platoons => "platoons",
        }
    }

    /// File name used by the JSONL backend.
    pub fn filename(&self) -> String {
        format!("{}.jsonl", self.name())
    }
}

/// A raw document: its identifier plus untyped fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Decode into a typed model. The document id is exposed as an `id` field,
    /// overriding any stored field of that name.
    pub fn decode<T: DeserializeOwned>(&self, collection: Collection) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id.clone()));

        serde_json::from_value(Value::Object(data)).map_err(|e| StoreError::Decode {
            collection: collection.name(),
            id: self.id.clone(),
            message: e.to_string(),
        })
    }
}

/// Decode a batch of documents, failing on the first bad one.
pub fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    documents: &[Document],
) -> Result<Vec<T>, StoreError> {
    documents.iter().map(|d| d.decode(collection)).collect()
}

/// Read interface to a document store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Every document in a collection.
    async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Documents whose `field` timestamp lies within `range`, inclusive.
    async fn query_date_range(
        &self,
        collection: Collection,
        field: &str,
        range: &WeekRange,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Build the configured store backend.
pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    match config.backend {
        StoreBackend::Jsonl => Ok(Arc::new(JsonlStore::new(config.data_dir.clone()))),
        StoreBackend::Firestore => Ok(Arc::new(FirestoreStore::new(config)?)),
    }
}
