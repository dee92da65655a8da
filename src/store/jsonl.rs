//! JSONL (JSON Lines) record store.
//!
//! One file per collection under a data directory, e.g. `data/raw_data.jsonl`.
//! Each line is a JSON object; an `id` field, when present, is the document id.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use super::{Collection, Document, RecordStore, StoreError};
use crate::models::{parse_timestamp, EntityId, WeekRange};

/// File-backed store for local development and fixtures.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    data_dir: PathBuf,
}

impl JsonlStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.filename())
    }

    /// Read every document of a collection. A missing file is an empty collection.
    async fn read_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let path = self.path_for(collection);
        if !path.exists() {
            debug!("No file for {} at {:?}", collection.name(), path);
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path).await?;
        let mut documents = Vec::new();

        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut data = match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    warn!("Line {} in {:?} is not a JSON object", idx + 1, path);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, path, e);
                    continue;
                }
            };

            let id = match data.remove("id") {
                Some(Value::String(s)) if !s.is_empty() => s,
                Some(Value::Number(n)) => n.to_string(),
                _ => EntityId::generate(&[collection.name(), line]).into_string(),
            };

            documents.push(Document::new(id, data));
        }

        debug!("Read {} documents from {:?}", documents.len(), path);
        Ok(documents)
    }
}

#[async_trait]
impl RecordStore for JsonlStore {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        self.read_documents(collection).await
    }

    async fn query_date_range(
        &self,
        collection: Collection,
        field: &str,
        range: &WeekRange,
    ) -> Result<Vec<Document>, StoreError> {
        let documents = self.read_documents(collection).await?;

        Ok(documents
            .into_iter()
            .filter(|d| {
                d.data
                    .get(field)
                    .and_then(parse_timestamp)
                    .is_some_and(|ts| range.contains(&ts))
            })
            .collect())
    }
}
