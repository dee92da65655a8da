//! Firestore REST backend.
//!
//! Full scans page through `GET .../documents/{collection}`; date-bounded reads
//! go through `:runQuery` with a pair of field filters on the date field.
//! Firestore wraps every value in a type tag (`{"integerValue": "3"}`), which
//! is unwrapped into plain JSON before documents leave this module.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};
use tracing::{debug, warn};

use super::{Collection, Document, RecordStore, StoreError};
use crate::config::StoreConfig;
use crate::models::WeekRange;

/// Firestore document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    /// Full resource name: `projects/{p}/databases/{d}/documents/{collection}/{id}`
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

/// One element of a `runQuery` response stream. Elements without a
/// document only carry progress metadata.
#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Record store backed by a Firestore database.
pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    api_key: Option<String>,
    auth_token: Option<String>,
    page_size: u32,
}

impl FirestoreStore {
    /// Fails with [`StoreError::NotConfigured`] before touching the network
    /// when the project id or every credential is missing.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let project_id = present(config.project_id.as_deref()).ok_or_else(|| {
            StoreError::NotConfigured(
                "Firestore project id is not set (store.project_id or FIRESTORE_PROJECT_ID)"
                    .to_string(),
            )
        })?;

        let api_key = present(config.api_key.as_deref()).map(str::to_string);
        let auth_token = present(config.auth_token.as_deref()).map(str::to_string);
        if api_key.is_none() && auth_token.is_none() {
            return Err(StoreError::NotConfigured(
                "No Firestore credentials (set FIRESTORE_API_KEY or FIRESTORE_AUTH_TOKEN)"
                    .to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            config.base_url.trim_end_matches('/'),
            project_id,
            config.database
        );

        Ok(Self {
            client,
            documents_url,
            api_key,
            auth_token,
            page_size: config.page_size,
        })
    }

    pub fn documents_url(&self) -> &str {
        &self.documents_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        };
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl RecordStore for FirestoreStore {
    fn name(&self) -> &'static str {
        "firestore"
    }

    async fn list_documents(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}/{}", self.documents_url, collection.name());
        let page_size = self.page_size.to_string();
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("pageSize", page_size.as_str())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            debug!("Listing {} from Firestore", collection.name());
            let response = check_status(self.authorize(request).send().await?).await?;
            let page: ListDocumentsResponse = response.json().await?;

            documents.extend(page.documents.into_iter().map(into_document));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(
            "Fetched {} documents from {}",
            documents.len(),
            collection.name()
        );
        Ok(documents)
    }

    async fn query_date_range(
        &self,
        collection: Collection,
        field: &str,
        range: &WeekRange,
    ) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url);
        let body = structured_query(collection, field, range);

        debug!(
            "Querying {} where {} in [{}, {}]",
            collection.name(),
            field,
            range.start,
            range.end
        );
        let request = self.client.post(&url).json(&body);
        let response = check_status(self.authorize(request).send().await?).await?;
        let items: Vec<RunQueryItem> = response.json().await?;

        let documents: Vec<Document> = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(into_document)
            .collect();

        debug!(
            "Fetched {} documents from {}",
            documents.len(),
            collection.name()
        );
        Ok(documents)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Turn non-2xx responses into [`StoreError::HttpStatus`], preferring the
/// message from Firestore's error envelope.
async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown").to_string());

    Err(StoreError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

/// Build the `runQuery` body for an inclusive date range.
fn structured_query(collection: Collection, field: &str, range: &WeekRange) -> Value {
    let bound = |op: &str, ts: &chrono::DateTime<chrono::Utc>| {
        json!({
            "fieldFilter": {
                "field": { "fieldPath": field },
                "op": op,
                "value": { "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Millis, true) }
            }
        })
    };

    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection.name() }],
            "where": {
                "compositeFilter": {
                    "op": "AND",
                    "filters": [
                        bound("GREATER_THAN_OR_EQUAL", &range.start),
                        bound("LESS_THAN_OR_EQUAL", &range.end),
                    ]
                }
            }
        }
    })
}

fn into_document(doc: FirestoreDocument) -> Document {
    let id = document_id(&doc.name).to_string();
    Document::new(id, decode_fields(&doc.fields))
}

/// Last path segment of a document resource name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

/// Unwrap one typed Firestore value into plain JSON.
///
/// Timestamps stay RFC 3339 strings, references become their resource path,
/// geo points become `{latitude, longitude}`.
fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };
    let Some((tag, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match tag.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" | "geoPointValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(Number::from(n)))
                .unwrap_or_else(|_| {
                    warn!("Unparseable Firestore integer: {}", s);
                    Value::Null
                }),
            other => other.clone(),
        },
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default();
            Value::Object(fields)
        }
        "arrayValue" => {
            let values: Vec<Value> = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|vs| vs.iter().map(decode_value).collect())
                .unwrap_or_default();
            Value::Array(values)
        }
        other => {
            warn!("Unknown Firestore value type: {}", other);
            Value::Null
        }
    }
}
