use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::MetricStoreConfig;

/// Per-search-term popularity aggregate, as stored in the `metrics` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    #[serde(rename = "averageRating", default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub category: Vec<u32>,
    #[serde(
        rename = "$updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Attributes of a metric document that does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMetric {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    #[serde(rename = "averageRating")]
    pub average_rating: f64,
    pub poster_url: Option<String>,
    pub category: Vec<u32>,
}

/// Fields overwritten when a term is searched again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPatch {
    pub count: u64,
    pub category: Vec<u32>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("metric document {0} not found")]
    NotFound(String),
}

/// Document collection holding the search-count metrics.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// First document whose `searchTerm` equals `term` exactly.
    async fn find_by_term(&self, term: &str) -> Result<Option<MetricDocument>, StoreError>;

    /// Up to `limit` documents ordered by `count`, highest first.
    async fn top_by_count(&self, limit: usize) -> Result<Vec<MetricDocument>, StoreError>;

    async fn create(&self, metric: NewMetric) -> Result<MetricDocument, StoreError>;

    async fn update(&self, id: &str, patch: MetricPatch) -> Result<MetricDocument, StoreError>;
}

/// Appwrite list query clause, sent as a JSON string in `queries[]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(&'static str, String),
    OrderDesc(&'static str),
    Limit(usize),
}

impl Query {
    pub fn to_json(&self) -> String {
        let value = match self {
            Query::Equal(attribute, value) => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Query::OrderDesc(attribute) => json!({ "method": "orderDesc", "attribute": attribute }),
            Query::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
        };
        value.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<MetricDocument>,
}

/// Metric store backed by the Appwrite databases REST API.
#[derive(Debug, Clone)]
pub struct AppwriteMetricStore {
    http: reqwest::Client,
    config: MetricStoreConfig,
}

impl AppwriteMetricStore {
    pub fn new(http: reqwest::Client, config: MetricStoreConfig) -> Self {
        Self { http, config }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint.trim_end_matches('/'),
            self.config.database_id,
            self.config.collection_id
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header("X-Appwrite-Project", &self.config.project_id);
        match &self.config.api_key {
            Some(key) => builder.header("X-Appwrite-Key", key),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: String,
        builder: RequestBuilder,
    ) -> Result<T, StoreError> {
        debug!(%url, "calling metric store");
        let resp = builder.send().await.map_err(|source| StoreError::Network {
            url: url.clone(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { url, status, body });
        }

        resp.json::<T>()
            .await
            .map_err(|source| StoreError::Decode { url, source })
    }

    async fn list(&self, queries: &[Query]) -> Result<Vec<MetricDocument>, StoreError> {
        let url = self.documents_url();
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_json()))
            .collect();
        let builder = self.request(Method::GET, &url).query(&params);
        let list: DocumentList = self.send(url, builder).await?;
        Ok(list.documents)
    }
}

#[async_trait]
impl MetricStore for AppwriteMetricStore {
    async fn find_by_term(&self, term: &str) -> Result<Option<MetricDocument>, StoreError> {
        let documents = self
            .list(&[Query::Equal("searchTerm", term.to_string())])
            .await?;
        Ok(documents.into_iter().next())
    }

    async fn top_by_count(&self, limit: usize) -> Result<Vec<MetricDocument>, StoreError> {
        self.list(&[Query::OrderDesc("count"), Query::Limit(limit)])
            .await
    }

    async fn create(&self, metric: NewMetric) -> Result<MetricDocument, StoreError> {
        let url = self.documents_url();
        let builder = self
            .request(Method::POST, &url)
            .json(&json!({ "documentId": "unique()", "data": metric }));
        self.send(url, builder).await
    }

    async fn update(&self, id: &str, patch: MetricPatch) -> Result<MetricDocument, StoreError> {
        let url = format!("{}/{}", self.documents_url(), id);
        let builder = self
            .request(Method::PATCH, &url)
            .json(&json!({ "data": patch }));
        self.send(url, builder).await
    }
}

/// Process-local metric store, used when no Appwrite endpoint is configured.
#[derive(Debug, Default)]
pub struct MemoryMetricStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    documents: Vec<MetricDocument>,
}

impl MemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document as-is, bypassing id assignment.
    pub async fn insert(&self, document: MetricDocument) {
        self.inner.lock().await.documents.push(document);
    }

    pub async fn documents(&self) -> Vec<MetricDocument> {
        self.inner.lock().await.documents.clone()
    }
}

#[async_trait]
impl MetricStore for MemoryMetricStore {
    async fn find_by_term(&self, term: &str) -> Result<Option<MetricDocument>, StoreError> {
        let state = self.inner.lock().await;
        Ok(state
            .documents
            .iter()
            .find(|doc| doc.search_term == term)
            .cloned())
    }

    async fn top_by_count(&self, limit: usize) -> Result<Vec<MetricDocument>, StoreError> {
        let mut documents = self.inner.lock().await.documents.clone();
        // Stable sort: equal counts keep insertion order.
        documents.sort_by(|a, b| b.count.cmp(&a.count));
        documents.truncate(limit);
        Ok(documents)
    }

    async fn create(&self, metric: NewMetric) -> Result<MetricDocument, StoreError> {
        let mut state = self.inner.lock().await;
        state.next_id += 1;
        let document = MetricDocument {
            id: format!("metric-{}", state.next_id),
            search_term: metric.search_term,
            count: metric.count,
            movie_id: metric.movie_id,
            average_rating: Some(metric.average_rating),
            poster_url: metric.poster_url,
            category: metric.category,
            updated_at: Some(Utc::now()),
        };
        state.documents.push(document.clone());
        Ok(document)
    }

    async fn update(&self, id: &str, patch: MetricPatch) -> Result<MetricDocument, StoreError> {
        let mut state = self.inner.lock().await;
        let document = state
            .documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        document.count = patch.count;
        document.category = patch.category;
        document.updated_at = Some(Utc::now());
        Ok(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_test::{Token, assert_ser_tokens};

    use super::*;

    fn new_metric(term: &str, count: u64) -> NewMetric {
        NewMetric {
            search_term: term.to_string(),
            count,
            movie_id: 603,
            average_rating: 8.2,
            poster_url: None,
            category: vec![28, 878],
        }
    }

    #[test]
    fn queries_serialize_to_appwrite_json() {
        let equal: serde_json::Value =
            serde_json::from_str(&Query::Equal("searchTerm", "Matrix".into()).to_json()).unwrap();
        assert_eq!(
            equal,
            json!({ "method": "equal", "attribute": "searchTerm", "values": ["Matrix"] })
        );

        let order: serde_json::Value =
            serde_json::from_str(&Query::OrderDesc("count").to_json()).unwrap();
        assert_eq!(order, json!({ "method": "orderDesc", "attribute": "count" }));

        let limit: serde_json::Value = serde_json::from_str(&Query::Limit(20).to_json()).unwrap();
        assert_eq!(limit, json!({ "method": "limit", "values": [20] }));
    }

    #[test]
    fn new_metric_uses_collection_attribute_names() {
        let metric = NewMetric {
            poster_url: Some("https://image.tmdb.org/t/p/w500/matrix.jpg".into()),
            ..new_metric("Matrix", 1)
        };
        assert_ser_tokens(
            &metric,
            &[
                Token::Struct {
                    name: "NewMetric",
                    len: 6,
                },
                Token::Str("searchTerm"),
                Token::Str("Matrix"),
                Token::Str("count"),
                Token::U64(1),
                Token::Str("movie_id"),
                Token::U64(603),
                Token::Str("averageRating"),
                Token::F64(8.2),
                Token::Str("poster_url"),
                Token::Some,
                Token::Str("https://image.tmdb.org/t/p/w500/matrix.jpg"),
                Token::Str("category"),
                Token::Seq { len: Some(2) },
                Token::U32(28),
                Token::U32(878),
                Token::SeqEnd,
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn document_decodes_appwrite_payload() {
        let doc: MetricDocument = serde_json::from_value(json!({
            "$id": "abc123",
            "$collectionId": "metrics",
            "$updatedAt": "2025-01-02T03:04:05.000+00:00",
            "searchTerm": "Matrix",
            "count": 4,
            "movie_id": 603,
            "averageRating": 8.2,
            "poster_url": "https://image.tmdb.org/t/p/w500/matrix.jpg",
            "category": [28, 878],
        }))
        .unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.count, 4);
        assert_eq!(doc.category, vec![28, 878]);
        assert!(doc.updated_at.is_some());
    }

    #[tokio::test]
    async fn memory_store_finds_and_updates_by_term() {
        let store = MemoryMetricStore::new();
        let created = store.create(new_metric("Matrix", 1)).await.unwrap();

        let first = store.find_by_term("Matrix").await.unwrap().unwrap();
        let second = store.find_by_term("Matrix").await.unwrap().unwrap();
        assert_eq!(first.id, created.id);
        assert_eq!(second.id, created.id);
        assert!(store.find_by_term("matrix").await.unwrap().is_none());

        let updated = store
            .update(
                &created.id,
                MetricPatch {
                    count: 2,
                    category: vec![18],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.count, 2);
        assert_eq!(updated.category, vec![18]);
    }

    #[tokio::test]
    async fn memory_store_orders_by_count_and_limits() {
        let store = MemoryMetricStore::new();
        for (term, count) in [("a", 3), ("b", 7), ("c", 3), ("d", 1)] {
            store.create(new_metric(term, count)).await.unwrap();
        }
        let top = store.top_by_count(3).await.unwrap();
        let terms: Vec<&str> = top.iter().map(|doc| doc.search_term.as_str()).collect();
        assert_eq!(terms, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn memory_store_update_of_unknown_id_fails() {
        let store = MemoryMetricStore::new();
        let err = store
            .update(
                "missing",
                MetricPatch {
                    count: 1,
                    category: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    }
}
