//! Qdrant vector index backend.
//!
//! Provides [`QdrantVectorIndex`] which implements [`VectorIndex`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! Qdrant accepts only unsigned integers and UUIDs as point ids. String keys
//! that are not UUIDs are mapped to a deterministic UUIDv5 and the original key
//! is kept in the payload under `point_key`, so results report the key back.
//!
//! # Example
//!
//! ```rust,ignore
//! use jargone_rag::qdrant::QdrantVectorIndex;
//!
//! let index = QdrantVectorIndex::new("http://localhost:6334")?;
//! index.ensure_collection("documents", 1536).await?;
//! index.upsert("documents", &points).await?;
//! let results = index.search("documents", &query, 5, None).await?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::{Map, Value};
use tracing::{debug, error};
use uuid::Uuid;

use crate::document::{ChunkPayload, FieldValue, IndexPoint, PointId, RetrievalResult, SearchFilter};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

const BACKEND: &str = "qdrant";

/// Payload field holding the caller's key when it was mapped to a UUID.
const POINT_KEY_FIELD: &str = "point_key";

/// A [`VectorIndex`] backed by [Qdrant](https://qdrant.tech/).
///
/// Collections are created with cosine distance. Chunk payloads are stored
/// as Qdrant payload using the [`ChunkPayload`] schema.
pub struct QdrantVectorIndex {
    client: Qdrant,
}

impl QdrantVectorIndex {
    /// Connect to the given gRPC URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Connect with a per-request timeout.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let client = Qdrant::from_url(url).timeout(timeout).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Connect to the default URL (`http://localhost:6334`).
    pub fn default_url() -> Result<Self> {
        Self::new("http://localhost:6334")
    }

    /// Wrap an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        let message = e.to_string();
        let lower = message.to_lowercase();
        if lower.contains("deadline") || lower.contains("timed out") {
            return RagError::Timeout { component: BACKEND.to_string(), message };
        }
        RagError::VectorStoreError { backend: BACKEND.to_string(), message }
    }
}

/// The id Qdrant stores a point under, plus the original key if it was mapped.
fn qdrant_id(id: &PointId) -> (qdrant_client::qdrant::PointId, Option<String>) {
    match id {
        PointId::Num(n) => ((*n).into(), None),
        PointId::Key(key) => match Uuid::parse_str(key) {
            Ok(uuid) => (uuid.to_string().into(), None),
            Err(_) => {
                let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes());
                (uuid.to_string().into(), Some(key.clone()))
            }
        },
    }
}

fn to_filter(filter: &SearchFilter) -> Filter {
    Filter::must(filter.must.iter().map(|cond| match &cond.value {
        FieldValue::Text(s) => Condition::matches(cond.key.clone(), s.clone()),
        FieldValue::Integer(n) => Condition::matches(cond.key.clone(), *n),
        FieldValue::Bool(b) => Condition::matches(cond.key.clone(), *b),
    }))
}

fn to_json(value: &QdrantValue) -> Value {
    match &value.kind {
        Some(Kind::DoubleValue(v)) => serde_json::json!(*v),
        Some(Kind::IntegerValue(v)) => serde_json::json!(*v),
        Some(Kind::StringValue(v)) => Value::String(v.clone()),
        Some(Kind::BoolValue(v)) => Value::Bool(*v),
        Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(to_json).collect()),
        Some(Kind::StructValue(s)) => {
            Value::Object(s.fields.iter().map(|(k, v)| (k.clone(), to_json(v))).collect())
        }
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}

fn to_payload(point: &IndexPoint, original_key: Option<String>) -> Result<Payload> {
    let mut json = point.payload.to_json();
    if let Some(key) = original_key {
        json.insert(POINT_KEY_FIELD.to_string(), Value::String(key));
    }
    Payload::try_from(Value::Object(json)).map_err(QdrantVectorIndex::map_err)
}

fn from_payload(
    id: Option<&qdrant_client::qdrant::PointId>,
    payload: &HashMap<String, QdrantValue>,
    score: f32,
) -> Result<RetrievalResult> {
    let mut json: Map<String, Value> =
        payload.iter().map(|(k, v)| (k.clone(), to_json(v))).collect();

    let key = match json.remove(POINT_KEY_FIELD) {
        Some(Value::String(key)) => key,
        _ => id
            .and_then(|pid| match &pid.point_id_options {
                Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
                Some(PointIdOptions::Num(n)) => Some(n.to_string()),
                None => None,
            })
            .unwrap_or_default(),
    };

    let payload: ChunkPayload = serde_json::from_value(Value::Object(json))
        .map_err(|e| RagError::VectorStoreError {
            backend: BACKEND.to_string(),
            message: format!("malformed chunk payload for point '{key}': {e}"),
        })
        .inspect_err(|e| error!(point = %key, error = %e, "malformed chunk payload"))?;

    Ok(RetrievalResult::from_payload(key, payload, score))
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn ensure_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        if self.client.collection_exists(name).await.map_err(Self::map_err)? {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: &[IndexPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let points = points
            .iter()
            .map(|point| {
                let (id, original_key) = qdrant_id(&point.id);
                let payload = to_payload(point, original_key)?;
                Ok(PointStruct::new(id, point.vector.clone(), payload))
            })
            .collect::<Result<Vec<_>>>()?;
        let count = points.len();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count, "upserted points to qdrant");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<RetrievalResult>> {
        let mut request =
            SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64).with_payload(true);
        if let Some(filter) = filter.filter(|f| !f.must.is_empty()) {
            request = request.filter(to_filter(filter));
        }

        let response = self.client.search_points(request).await.map_err(Self::map_err)?;

        response
            .result
            .iter()
            .map(|scored| from_payload(scored.id.as_ref(), &scored.payload, scored.score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_keys_map_to_stable_uuids() {
        let (first, key) = qdrant_id(&PointId::Key("report.pdf_0".into()));
        let (second, _) = qdrant_id(&PointId::Key("report.pdf_0".into()));
        assert_eq!(first, second);
        assert_eq!(key.as_deref(), Some("report.pdf_0"));
    }

    #[test]
    fn uuid_and_numeric_ids_pass_through() {
        let uuid = Uuid::new_v4().to_string();
        let (_, key) = qdrant_id(&PointId::Key(uuid));
        assert!(key.is_none());
        let (_, key) = qdrant_id(&PointId::Num(7));
        assert!(key.is_none());
    }

    #[test]
    fn results_report_the_original_key() {
        let mut payload = HashMap::new();
        payload.insert(POINT_KEY_FIELD.to_string(), QdrantValue::from("wiki_2".to_string()));
        payload.insert("text".to_string(), QdrantValue::from("hello".to_string()));
        payload.insert("chunk_id".to_string(), QdrantValue::from(2i64));

        let result = from_payload(None, &payload, 0.5).unwrap();
        assert_eq!(result.id, "wiki_2");
        assert_eq!(result.text, "hello");
        assert_eq!(result.chunk_id, Some(2));
    }

    #[test]
    fn mistyped_payload_is_a_store_error() {
        let mut payload = HashMap::new();
        payload.insert("text".to_string(), QdrantValue::from(42i64));
        payload.insert("source_name".to_string(), QdrantValue::from("wiki".to_string()));

        let err = from_payload(None, &payload, 0.9).unwrap_err();
        assert!(matches!(err, RagError::VectorStoreError { .. }), "unexpected error: {err}");
    }

    #[test]
    fn written_payload_reads_back_with_its_key() {
        let mut metadata = Map::new();
        metadata.insert("team".into(), Value::String("ops".into()));
        let point = IndexPoint {
            id: PointId::Key("runbook.md_3".into()),
            vector: vec![0.1, 0.2],
            payload: ChunkPayload {
                text: "restart the broker".into(),
                source_name: "runbook.md".into(),
                chunk_id: Some(3),
                token_count: Some(18),
                named_entities: vec!["broker".into()],
                metadata,
            },
        };

        let (id, original_key) = qdrant_id(&point.id);
        let stored: HashMap<String, QdrantValue> = to_payload(&point, original_key).unwrap().into();
        assert!(stored.contains_key(POINT_KEY_FIELD));

        let result = from_payload(Some(&id), &stored, 0.75).unwrap();
        assert_eq!(result.id, "runbook.md_3");
        assert_eq!(result.text, "restart the broker");
        assert_eq!(result.chunk_id, Some(3));
        assert_eq!(result.token_count, Some(18));
        assert_eq!(result.named_entities, vec!["broker".to_string()]);
        assert_eq!(result.metadata["team"], "ops");
        assert!(!result.metadata.contains_key(POINT_KEY_FIELD));
    }

    #[test]
    fn missing_key_falls_back_to_the_qdrant_id() {
        let uuid = Uuid::new_v4().to_string();
        let (id, key) = qdrant_id(&PointId::Key(uuid.clone()));
        assert!(key.is_none());
        let result = from_payload(Some(&id), &HashMap::new(), 0.1).unwrap();
        assert_eq!(result.id, uuid);
        assert_eq!(result.text, "");
    }

    #[test]
    fn filters_become_must_conditions() {
        let filter = SearchFilter::new()
            .must_match("source_name", FieldValue::Text("wiki".into()))
            .must_match("chunk_id", FieldValue::Integer(2));
        assert_eq!(to_filter(&filter).must.len(), 2);
    }

    /// Needs a Qdrant at `QDRANT_URL` (default `http://localhost:6334`).
    #[tokio::test]
    #[ignore]
    async fn live_upsert_then_search_reports_the_key() {
        let url = std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".into());
        let index = QdrantVectorIndex::new(&url).unwrap();
        let collection = format!("jargone_test_{}", Uuid::new_v4().simple());
        index.ensure_collection(&collection, 3).await.unwrap();
        index.ensure_collection(&collection, 3).await.unwrap();

        let point = IndexPoint {
            id: PointId::Key("notes.md_0".into()),
            vector: vec![1.0, 0.0, 0.0],
            payload: ChunkPayload {
                text: "kafka topics".into(),
                source_name: "notes.md".into(),
                chunk_id: Some(0),
                ..ChunkPayload::default()
            },
        };
        index.upsert(&collection, &[point.clone()]).await.unwrap();
        index.upsert(&collection, &[point]).await.unwrap();

        let results = index.search(&collection, &[1.0, 0.0, 0.0], 5, None).await.unwrap();
        index.delete_collection(&collection).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "notes.md_0");
        assert!((results[0].score - 1.0).abs() < 1e-4);
    }
}
