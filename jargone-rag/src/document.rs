//! Data types for document chunks, index points, filters and retrieval results.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a point in the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    /// An unsigned integer id.
    Num(u64),
    /// A string key, such as `"report.pdf_3"`.
    Key(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

impl From<u64> for PointId {
    fn from(n: u64) -> Self {
        Self::Num(n)
    }
}

impl From<&str> for PointId {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PointId {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

/// A window of a source document, the unit stored in the vector index.
///
/// An embedding must be attached before the chunk is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentChunk {
    /// The text of the window.
    pub text: String,
    /// Name of the document the window was cut from.
    pub source_name: String,
    /// Zero-based window index within the source.
    pub chunk_id: Option<u64>,
    /// Character length of `text`.
    pub token_count: Option<usize>,
    /// Entity texts recognised in this window, in document order.
    pub named_entities: Vec<String>,
    /// Free-form metadata stored alongside the chunk.
    pub metadata: Map<String, Value>,
    /// The vector embedding for `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Explicit point id; see [`DocumentChunk::point_id`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PointId>,
}

impl DocumentChunk {
    /// Create a chunk with only text and source set.
    pub fn new(text: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self { text: text.into(), source_name: source_name.into(), ..Default::default() }
    }

    /// The id this chunk is stored under.
    ///
    /// The explicit `id` when set, otherwise `"{source_name}_{chunk_id}"`
    /// (just `source_name` when the chunk has no index).
    pub fn point_id(&self) -> PointId {
        match (&self.id, self.chunk_id) {
            (Some(id), _) => id.clone(),
            (None, Some(chunk_id)) => PointId::Key(format!("{}_{chunk_id}", self.source_name)),
            (None, None) => PointId::Key(self.source_name.clone()),
        }
    }

    /// The payload written next to the vector.
    pub fn payload(&self) -> ChunkPayload {
        ChunkPayload {
            text: self.text.clone(),
            source_name: self.source_name.clone(),
            chunk_id: self.chunk_id,
            token_count: self.token_count,
            named_entities: self.named_entities.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// The payload schema stored with every point.
///
/// Index writers and result readers both go through this struct so the field
/// names cannot drift apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkPayload {
    /// The chunk text.
    #[serde(default)]
    pub text: String,
    /// Name of the source document.
    #[serde(default)]
    pub source_name: String,
    /// Window index within the source.
    #[serde(default)]
    pub chunk_id: Option<u64>,
    /// Character length of the text.
    #[serde(default)]
    pub token_count: Option<usize>,
    /// Entity texts recognised in the chunk.
    #[serde(default)]
    pub named_entities: Vec<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ChunkPayload {
    /// Serialize into a JSON object.
    pub fn to_json(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Resolve a dotted path such as `metadata.category` against this payload.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let json = Value::Object(self.to_json());
        path.split('.').try_fold(&json, |value, key| value.get(key)).cloned()
    }
}

/// A vector plus payload ready to be written to an index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPoint {
    /// The point id.
    pub id: PointId,
    /// The embedding.
    pub vector: Vec<f32>,
    /// The payload.
    pub payload: ChunkPayload,
}

/// A stored chunk returned from a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// The point id, rendered as a string.
    pub id: String,
    /// The chunk text.
    pub text: String,
    /// Name of the source document.
    pub source_name: String,
    /// Window index within the source.
    pub chunk_id: Option<u64>,
    /// Character length of the text.
    pub token_count: Option<usize>,
    /// Entity texts recognised in the chunk.
    pub named_entities: Vec<String>,
    /// Free-form metadata.
    pub metadata: Map<String, Value>,
    /// Similarity score, higher is more relevant.
    pub score: f32,
}

impl RetrievalResult {
    /// Build a result from a stored payload.
    pub fn from_payload(id: impl Into<String>, payload: ChunkPayload, score: f32) -> Self {
        Self {
            id: id.into(),
            text: payload.text,
            source_name: payload.source_name,
            chunk_id: payload.chunk_id,
            token_count: payload.token_count,
            named_entities: payload.named_entities,
            metadata: payload.metadata,
            score,
        }
    }
}

/// A value a payload field must equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A string value.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A boolean value.
    Bool(bool),
}

impl FieldValue {
    /// Whether a JSON value equals this one. Arrays match when any element does.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Array(items)) => items.iter().any(|item| self.matches(item)),
            (Self::Text(expected), Value::String(actual)) => expected == actual,
            (Self::Integer(expected), Value::Number(actual)) => actual.as_i64() == Some(*expected),
            (Self::Bool(expected), Value::Bool(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// An exact-match condition on one payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    /// Dotted path into the payload, e.g. `source_name` or `metadata.lang`.
    pub key: String,
    /// The required value.
    pub value: FieldValue,
}

/// A conjunction of payload conditions applied to a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Every condition must hold.
    pub must: Vec<FieldMatch>,
}

impl SearchFilter {
    /// An empty filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field match.
    pub fn must_match(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.must.push(FieldMatch { key: key.into(), value: value.into() });
        self
    }

    /// Whether the payload satisfies every condition.
    pub fn accepts(&self, payload: &ChunkPayload) -> bool {
        self.must.iter().all(|cond| {
            payload.lookup(&cond.key).is_some_and(|value| cond.value.matches(&value))
        })
    }
}
