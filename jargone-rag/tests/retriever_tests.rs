//! Integration tests for the retriever over the in-memory index.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jargone_ner::{EntityRecognizer, HeuristicTagger};
use jargone_rag::{
    ChunkIndexer, DocumentChunk, EmbeddingProvider, InMemoryVectorIndex, PointId, RagError,
    RetrievalConfig, Retriever, SearchFilter, VectorIndex,
};
use serde_json::json;

const DIM: usize = 32;

/// Bag-of-words embedder: each lowercased word bumps one hashed bucket.
#[derive(Default)]
struct HashEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> jargone_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0f32; DIM];
        for word in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % DIM as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

fn retriever(index: Arc<InMemoryVectorIndex>) -> Retriever {
    Retriever::builder()
        .config(RetrievalConfig::builder().dimensions(DIM).top_k(3).build().unwrap())
        .embedding_provider(Arc::new(HashEmbedder::default()))
        .vector_index(index)
        .build()
        .unwrap()
}

async fn embedded(retriever: &Retriever, text: &str, source: &str, chunk_id: u64) -> DocumentChunk {
    let mut chunk = DocumentChunk::new(text, source);
    chunk.chunk_id = Some(chunk_id);
    chunk.embedding = Some(retriever.embed(text).await.unwrap());
    chunk
}

#[tokio::test]
async fn retrieve_on_fresh_collection_is_empty() {
    let retriever = retriever(Arc::new(InMemoryVectorIndex::new()));
    assert!(retriever.retrieve("anything at all").await.unwrap().is_empty());
}

#[tokio::test]
async fn reupserted_point_is_found_once_with_latest_payload() {
    let index = Arc::new(InMemoryVectorIndex::new());
    let retriever = retriever(index.clone());

    let first = embedded(&retriever, "baobab trees store water", "botany", 0).await;
    retriever.add(&[first]).await.unwrap();

    let mut second = embedded(&retriever, "baobab trees store water", "botany", 0).await;
    second.metadata.insert("revision".into(), json!(2));
    let vector = second.embedding.clone().unwrap();
    let ids = retriever.add(&[second]).await.unwrap();
    assert_eq!(ids, vec!["botany_0".to_string()]);

    let results = retriever.search(&vector, 10, None).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "botany_0");
    assert!(results[0].score >= 0.99);
    assert_eq!(results[0].metadata.get("revision"), Some(&json!(2)));
    assert_eq!(index.point_count("documents").await, Some(1));
}

#[tokio::test]
async fn add_is_all_or_nothing() {
    let index = Arc::new(InMemoryVectorIndex::new());
    let retriever = retriever(index.clone());

    let good = embedded(&retriever, "subnet masks", "net", 0).await;
    let missing = DocumentChunk { chunk_id: Some(1), ..DocumentChunk::new("no vector", "net") };
    let err = retriever.add(&[good.clone(), missing]).await.unwrap_err();
    assert!(matches!(err, RagError::MissingEmbedding { ref id } if id == "net_1"));

    let mut short = DocumentChunk::new("short vector", "net");
    short.id = Some(PointId::Num(9));
    short.embedding = Some(vec![1.0; DIM - 1]);
    let err = retriever.add(&[good, short]).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: DIM, actual, .. } if actual == DIM - 1));

    assert_eq!(index.point_count("documents").await.unwrap_or(0), 0);
}

#[tokio::test]
async fn retrieve_ranks_relevant_passages_first_and_honours_filters() {
    let retriever = retriever(Arc::new(InMemoryVectorIndex::new()));
    let chunks = vec![
        embedded(&retriever, "rotate the wpa2-psk passphrase monthly", "it-handbook", 0).await,
        embedded(&retriever, "zoom meetings need a passcode", "it-handbook", 1).await,
        embedded(&retriever, "baobab fruit is rich in vitamin c", "botany", 0).await,
    ];
    retriever.add(&chunks).await.unwrap();

    let results = retriever.retrieve("wpa2-psk passphrase").await.unwrap();
    assert_eq!(results[0].id, "it-handbook_0");
    assert!(results.len() <= 3);

    let filter = SearchFilter::new().must_match("source_name", "botany");
    let results = retriever.retrieve_filtered("wpa2-psk passphrase", Some(&filter)).await.unwrap();
    assert!(results.iter().all(|r| r.source_name == "botany"));
}

#[tokio::test]
async fn similarity_threshold_drops_weak_passages() {
    let retriever = Retriever::builder()
        .config(
            RetrievalConfig::builder()
                .dimensions(DIM)
                .similarity_threshold(0.9)
                .build()
                .unwrap(),
        )
        .embedding_provider(Arc::new(HashEmbedder::default()))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .build()
        .unwrap();

    let chunk = embedded(&retriever, "kafka partitions", "streams", 0).await;
    retriever.add(&[chunk]).await.unwrap();

    assert_eq!(retriever.retrieve("kafka partitions").await.unwrap().len(), 1);
    assert!(retriever.retrieve("vitamin").await.unwrap().is_empty());
}

/// Maps "up" and "down" to opposite unit vectors.
struct SignEmbedder;

#[async_trait]
impl EmbeddingProvider for SignEmbedder {
    fn name(&self) -> &str {
        "sign"
    }

    async fn embed(&self, text: &str) -> jargone_rag::Result<Vec<f32>> {
        let sign = if text.contains("down") { -1.0 } else { 1.0 };
        let mut vector = vec![0.0f32; DIM];
        vector[0] = sign;
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

#[tokio::test]
async fn no_threshold_keeps_negative_scores() {
    let retriever = Retriever::builder()
        .config(RetrievalConfig::builder().dimensions(DIM).build().unwrap())
        .embedding_provider(Arc::new(SignEmbedder))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .build()
        .unwrap();

    let mut chunk = DocumentChunk::new("scale up", "ops");
    chunk.embedding = Some(retriever.embed("scale up").await.unwrap());
    retriever.add(&[chunk]).await.unwrap();

    let results = retriever.retrieve("scale down").await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].score < 0.0);
}

#[tokio::test]
async fn builder_rejects_dimension_disagreement() {
    let err = Retriever::builder()
        .config(RetrievalConfig::builder().dimensions(DIM + 1).build().unwrap())
        .embedding_provider(Arc::new(HashEmbedder::default()))
        .vector_index(Arc::new(InMemoryVectorIndex::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)));
}

#[tokio::test]
async fn ensure_ready_creates_the_collection_once() {
    let index = Arc::new(InMemoryVectorIndex::new());
    let retriever = retriever(index.clone());

    retriever.ensure_ready().await.unwrap();
    retriever.ensure_ready().await.unwrap();
    assert_eq!(index.point_count("documents").await, Some(0));
    assert_eq!(index.backend(), "InMemory");
}

#[tokio::test]
async fn chunkized_documents_round_trip_through_the_index() {
    let recognizer = Arc::new(EntityRecognizer::new(Arc::new(
        HeuristicTagger::new().with_terms([("kubernetes", "PRODUCT")]),
    )));
    let indexer = ChunkIndexer::new(40, 5, recognizer).unwrap();
    let retriever = retriever(Arc::new(InMemoryVectorIndex::new()));

    let content = "Our kubernetes cluster runs in the eu region. Deployments roll out nightly.";
    let mut chunks = indexer.chunkize(content, "ops.md").await.unwrap();
    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].named_entities.contains(&"kubernetes".to_string()));

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let vectors = retriever.embed_batch(&texts).await.unwrap();
    for (chunk, vector) in chunks.iter_mut().zip(vectors) {
        chunk.embedding = Some(vector);
    }

    let ids = retriever.add(&chunks).await.unwrap();
    assert_eq!(ids, vec!["ops.md_0", "ops.md_1", "ops.md_2"]);
}
