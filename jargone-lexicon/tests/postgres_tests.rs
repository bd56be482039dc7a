//! PostgreSQL store tests.
//!
//! Each test gets a fresh database from `#[sqlx::test]`. Run them with a
//! server at `DATABASE_URL`:
//!
//! ```text
//! cargo test -p jargone-lexicon --features postgres -- --ignored
//! ```

#![cfg(feature = "postgres")]

use std::sync::Arc;

use jargone_lexicon::seed::default_seed;
use jargone_lexicon::{LexiconStore, PgLexiconStore, SeedEntry};
use sqlx::PgPool;

async fn store(pool: PgPool) -> PgLexiconStore {
    let store = PgLexiconStore::from_pool(pool);
    store.ensure_schema().await.unwrap();
    store
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn schema_is_idempotent(pool: PgPool) {
    let store = store(pool).await;
    store.ensure_schema().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn concurrent_seeding_inserts_once(pool: PgPool) {
    let store = Arc::new(store(pool).await);
    let seed = default_seed();

    let runs = (0..4).map(|_| {
        let store = store.clone();
        let seed = seed.clone();
        tokio::spawn(async move { store.bulk_seed_if_empty(&seed).await.unwrap() })
    });
    let mut inserted = Vec::new();
    for run in runs {
        inserted.push(run.await.unwrap());
    }

    assert_eq!(inserted.iter().sum::<usize>(), seed.len());
    assert_eq!(inserted.iter().filter(|n| **n > 0).count(), 1);
    assert_eq!(store.count().await.unwrap(), seed.len());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn upsert_replaces_by_lowercase_name(pool: PgPool) {
    let store = store(pool).await;
    let first = store.upsert("gRPC", "an RPC framework").await.unwrap();
    let second = store.upsert("GRPC", "an RPC framework over HTTP/2").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.name, "gRPC");
    assert_eq!(second.definition, "an RPC framework over HTTP/2");
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL server at DATABASE_URL"]
async fn fuzzy_lookup_uses_the_folded_length(pool: PgPool) {
    let store = store(pool).await;
    store
        .bulk_seed_if_empty(&[
            SeedEntry::new("Baobab", "a tree"),
            SeedEntry::new("Kubernetes", "a container orchestrator"),
        ])
        .await
        .unwrap();

    assert_eq!(store.fuzzy_lookup("BAOBA").await.unwrap().unwrap().name, "Baobab");
    assert_eq!(store.fuzzy_lookup("kubernetess").await.unwrap().unwrap().name, "Kubernetes");
    assert!(store.fuzzy_lookup("kube").await.unwrap().is_none());
    assert_eq!(store.names().await.unwrap(), vec!["Baobab", "Kubernetes"]);
}
