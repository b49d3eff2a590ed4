//! In-memory keyed stores for tool-produced artifacts.
//!
//! Stores are injected into the tool executor at construction so tests can
//! run against isolated instances. Contents live for the process lifetime;
//! there is no durability and none is wanted here.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A generated single-file application.
#[derive(Debug, Clone, Serialize)]
pub struct AppArtifact {
    pub id: Uuid,
    pub title: String,
    pub source: String,
    /// Validation findings that were still open when the repair loop gave
    /// up, empty for a clean build.
    pub open_issues: Vec<String>,
}

/// A code snippet together with its most recent execution outcome.
#[derive(Debug, Clone, Serialize)]
pub struct CodeArtifact {
    pub id: Uuid,
    pub language: String,
    pub code: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Generic keyed store shared between the executor and its tools.
#[derive(Debug)]
pub struct ArtifactStore<T> {
    inner: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T> Clone for ArtifactStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for ArtifactStore<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T: Clone> ArtifactStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: Uuid, value: T) {
        self.inner.write().await.insert(id, value);
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.inner.read().await.get(&id).cloned()
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        self.inner.read().await.contains_key(&id)
    }

    pub async fn ids(&self) -> Vec<Uuid> {
        self.inner.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = ArtifactStore::new();
        let id = Uuid::new_v4();
        store
            .insert(
                id,
                CodeArtifact {
                    id,
                    language: "python".into(),
                    code: "print(1)".into(),
                    stdout: "1\n".into(),
                    stderr: String::new(),
                    exit_code: 0,
                },
            )
            .await;
        let got = store.get(id).await.expect("artifact present");
        assert_eq!(got.code, "print(1)");
        assert!(store.contains(id).await);
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn replacing_an_entry_overwrites_it() {
        let store = ArtifactStore::new();
        let id = Uuid::new_v4();
        store
            .insert(
                id,
                AppArtifact {
                    id,
                    title: "v1".into(),
                    source: "<html></html>".into(),
                    open_issues: vec![],
                },
            )
            .await;
        let mut updated = store.get(id).await.unwrap();
        updated.title = "v2".into();
        store.insert(id, updated).await;
        assert_eq!(store.get(id).await.unwrap().title, "v2");
        assert_eq!(store.ids().await.len(), 1);
    }
}
