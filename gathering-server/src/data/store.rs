use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{DomainError, Post, User};

/// The whole dataset as one container. Every request reloads it from the
/// store and every mutation writes it back wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self) -> Result<Dataset, DomainError>;
    async fn save(&self, dataset: &Dataset) -> Result<(), DomainError>;
}

/// Flat-file JSON store. A missing file is an empty dataset; a file that
/// does not parse is a hard error surfaced to the caller.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load(&self) -> Result<Dataset, DomainError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                tracing::error!("Data file {} is not valid JSON: {}", self.path.display(), e);
                DomainError::StorageError(format!("Malformed data file: {}", e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Dataset::default()),
            Err(e) => {
                tracing::error!("Failed to read data file {}: {}", self.path.display(), e);
                Err(DomainError::StorageError(e.to_string()))
            }
        }
    }

    async fn save(&self, dataset: &Dataset) -> Result<(), DomainError> {
        // Файл перезаписывается целиком, как и в оригинале
        let contents = serde_json::to_string_pretty(dataset)?;
        tokio::fs::write(&self.path, contents).await.map_err(|e| {
            tracing::error!("Failed to write data file {}: {}", self.path.display(), e);
            DomainError::StorageError(e.to_string())
        })
    }
}

/// In-memory substitute for tests.
#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<Dataset>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn load(&self) -> Result<Dataset, DomainError> {
        Ok(self.data.lock().await.clone())
    }

    async fn save(&self, dataset: &Dataset) -> Result<(), DomainError> {
        *self.data.lock().await = dataset.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: 1754500000000,
            name: "Ada".to_string(),
            email: "ada@x.com".to_string(),
            password: "$argon2id$fake".to_string(),
            bio: "New user".to_string(),
            avatar: "https://i.pravatar.cc/150?u=ada@x.com".to_string(),
            followers: 0,
            following: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));

        let dataset = store.load().await.unwrap();
        assert!(dataset.users.is_empty());
        assert!(dataset.posts.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data.json"));

        let mut dataset = Dataset::default();
        dataset.users.push(sample_user());
        store.save(&dataset).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.users.len(), 1);
        assert_eq!(loaded.users[0].email, "ada@x.com");
        assert_eq!(loaded.users[0].id, 1754500000000);
    }

    #[tokio::test]
    async fn malformed_file_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, DomainError::StorageError(_)));
    }

    #[tokio::test]
    async fn data_file_omits_like_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let store = JsonFileStore::new(&path);

        let mut dataset = Dataset::default();
        dataset.posts.push(Post {
            id: 1,
            author_id: 2,
            author_name: "Ada".to_string(),
            author_avatar: String::new(),
            content: "hello".to_string(),
            image: None,
            link: None,
            liked_by: vec![2, 3],
            comments: vec![],
            timestamp: Utc::now(),
        });
        store.save(&dataset).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["posts"][0]["likedBy"], serde_json::json!([2, 3]));
        assert!(raw["posts"][0].get("likes").is_none());
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryStore::new();

        let empty = store.load().await.unwrap();
        assert!(empty.users.is_empty());

        let mut dataset = Dataset::default();
        dataset.users.push(sample_user());
        store.save(&dataset).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.users.len(), 1);
    }
}
