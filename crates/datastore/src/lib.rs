use async_trait::async_trait;
use domain::{NewVideo, Video, VideoPatch};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::debug;

/// Name of the document collection holding videos
pub const VIDEOS_COLLECTION: &str = "videos";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document '{0}' not found")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document collection of videos
/// This allows switching between different storage backends (in-memory, remote document database)
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Get every video whose owner field equals `user_id`
    async fn query_by_owner(&self, user_id: &str) -> StoreResult<Vec<Video>>;

    /// Get a video by ID
    async fn get(&self, id: &str) -> StoreResult<Option<Video>>;

    /// Persist a new video and return its generated ID
    async fn insert(&self, video: NewVideo) -> StoreResult<String>;

    /// Merge `patch` into the stored video.
    ///
    /// Fails with [`StoreError::NotFound`] if it does not exist.
    async fn update(&self, id: &str, patch: VideoPatch) -> StoreResult<()>;

    /// Remove a video. Removing a missing ID is not an error.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// In-memory implementation of the VideoStore trait
#[derive(Clone, Default)]
pub struct InMemoryVideoStore {
    videos: Arc<RwLock<HashMap<String, Video>>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable(format!("lock on '{VIDEOS_COLLECTION}' poisoned"))
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn query_by_owner(&self, user_id: &str) -> StoreResult<Vec<Video>> {
        let videos = self.videos.read().map_err(|_| Self::poisoned())?;
        Ok(videos
            .values()
            .filter(|video| video.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Video>> {
        let videos = self.videos.read().map_err(|_| Self::poisoned())?;
        Ok(videos.get(id).cloned())
    }

    async fn insert(&self, video: NewVideo) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        debug!(collection = VIDEOS_COLLECTION, %id, "inserting document");
        self.videos
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(id.clone(), video.with_id(id.clone()));
        Ok(id)
    }

    async fn update(&self, id: &str, patch: VideoPatch) -> StoreResult<()> {
        let mut videos = self.videos.write().map_err(|_| Self::poisoned())?;
        let video = videos
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(video);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let removed = self
            .videos
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(id);
        if removed.is_none() {
            debug!(collection = VIDEOS_COLLECTION, %id, "delete of missing document");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Platform, Todo};
    use fake::Fake;
    use fake::faker::lorem::en::Sentence;

    fn new_video(owner: &str) -> NewVideo {
        NewVideo {
            title: Sentence(2..5).fake(),
            video_url: "https://vimeo.com/76979871".to_string(),
            platform: Platform::Vimeo,
            video_id: "76979871".to_string(),
            class: "9".to_string(),
            subject: "History".to_string(),
            user_id: owner.to_string(),
            watched: false,
            favorite: false,
            todos: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let store = InMemoryVideoStore::new();
        let first = store.insert(new_video("u1")).await.unwrap();
        let second = store.insert(new_video("u1")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.get(&first).await.unwrap().unwrap().id, first);
    }

    #[tokio::test]
    async fn test_query_filters_by_owner() {
        let store = InMemoryVideoStore::new();
        let mine = store.insert(new_video("alice")).await.unwrap();
        store.insert(new_video("bob")).await.unwrap();

        let videos = store.query_by_owner("alice").await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, mine);
        assert!(store.query_by_owner("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = InMemoryVideoStore::new();
        let id = store.insert(new_video("u1")).await.unwrap();
        let todos = vec![Todo {
            id: "t1".to_string(),
            text: "Read".to_string(),
            completed: true,
        }];

        store.update(&id, VideoPatch::todos(todos.clone())).await.unwrap();

        let video = store.get(&id).await.unwrap().unwrap();
        assert_eq!(video.todos, todos);
        assert_eq!(video.subject, "History");
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = InMemoryVideoStore::new();
        let result = store.update("nope", VideoPatch::watched(true)).await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn test_delete_is_permanent_and_tolerates_missing() {
        let store = InMemoryVideoStore::new();
        let id = store.insert(new_video("u1")).await.unwrap();

        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
        store.delete(&id).await.unwrap();
    }
}
