use datastore::VideoStore;
use domain::{Category, NewVideo, Todo, ValidationError, Video, VideoPatch};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::{LibraryError, LibraryResult};

/// Owner-scoped access to the `videos` collection
///
/// Primitive calls (`list`, `get`, `create`, `update`, `delete`) map onto one
/// store request each and do not check ownership. Everything that acts on a
/// single video on behalf of a user goes through [`VideoRepository::open`],
/// which treats a video owned by someone else exactly like a missing one.
///
/// The toggles and note mutations read the video, transform it locally, then
/// write the result back. The two requests are not atomic: two sessions
/// toggling the same video race and the last write wins. Note mutations
/// always rewrite the whole `todos` list.
#[derive(Clone)]
pub struct VideoRepository {
    store: Arc<dyn VideoStore>,
}

impl VideoRepository {
    pub fn new(store: Arc<dyn VideoStore>) -> Self {
        Self { store }
    }

    /// All videos owned by `user_id`, in store order
    pub async fn list(&self, user_id: &str) -> LibraryResult<Vec<Video>> {
        self.store
            .query_by_owner(user_id)
            .await
            .inspect_err(|e| error!(%user_id, error = %e, "Error getting videos"))
            .map_err(Into::into)
    }

    pub async fn get(&self, video_id: &str) -> LibraryResult<Option<Video>> {
        self.store
            .get(video_id)
            .await
            .inspect_err(|e| error!(%video_id, error = %e, "Error getting video"))
            .map_err(Into::into)
    }

    /// Persist a new video and return the generated ID
    ///
    /// Not idempotent: calling this twice stores two videos.
    pub async fn create(&self, video: NewVideo) -> LibraryResult<String> {
        let id = self
            .store
            .insert(video)
            .await
            .inspect_err(|e| error!(error = %e, "Error adding video"))?;
        debug!(video_id = %id, "video created");
        Ok(id)
    }

    /// Merge `patch` into the stored video; fields not in the patch are kept
    pub async fn update(&self, video_id: &str, patch: VideoPatch) -> LibraryResult<()> {
        self.store
            .update(video_id, patch)
            .await
            .inspect_err(|e| error!(%video_id, error = %e, "Error updating video"))
            .map_err(Into::into)
    }

    pub async fn delete(&self, video_id: &str) -> LibraryResult<()> {
        self.store
            .delete(video_id)
            .await
            .inspect_err(|e| error!(%video_id, error = %e, "Error deleting video"))
            .map_err(Into::into)
    }

    /// Fetch a video on behalf of `owner`
    ///
    /// Missing videos and videos owned by another user both come back as
    /// [`LibraryError::NotFound`].
    pub async fn open(&self, owner: &str, video_id: &str) -> LibraryResult<Video> {
        match self.get(video_id).await? {
            Some(video) if video.is_owned_by(owner) => Ok(video),
            Some(_) => {
                debug!(%video_id, %owner, "video belongs to another user");
                Err(LibraryError::NotFound(video_id.to_string()))
            }
            None => Err(LibraryError::NotFound(video_id.to_string())),
        }
    }

    pub async fn update_owned(
        &self,
        owner: &str,
        video_id: &str,
        patch: VideoPatch,
    ) -> LibraryResult<Video> {
        let mut video = self.open(owner, video_id).await?;
        if patch.is_empty() {
            return Ok(video);
        }
        self.update(video_id, patch.clone()).await?;
        patch.apply_to(&mut video);
        Ok(video)
    }

    pub async fn remove(&self, owner: &str, video_id: &str) -> LibraryResult<()> {
        self.open(owner, video_id).await?;
        self.delete(video_id).await
    }

    /// Flip the watched flag and return the new value
    pub async fn toggle_watched(&self, owner: &str, video_id: &str) -> LibraryResult<bool> {
        let video = self.open(owner, video_id).await?;
        let watched = !video.watched;
        self.update(video_id, VideoPatch::watched(watched)).await?;
        Ok(watched)
    }

    /// Flip the favorite flag and return the new value
    pub async fn toggle_favorite(&self, owner: &str, video_id: &str) -> LibraryResult<bool> {
        let video = self.open(owner, video_id).await?;
        let favorite = !video.favorite;
        self.update(video_id, VideoPatch::favorite(favorite)).await?;
        Ok(favorite)
    }

    /// Append a note with a fresh random ID
    ///
    /// Ownership is checked before the text, so a foreign video is `NotFound`
    /// whatever the note says.
    pub async fn add_note(&self, owner: &str, video_id: &str, text: &str) -> LibraryResult<Todo> {
        let mut todos = self.open(owner, video_id).await?.todos;

        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyNote.into());
        }

        let todo = Todo {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        };
        todos.push(todo.clone());

        self.update(video_id, VideoPatch::todos(todos)).await?;
        Ok(todo)
    }

    /// Flip one note's completed flag and return the updated note
    pub async fn toggle_note(
        &self,
        owner: &str,
        video_id: &str,
        todo_id: &str,
    ) -> LibraryResult<Todo> {
        let mut todos = self.open(owner, video_id).await?.todos;
        let todo = todos
            .iter_mut()
            .find(|todo| todo.id == todo_id)
            .ok_or_else(|| LibraryError::NoteNotFound(todo_id.to_string()))?;
        todo.completed = !todo.completed;
        let updated = todo.clone();

        self.update(video_id, VideoPatch::todos(todos)).await?;
        Ok(updated)
    }

    pub async fn delete_note(
        &self,
        owner: &str,
        video_id: &str,
        todo_id: &str,
    ) -> LibraryResult<()> {
        let todos = self.open(owner, video_id).await?.todos;
        let before = todos.len();
        let todos: Vec<Todo> = todos.into_iter().filter(|todo| todo.id != todo_id).collect();
        if todos.len() == before {
            return Err(LibraryError::NoteNotFound(todo_id.to_string()));
        }

        self.update(video_id, VideoPatch::todos(todos)).await
    }

    /// Classes and subjects across the user's videos
    pub async fn categories(&self, user_id: &str) -> LibraryResult<Vec<Category>> {
        let videos = self.list(user_id).await?;
        Ok(Category::from_videos(&videos))
    }
}
