use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use domain::{Category, NewVideo, Platform, PlayerSource, Todo, Video, VideoPatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

/// Request body for creating a new video. The owner is always the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub video_url: String,
    pub platform: Platform,
    pub video_id: String,
    pub class: String,
    pub subject: String,
}

/// Response for successful creation
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    pub text: String,
}

/// A single video with what the player should load for it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    pub player_source: PlayerSource,
}

impl From<Video> for VideoDetail {
    fn from(video: Video) -> Self {
        Self {
            player_source: video.player_source(),
            video,
        }
    }
}

/// New value of a toggled flag
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub value: bool,
}

pub(crate) async fn list_videos(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
) -> Result<Json<Vec<Video>>, ApiError> {
    Ok(Json(state.videos.list(&caller.user.id).await?))
}

/// Handler for creating a new video
pub(crate) async fn create_video(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Json(request): Json<CreateVideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let video = NewVideo {
        title: request.title,
        video_url: request.video_url,
        platform: request.platform,
        video_id: request.video_id,
        class: request.class,
        subject: request.subject,
        user_id: caller.user.id,
        watched: false,
        favorite: false,
        todos: Vec::new(),
    };

    let id = state.videos.create(video).await?;

    let response = CreateResponse {
        success: true,
        message: format!("Video '{}' created successfully", id),
        id,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub(crate) async fn get_video(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path(video_id): Path<String>,
) -> Result<Json<VideoDetail>, ApiError> {
    let video = state.videos.open(&caller.user.id, &video_id).await?;
    Ok(Json(video.into()))
}

pub(crate) async fn update_video(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path(video_id): Path<String>,
    Json(patch): Json<VideoPatch>,
) -> Result<Json<Video>, ApiError> {
    let video = state
        .videos
        .update_owned(&caller.user.id, &video_id, patch)
        .await?;
    Ok(Json(video))
}

pub(crate) async fn delete_video(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path(video_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.videos.remove(&caller.user.id, &video_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn toggle_watched(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path(video_id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let value = state
        .videos
        .toggle_watched(&caller.user.id, &video_id)
        .await?;
    Ok(Json(ToggleResponse { value }))
}

pub(crate) async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path(video_id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let value = state
        .videos
        .toggle_favorite(&caller.user.id, &video_id)
        .await?;
    Ok(Json(ToggleResponse { value }))
}

pub(crate) async fn add_note(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path(video_id): Path<String>,
    Json(request): Json<AddNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state
        .videos
        .add_note(&caller.user.id, &video_id, &request.text)
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub(crate) async fn toggle_note(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path((video_id, todo_id)): Path<(String, String)>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state
        .videos
        .toggle_note(&caller.user.id, &video_id, &todo_id)
        .await?;
    Ok(Json(todo))
}

pub(crate) async fn delete_note(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
    Path((video_id, todo_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .videos
        .delete_note(&caller.user.id, &video_id, &todo_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_categories(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.videos.categories(&caller.user.id).await?))
}
