//! HTTP control API: accounts, videos, notes, and site preferences.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use datastore::{InMemoryVideoStore, VideoStore};
use identity::{AuthBackend, InMemoryAuthBackend};
use library::VideoRepository;
use preferences::{MemoryPreferenceStore, SitePreferences, SiteSettings};
use serde::Deserialize;
use std::sync::Arc;

pub mod auth;
pub mod error;
pub mod videos;

pub use auth::CurrentUser;
pub use error::{ApiError, ErrorResponse};

/// Everything a request handler needs, shared across requests
pub struct AppState {
    pub auth: Arc<dyn AuthBackend>,
    pub videos: VideoRepository,
    pub settings: Arc<SiteSettings>,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        store: Arc<dyn VideoStore>,
        settings: Arc<SiteSettings>,
    ) -> Arc<Self> {
        Arc::new(Self {
            auth,
            videos: VideoRepository::new(store),
            settings,
        })
    }

    /// Fully in-memory state with default preferences
    pub fn in_memory() -> Result<Arc<Self>, ApiError> {
        let settings = SiteSettings::load(Arc::new(MemoryPreferenceStore::new()))?;
        Ok(Self::new(
            Arc::new(InMemoryAuthBackend::default()),
            Arc::new(InMemoryVideoStore::new()),
            Arc::new(settings),
        ))
    }
}

/// Request body for changing preferences. Absent fields are left alone.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub site_name: Option<String>,
    pub theme_color: Option<String>,
}

async fn get_preferences(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SitePreferences>, ApiError> {
    Ok(Json(state.settings.snapshot()?))
}

async fn update_preferences(
    State(state): State<Arc<AppState>>,
    _caller: CurrentUser,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<SitePreferences>, ApiError> {
    if let Some(name) = request.site_name {
        state.settings.set_site_name(&name)?;
    }
    if let Some(color) = request.theme_color {
        state.settings.set_theme_color(&color)?;
    }
    Ok(Json(state.settings.snapshot()?))
}

/// Create the router for the control API
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/videos", get(videos::list_videos).post(videos::create_video))
        .route(
            "/videos/{id}",
            get(videos::get_video)
                .patch(videos::update_video)
                .delete(videos::delete_video),
        )
        .route("/videos/{id}/watched", post(videos::toggle_watched))
        .route("/videos/{id}/favorite", post(videos::toggle_favorite))
        .route("/videos/{id}/notes", post(videos::add_note))
        .route("/videos/{id}/notes/{todo_id}", delete(videos::delete_note))
        .route("/videos/{id}/notes/{todo_id}/toggle", post(videos::toggle_note))
        .route("/categories", get(videos::list_categories))
        .route("/preferences", get(get_preferences).put(update_preferences))
        .with_state(state)
}
