use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::IntoResponse,
};
use domain::{Registration, User};
use identity::IdentityProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::error::ApiError;

/// Request body for signing in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for a successful sign-in or registration
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

/// The signed-in caller, resolved from the `Authorization: Bearer` header
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?.to_string();
        let user = state
            .auth
            .resolve(&token)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(Self { user, token })
    }
}

fn session_of(provider: &IdentityProvider, user: User) -> Result<SessionResponse, ApiError> {
    let token = provider.token().ok_or(ApiError::Unavailable("Session was not issued"))?;
    Ok(SessionResponse { token, user })
}

/// Handler for creating an account
pub(crate) async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<Registration>,
) -> Result<impl IntoResponse, ApiError> {
    let provider = IdentityProvider::new(state.auth.clone());
    let user = provider.register_form(&form).await?;
    Ok((StatusCode::CREATED, Json(session_of(&provider, user)?)))
}

/// Handler for signing in
pub(crate) async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let provider = IdentityProvider::new(state.auth.clone());
    let user = provider.login(&request.email, &request.password).await?;
    Ok(Json(session_of(&provider, user)?))
}

/// Handler for signing out
pub(crate) async fn logout(
    State(state): State<Arc<AppState>>,
    caller: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.sign_out(&caller.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn me(caller: CurrentUser) -> Json<User> {
    Json(caller.user)
}
