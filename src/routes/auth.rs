use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::accounts::{ResetPasswordRequest, SignInRequest, SignUpRequest};
use crate::constants::MSG_SIGNED_OUT;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::{ProfileUpdate, UserProfile};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Register a new user
///
/// POST /auth/signup → 201 `{message, token, user}`.
/// A second signup with the same email is rejected with 400.
pub async fn sign_up(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(request) = payload?;
    let session = state.accounts.sign_up(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully",
            token: session.token,
            user: session.user,
        }),
    ))
}

/// POST /auth/signin → 200 `{message, token, user}`
pub async fn sign_in(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(request) = payload?;
    let session = state.accounts.sign_in(request).await?;

    Ok(Json(AuthResponse {
        message: "Signed in successfully",
        token: session.token,
        user: session.user,
    }))
}

/// Tokens are stateless; the client discards its copy
pub async fn sign_out(Extension(user): Extension<AuthenticatedUser>) -> Json<MessageResponse> {
    tracing::info!(user_id = user.user_id, "User signed out");
    Json(MessageResponse {
        message: MSG_SIGNED_OUT,
    })
}

pub async fn reset_password(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(request) = payload?;
    let message = state.accounts.reset_password(request).await?;
    Ok(Json(MessageResponse { message }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>> {
    let user = state.accounts.profile(user.user_id).await?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: std::result::Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(update) = payload?;
    let user = state.accounts.update_profile(user.user_id, &update).await?;
    Ok(Json(ProfileResponse { user }))
}
