use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::auth_dto::{
        AuthResponse, LoginPayload, SignupPayload, UsernameAvailableResponse, UsernameQuery,
    },
    error::Result,
    utils::token::issue_token,
    AppState,
};

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.signup(payload).await?;
    let token = issue_token(user.id, &user.role)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.username, &payload.password)
        .await?;
    let token = issue_token(user.id, &user.role)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[axum::debug_handler]
pub async fn username_available(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse> {
    let available = state
        .user_service
        .username_available(&query.username)
        .await?;
    Ok(Json(UsernameAvailableResponse {
        username: query.username,
        available,
    }))
}
