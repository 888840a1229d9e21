//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::handlers::ApiJson;
use crate::middleware::{require_role, CurrentUser};
use crate::services::{auth::LoginResult, AuthService};
use crate::AppState;
use shared::models::{LoginInput, RegisterInput, ROLE_ADMIN};

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginInput>,
) -> Result<Json<LoginResult>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = auth_service.login(&body).await?;

    Ok(Json(result))
}

/// Register user endpoint handler (admin only)
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    require_role(&user, ROLE_ADMIN)?;
    shared::validation::check(&body).map_err(AppError::Validation)?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user_id = auth_service.register(&body, Some(user.user_id)).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "user created".to_string(),
            user_id,
        }),
    ))
}
