use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, RefreshTokenRequestDto, RefreshTokenResponseDto,
};
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

/// Obtain an access/refresh token pair
#[utoipa::path(
    post,
    path = "/auth/login/",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials or disabled account")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<LoginResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(response), None)))
}

/// Refresh the access token
#[utoipa::path(
    post,
    path = "/auth/token/refresh/",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<RefreshTokenResponseDto>),
        (status = 400, description = "Refresh token missing from payload"),
        (status = 401, description = "Invalid, expired or blacklisted refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RefreshTokenRequestDto>,
) -> Result<Json<ApiResponse<RefreshTokenResponseDto>>> {
    let refresh = dto
        .refresh
        .ok_or_else(|| AppError::BadRequest("'refresh' token is required.".to_string()))?;

    let refreshed = service.tokens().refresh(&refresh).await?;
    Ok(Json(ApiResponse::success(
        Some(RefreshTokenResponseDto {
            access: refreshed.access,
            refresh: refreshed.refresh,
        }),
        None,
    )))
}

/// Blacklist the refresh token (logout)
#[utoipa::path(
    post,
    path = "/auth/logout/",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 200, description = "Logged out"),
        (status = 400, description = "Refresh token missing from payload"),
        (status = 401, description = "Token already invalid or blacklisted")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RefreshTokenRequestDto>,
) -> Result<Json<ApiResponse<()>>> {
    let refresh = dto
        .refresh
        .ok_or_else(|| AppError::BadRequest("'refresh' token is required.".to_string()))?;

    service.tokens().logout(&refresh).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Successfully logged out.".to_string()),
    )))
}
