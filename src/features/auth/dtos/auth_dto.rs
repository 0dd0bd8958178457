use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Minimal principal info echoed back on login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfoDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub access: String,
    pub refresh: String,
    pub user: UserInfoDto,
}

/// Body for refresh and logout. The field is optional so a missing token can
/// be reported as a 400 rather than a deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequestDto {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenResponseDto {
    pub access: String,
    /// Present only when refresh-token rotation is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}
