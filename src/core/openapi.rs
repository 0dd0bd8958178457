use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::{self, dtos as auth_dtos};
use crate::features::records::{dtos as records_dtos, handlers as records_handlers};
use crate::shared::types::{ApiResponse, Page};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::logout,
        // Records
        records_handlers::list_records,
        records_handlers::create_record,
        records_handlers::retrieve_record,
        records_handlers::update_record,
        records_handlers::partial_update_record,
        records_handlers::delete_record,
    ),
    components(
        schemas(
            // Auth
            auth::model::Role,
            auth::model::AuthenticatedUser,
            auth_dtos::LoginRequestDto,
            auth_dtos::LoginResponseDto,
            auth_dtos::UserInfoDto,
            auth_dtos::RefreshTokenRequestDto,
            auth_dtos::RefreshTokenResponseDto,
            ApiResponse<auth_dtos::LoginResponseDto>,
            ApiResponse<auth_dtos::RefreshTokenResponseDto>,
            // Records
            records_dtos::RecordResponseDto,
            records_dtos::RecordFormDto,
            Page<records_dtos::RecordResponseDto>,
            ApiResponse<records_dtos::RecordResponseDto>,
            ApiResponse<Page<records_dtos::RecordResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Login, token refresh and logout"),
        (name = "records", description = "Document record management"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "RecordHub API",
        version = "0.1.0",
        description = "API documentation for RecordHub",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
