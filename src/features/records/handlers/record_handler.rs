use axum::{
    extract::{Multipart, OriginalUri, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppPath, AppQuery};
use crate::features::auth::guards::{RequireAdmin, RequireAnyRole, RequireEditor};
use crate::features::records::dtos::{
    RecordFilterQuery, RecordForm, RecordFormDto, RecordResponseDto, UploadedFile,
};
use crate::features::records::routes::RecordsState;
use crate::shared::types::{ApiResponse, Page, PaginationQuery};

/// Read the create/update multipart form. Unknown fields are ignored; a file
/// part without a filename counts as no attachment.
async fn parse_record_form(mut multipart: Multipart) -> Result<RecordForm> {
    let mut form = RecordForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "title" => {
                form.title = Some(read_text(field, "title").await?);
            }
            "description" => {
                form.description = Some(read_text(field, "description").await?);
            }
            "is_active" => {
                let text = read_text(field, "is_active").await?;
                form.is_active = Some(text.eq_ignore_ascii_case("true"));
            }
            "file" => {
                let filename = field.file_name().map(|s| s.to_string()).filter(|s| !s.is_empty());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                if let Some(filename) = filename {
                    let data = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read file data: {}", e))
                    })?;
                    form.file = Some(UploadedFile {
                        data: data.to_vec(),
                        filename,
                        content_type,
                    });
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

fn title_required_error() -> AppError {
    AppError::ValidationErrors(serde_json::json!({
        "title": ["This field is required."]
    }))
}

/// List records with filtering, search, ordering and pagination
#[utoipa::path(
    get,
    path = "/records/",
    params(RecordFilterQuery, PaginationQuery),
    responses(
        (status = 200, description = "Paginated record list", body = ApiResponse<Page<RecordResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Role required")
    ),
    tag = "records",
    security(("bearer_auth" = []))
)]
pub async fn list_records(
    RequireAnyRole(_user): RequireAnyRole,
    State(state): State<RecordsState>,
    AppQuery(filter_query): AppQuery<RecordFilterQuery>,
    AppQuery(pagination): AppQuery<PaginationQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<ApiResponse<Page<RecordResponseDto>>>> {
    let filter = filter_query.to_filter();
    let order = filter_query.order_by();

    let (records, count) = state.selector.list(&filter, order, &pagination).await?;

    let results = records
        .into_iter()
        .map(|r| RecordResponseDto::from_record(r, state.storage.as_ref()))
        .collect();

    let page = Page::new(results, count, &pagination, &uri);
    Ok(Json(ApiResponse::success(Some(page), None)))
}

/// Create a record
///
/// Accepts multipart/form-data with `title` (required), `description`,
/// `is_active` and an optional `file` attachment.
#[utoipa::path(
    post,
    path = "/records/create/",
    request_body(content = RecordFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Record created", body = ApiResponse<RecordResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor or Admin role required")
    ),
    tag = "records",
    security(("bearer_auth" = []))
)]
pub async fn create_record(
    RequireEditor(_user): RequireEditor,
    State(state): State<RecordsState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<RecordResponseDto>>)> {
    let form = parse_record_form(multipart).await?;

    let title = form.title.ok_or_else(title_required_error)?;

    let record = state
        .service
        .create(&title, form.description, form.file, form.is_active)
        .await?;

    let dto = RecordResponseDto::from_record(record, state.storage.as_ref());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(Some(dto), None)),
    ))
}

/// Retrieve a single record
#[utoipa::path(
    get,
    path = "/records/{id}/",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record found", body = ApiResponse<RecordResponseDto>),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Role required")
    ),
    tag = "records",
    security(("bearer_auth" = []))
)]
pub async fn retrieve_record(
    RequireAnyRole(_user): RequireAnyRole,
    State(state): State<RecordsState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<RecordResponseDto>>> {
    let record = state
        .selector
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;

    let dto = RecordResponseDto::from_record(record, state.storage.as_ref());
    Ok(Json(ApiResponse::success(Some(dto), None)))
}

async fn apply_update(
    state: RecordsState,
    id: Uuid,
    multipart: Multipart,
    title_required: bool,
) -> Result<Json<ApiResponse<RecordResponseDto>>> {
    if state.selector.get_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Resource not found".to_string()));
    }

    let form = parse_record_form(multipart).await?;

    if title_required && form.title.is_none() {
        return Err(title_required_error());
    }

    let record = state
        .service
        .update(id, form.title, form.description, form.file, form.is_active)
        .await?;

    let dto = RecordResponseDto::from_record(record, state.storage.as_ref());
    Ok(Json(ApiResponse::success(Some(dto), None)))
}

/// Replace a record (title required)
#[utoipa::path(
    put,
    path = "/records/{id}/update/",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body(content = RecordFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Record updated", body = ApiResponse<RecordResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor or Admin role required")
    ),
    tag = "records",
    security(("bearer_auth" = []))
)]
pub async fn update_record(
    RequireEditor(_user): RequireEditor,
    State(state): State<RecordsState>,
    AppPath(id): AppPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<RecordResponseDto>>> {
    apply_update(state, id, multipart, true).await
}

/// Partially update a record
#[utoipa::path(
    patch,
    path = "/records/{id}/update/",
    params(("id" = Uuid, Path, description = "Record id")),
    request_body(content = RecordFormDto, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Record updated", body = ApiResponse<RecordResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Editor or Admin role required")
    ),
    tag = "records",
    security(("bearer_auth" = []))
)]
pub async fn partial_update_record(
    RequireEditor(_user): RequireEditor,
    State(state): State<RecordsState>,
    AppPath(id): AppPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<RecordResponseDto>>> {
    apply_update(state, id, multipart, false).await
}

/// Delete a record
#[utoipa::path(
    delete,
    path = "/records/{id}/delete/",
    params(("id" = Uuid, Path, description = "Record id")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin role required")
    ),
    tag = "records",
    security(("bearer_auth" = []))
)]
pub async fn delete_record(
    RequireAdmin(_user): RequireAdmin,
    State(state): State<RecordsState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode> {
    if state.selector.get_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Resource not found".to_string()));
    }

    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
