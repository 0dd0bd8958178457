use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::records::models::{DataRecord, OrderBy, RecordFilter};
use crate::modules::storage::BlobStorage;

/// Query parameters accepted by the record list endpoint. All optional;
/// invalid `ordering` values silently fall back to the default order.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RecordFilterQuery {
    /// Case-insensitive substring match against title or description
    pub search: Option<String>,
    /// "true" (any casing) selects active records; any other value inactive
    pub is_active: Option<String>,
    /// Inclusive lower bound on the creation date (YYYY-MM-DD)
    pub created_at_after: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date (YYYY-MM-DD)
    pub created_at_before: Option<NaiveDate>,
    /// One of: title, created_at, updated_at, is_active (optionally `-` prefixed)
    pub ordering: Option<String>,
}

impl RecordFilterQuery {
    pub fn to_filter(&self) -> RecordFilter {
        RecordFilter {
            search: self.search.clone().filter(|s| !s.is_empty()),
            is_active: self
                .is_active
                .as_deref()
                .map(|v| v.eq_ignore_ascii_case("true")),
            created_after: self.created_at_after,
            created_before: self.created_at_before,
        }
    }

    pub fn order_by(&self) -> OrderBy {
        self.ordering
            .as_deref()
            .and_then(OrderBy::parse)
            .unwrap_or_default()
    }
}

/// Record representation returned by every record endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// URL of the file attachment, if any
    pub file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl RecordResponseDto {
    pub fn from_record(record: DataRecord, storage: &dyn BlobStorage) -> Self {
        let file = record.file.as_deref().map(|key| storage.file_url(key));
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            file,
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_active: record.is_active,
        }
    }
}

/// Create/update form for OpenAPI documentation.
/// The handlers parse the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct RecordFormDto {
    /// Record title (required on create and PUT, at most 200 characters)
    pub title: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// "true" or "false"
    pub is_active: Option<String>,
    /// Optional file attachment
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
}

/// A file read out of a multipart field
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// Parsed multipart form for create/update
#[derive(Debug, Default)]
pub struct RecordForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub file: Option<UploadedFile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::records::models::OrderField;

    #[test]
    fn is_active_parses_case_insensitively() {
        let query = RecordFilterQuery {
            is_active: Some("TRUE".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().is_active, Some(true));

        // Anything that is not "true" means false, mirroring the lenient
        // boolean parsing of the list endpoint.
        let query = RecordFilterQuery {
            is_active: Some("yes".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().is_active, Some(false));

        let query = RecordFilterQuery::default();
        assert_eq!(query.to_filter().is_active, None);
    }

    #[test]
    fn invalid_ordering_falls_back_to_default() {
        let query = RecordFilterQuery {
            ordering: Some("secret_field".to_string()),
            ..Default::default()
        };
        let order = query.order_by();
        assert_eq!(order.field, OrderField::CreatedAt);
        assert!(order.descending);
    }

    #[test]
    fn empty_search_is_ignored() {
        let query = RecordFilterQuery {
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(query.to_filter().search, None);
    }
}
