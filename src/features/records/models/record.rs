use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the managed record entity
#[derive(Debug, Clone, FromRow)]
pub struct DataRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Blob-store key of the optional file attachment
    pub file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Fields for inserting a new record. Title and description are expected to
/// be validated and trimmed by the service layer before this is built.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub title: String,
    pub description: String,
    pub file: Option<String>,
    pub is_active: bool,
}

/// Partial update; only supplied fields change.
#[derive(Debug, Clone, Default)]
pub struct RecordChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub file: Option<String>,
    pub is_active: Option<bool>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.file.is_none()
            && self.is_active.is_none()
    }
}

/// Conjunctive filter over the record set. `search` alone is an OR across
/// the two text fields.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
}

/// Allow-listed ordering fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Title,
    CreatedAt,
    UpdatedAt,
    IsActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: OrderField,
    pub descending: bool,
}

impl OrderBy {
    /// Parse an `ordering` query value. Anything outside the allow-list is
    /// rejected with `None`; callers fall back to the default order rather
    /// than raising.
    pub fn parse(value: &str) -> Option<OrderBy> {
        let (descending, name) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };

        let field = match name {
            "title" => OrderField::Title,
            "created_at" => OrderField::CreatedAt,
            "updated_at" => OrderField::UpdatedAt,
            "is_active" => OrderField::IsActive,
            _ => return None,
        };

        Some(OrderBy { field, descending })
    }

    pub fn to_sql(&self) -> String {
        let column = match self.field {
            OrderField::Title => "title",
            OrderField::CreatedAt => "created_at",
            OrderField::UpdatedAt => "updated_at",
            OrderField::IsActive => "is_active",
        };
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {}", column, direction)
    }
}

impl Default for OrderBy {
    /// Most-recently-created first
    fn default() -> Self {
        OrderBy {
            field: OrderField::CreatedAt,
            descending: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_parses_allow_listed_fields() {
        let order = OrderBy::parse("-title").unwrap();
        assert_eq!(order.field, OrderField::Title);
        assert!(order.descending);
        assert_eq!(order.to_sql(), "title DESC");

        let order = OrderBy::parse("updated_at").unwrap();
        assert!(!order.descending);
        assert_eq!(order.to_sql(), "updated_at ASC");
    }

    #[test]
    fn ordering_rejects_unknown_fields() {
        assert!(OrderBy::parse("id").is_none());
        assert!(OrderBy::parse("-description").is_none());
        assert!(OrderBy::parse("").is_none());
    }

    #[test]
    fn default_ordering_is_newest_first() {
        assert_eq!(OrderBy::default().to_sql(), "created_at DESC");
    }
}
