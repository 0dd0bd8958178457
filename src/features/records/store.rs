use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::records::models::{
    DataRecord, NewRecord, OrderBy, RecordChanges, RecordFilter,
};

const SELECT_COLUMNS: &str =
    "SELECT id, title, description, file, created_at, updated_at, is_active FROM data_records";

/// Relational store behind the selector/service layers. Single-statement
/// predicate queries and row mutations; anything richer lives above.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `page` is `(limit, offset)`; `None` returns the full result set.
    async fn list(
        &self,
        filter: &RecordFilter,
        order: OrderBy,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<DataRecord>>;

    async fn count(&self, filter: &RecordFilter) -> Result<i64>;

    async fn get(&self, id: Uuid) -> Result<Option<DataRecord>>;

    async fn insert(&self, record: NewRecord) -> Result<DataRecord>;

    /// Apply the supplied fields; `None` when the id does not exist.
    async fn update(&self, id: Uuid, changes: RecordChanges) -> Result<Option<DataRecord>>;

    /// `false` when the id does not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Returns the number of rows changed; unknown ids are skipped.
    async fn set_active_many(&self, ids: &[Uuid], is_active: bool) -> Result<u64>;

    /// Returns the number of rows removed; unknown ids are skipped.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64>;
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RecordFilter) {
        qb.push(" WHERE TRUE");

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(is_active) = filter.is_active {
            qb.push(" AND is_active = ").push_bind(is_active);
        }

        if let Some(after) = filter.created_after {
            qb.push(" AND created_at::date >= ").push_bind(after);
        }

        if let Some(before) = filter.created_before {
            qb.push(" AND created_at::date <= ").push_bind(before);
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list(
        &self,
        filter: &RecordFilter,
        order: OrderBy,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<DataRecord>> {
        let mut qb = QueryBuilder::new(SELECT_COLUMNS);
        Self::push_filter(&mut qb, filter);

        // Ordering comes from the allow-listed OrderBy enum, never raw input
        qb.push(" ORDER BY ").push(order.to_sql());
        if let Some((limit, offset)) = page {
            qb.push(" LIMIT ").push_bind(limit);
            qb.push(" OFFSET ").push_bind(offset);
        }

        qb.build_query_as::<DataRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list records: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn count(&self, filter: &RecordFilter) -> Result<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM data_records");
        Self::push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DataRecord>> {
        sqlx::query_as::<_, DataRecord>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn insert(&self, record: NewRecord) -> Result<DataRecord> {
        sqlx::query_as::<_, DataRecord>(
            r#"
            INSERT INTO data_records (title, description, file, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, file, created_at, updated_at, is_active
            "#,
        )
        .bind(record.title)
        .bind(record.description)
        .bind(record.file)
        .bind(record.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert record: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: Uuid, changes: RecordChanges) -> Result<Option<DataRecord>> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE data_records SET updated_at = NOW()");

        if let Some(title) = changes.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(description) = changes.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(file) = changes.file {
            qb.push(", file = ").push_bind(file);
        }
        if let Some(is_active) = changes.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING id, title, description, file, created_at, updated_at, is_active");

        qb.build_query_as::<DataRecord>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update record: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM data_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_active_many(&self, ids: &[Uuid], is_active: bool) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE data_records SET is_active = $1, updated_at = NOW() WHERE id = ANY($2)",
        )
        .bind(is_active)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM data_records WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}
