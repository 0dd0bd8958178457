use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::records::models::{DataRecord, OrderBy, RecordFilter};
use crate::features::records::store::RecordStore;
use crate::shared::types::PaginationQuery;

/// Read-only queries over the record entity. Mutations live in the service
/// layer; the split keeps validation centralized there.
pub struct RecordSelector {
    store: Arc<dyn RecordStore>,
}

impl RecordSelector {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<DataRecord>> {
        self.store
            .list(&RecordFilter::default(), OrderBy::default(), None)
            .await
    }

    pub async fn get_active(&self) -> Result<Vec<DataRecord>> {
        self.by_activity(true).await
    }

    pub async fn get_inactive(&self) -> Result<Vec<DataRecord>> {
        self.by_activity(false).await
    }

    async fn by_activity(&self, is_active: bool) -> Result<Vec<DataRecord>> {
        let filter = RecordFilter {
            is_active: Some(is_active),
            ..Default::default()
        };
        self.store.list(&filter, OrderBy::default(), None).await
    }

    /// `None` when the id is unknown; absence is not a fault here.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<DataRecord>> {
        self.store.get(id).await
    }

    /// Case-insensitive substring search over title or description
    pub async fn search(&self, query: &str) -> Result<Vec<DataRecord>> {
        let filter = RecordFilter {
            search: Some(query.to_string()),
            ..Default::default()
        };
        self.store.list(&filter, OrderBy::default(), None).await
    }

    /// Ordered listing; an ordering value outside the allow-list silently
    /// falls back to the default order.
    pub async fn get_ordered(&self, ordering: &str) -> Result<Vec<DataRecord>> {
        let order = OrderBy::parse(ordering).unwrap_or_default();
        self.store
            .list(&RecordFilter::default(), order, None)
            .await
    }

    /// One page of filtered, ordered results plus the total count
    pub async fn list(
        &self,
        filter: &RecordFilter,
        order: OrderBy,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<DataRecord>, i64)> {
        let count = self.store.count(filter).await?;
        let rows = self
            .store
            .list(filter, order, Some((pagination.limit(), pagination.offset())))
            .await?;
        Ok((rows, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{make_record, MemoryRecordStore};
    use chrono::Duration;

    fn seeded_selector() -> (RecordSelector, Vec<DataRecord>) {
        let now = chrono::Utc::now();
        let mut records = vec![
            make_record("Annual Report", true),
            make_record("Budget plan", true),
            make_record("Old archive", false),
        ];
        // Stagger creation times so default ordering is deterministic
        for (i, record) in records.iter_mut().enumerate() {
            record.created_at = now - Duration::days(i as i64);
            record.updated_at = record.created_at;
        }
        records[2].description = "quarterly report scans".to_string();

        let store = Arc::new(MemoryRecordStore::with_records(records.clone()));
        (RecordSelector::new(store), records)
    }

    #[tokio::test]
    async fn get_all_returns_newest_first() {
        let (selector, records) = seeded_selector();

        let all = selector.get_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, records[0].id);
        assert_eq!(all[2].id, records[2].id);
    }

    #[tokio::test]
    async fn activity_split() {
        let (selector, _) = seeded_selector();

        let active = selector.get_active().await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|r| r.is_active));

        let inactive = selector.get_inactive().await.unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].title, "Old archive");
    }

    #[tokio::test]
    async fn search_matches_title_and_description_case_insensitively() {
        let (selector, _) = seeded_selector();

        let hits = selector.search("REPORT").await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = selector.search("budget").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Budget plan");

        let hits = selector.search("nothing here").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn get_ordered_falls_back_on_unknown_field() {
        let (selector, records) = seeded_selector();

        let by_title = selector.get_ordered("title").await.unwrap();
        assert_eq!(by_title[0].title, "Annual Report");
        assert_eq!(by_title[2].title, "Old archive");

        // Unknown ordering value falls back to newest first
        let fallback = selector.get_ordered("id; DROP TABLE").await.unwrap();
        assert_eq!(fallback[0].id, records[0].id);
    }


    #[tokio::test]
    async fn creation_date_bounds_are_inclusive() {
        // Records are created today, yesterday and the day before
        let (selector, records) = seeded_selector();
        let newest = records[0].created_at.date_naive();
        let middle = records[1].created_at.date_naive();
        let oldest = records[2].created_at.date_naive();

        let filter = RecordFilter {
            created_after: Some(oldest),
            created_before: Some(newest),
            ..Default::default()
        };
        let (rows, count) = selector
            .list(&filter, OrderBy::default(), &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(rows.len(), 3);

        // A bound landing exactly on a record's creation date keeps it
        let filter = RecordFilter {
            created_after: Some(middle),
            created_before: Some(middle),
            ..Default::default()
        };
        let (rows, count) = selector
            .list(&filter, OrderBy::default(), &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(rows[0].id, records[1].id);

        // Moving the upper bound below the oldest record excludes everything
        let filter = RecordFilter {
            created_before: Some(oldest - Duration::days(1)),
            ..Default::default()
        };
        let (rows, _) = selector
            .list(&filter, OrderBy::default(), &PaginationQuery::default())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn list_pages_and_counts_the_full_match() {
        let (selector, records) = seeded_selector();

        let pagination = PaginationQuery {
            page: 2,
            page_size: 2,
        };
        let (rows, count) = selector
            .list(&RecordFilter::default(), OrderBy::default(), &pagination)
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, records[2].id);
    }
}
