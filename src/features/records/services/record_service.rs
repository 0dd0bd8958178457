use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::records::dtos::UploadedFile;
use crate::features::records::models::{DataRecord, NewRecord, RecordChanges};
use crate::features::records::store::RecordStore;
use crate::modules::storage::BlobStorage;
use crate::shared::constants::TITLE_MAX_LEN;

/// Validated mutations over the record entity. Title and description are
/// trimmed here so the invariant holds regardless of transport.
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    storage: Arc<dyn BlobStorage>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, storage: Arc<dyn BlobStorage>) -> Self {
        Self { store, storage }
    }

    fn validate_title(title: &str) -> Result<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(AppError::Validation(format!(
                "Title cannot exceed {} characters",
                TITLE_MAX_LEN
            )));
        }
        Ok(trimmed.to_string())
    }

    async fn store_upload(&self, upload: UploadedFile) -> Result<String> {
        let key = self.storage.generate_key(&upload.filename);
        self.storage
            .upload(&key, upload.data, &upload.content_type)
            .await?;
        debug!("Stored attachment under key {}", key);
        Ok(key)
    }

    pub async fn create(
        &self,
        title: &str,
        description: Option<String>,
        file: Option<UploadedFile>,
        is_active: Option<bool>,
    ) -> Result<DataRecord> {
        let title = Self::validate_title(title)?;
        let description = description
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        let file_key = match file {
            Some(upload) => Some(self.store_upload(upload).await?),
            None => None,
        };

        let record = self
            .store
            .insert(NewRecord {
                title,
                description,
                file: file_key,
                is_active: is_active.unwrap_or(true),
            })
            .await?;

        info!("Record created: id={}", record.id);
        Ok(record)
    }

    /// Partial update: only supplied fields change. A supplied file replaces
    /// the stored blob.
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        description: Option<String>,
        file: Option<UploadedFile>,
        is_active: Option<bool>,
    ) -> Result<DataRecord> {
        let existing = self.require(id).await?;

        let mut changes = RecordChanges {
            title: title.as_deref().map(Self::validate_title).transpose()?,
            description: description.map(|d| d.trim().to_string()),
            is_active,
            ..Default::default()
        };

        if let Some(upload) = file {
            changes.file = Some(self.store_upload(upload).await?);
            if let Some(old_key) = &existing.file {
                self.storage.delete(old_key).await?;
            }
        }

        let record = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!("Record updated: id={}", record.id);
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let existing = self.require(id).await?;

        if let Some(key) = &existing.file {
            self.storage.delete(key).await?;
        }

        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }

        info!("Record deleted: id={}", id);
        Ok(())
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<DataRecord> {
        let existing = self.require(id).await?;

        let changes = RecordChanges {
            is_active: Some(!existing.is_active),
            ..Default::default()
        };

        self.store
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Set the active flag on every matching record; unknown ids are
    /// silently skipped and only the affected count is reported.
    pub async fn bulk_update_active(&self, ids: &[Uuid], is_active: bool) -> Result<u64> {
        if ids.is_empty() {
            return Err(AppError::Validation("No record IDs provided".to_string()));
        }
        self.store.set_active_many(ids, is_active).await
    }

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Err(AppError::Validation("No record IDs provided".to_string()));
        }
        self.store.delete_many(ids).await
    }

    async fn require(&self, id: Uuid) -> Result<DataRecord> {
        self.store.get(id).await?.ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Record with ID {} not found", id))
}
