#![cfg(test)]
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::{AuthenticatedUser, Role};
use crate::features::auth::store::{TokenBlacklist, User, UserStore};
use crate::features::records::models::{
    DataRecord, NewRecord, OrderBy, OrderField, RecordChanges, RecordFilter,
};
use crate::features::records::store::RecordStore;
use crate::modules::storage::BlobStorage;

pub fn test_user(role: Option<Role>) -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::now_v7(),
        username: "testuser".to_string(),
        email: "testuser@example.com".to_string(),
        role,
    }
}

/// Wrap a router so every request carries the given principal, skipping the
/// real token middleware.
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

pub fn with_role_auth(router: Router, role: Role) -> Router {
    with_auth(router, test_user(Some(role)))
}

pub fn make_record(title: &str, is_active: bool) -> DataRecord {
    let now = Utc::now();
    DataRecord {
        id: Uuid::now_v7(),
        title: title.to_string(),
        description: String::new(),
        file: None,
        created_at: now,
        updated_at: now,
        is_active,
    }
}

/// In-memory record store mirroring the SQL predicate semantics.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<DataRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<DataRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn push(&self, record: DataRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn matches(record: &DataRecord, filter: &RecordFilter) -> bool {
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let hit = record.title.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(is_active) = filter.is_active {
            if record.is_active != is_active {
                return false;
            }
        }
        if let Some(after) = filter.created_after {
            if record.created_at.date_naive() < after {
                return false;
            }
        }
        if let Some(before) = filter.created_before {
            if record.created_at.date_naive() > before {
                return false;
            }
        }
        true
    }

    fn sort(records: &mut [DataRecord], order: OrderBy) {
        records.sort_by(|a, b| {
            let ordering = match order.field {
                OrderField::Title => a.title.cmp(&b.title),
                OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
                OrderField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                OrderField::IsActive => a.is_active.cmp(&b.is_active),
            };
            if order.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(
        &self,
        filter: &RecordFilter,
        order: OrderBy,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<DataRecord>> {
        let mut matched: Vec<DataRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::matches(r, filter))
            .cloned()
            .collect();
        Self::sort(&mut matched, order);

        if let Some((limit, offset)) = page {
            matched = matched
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect();
        }

        Ok(matched)
    }

    async fn count(&self, filter: &RecordFilter) -> Result<i64> {
        let count = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::matches(r, filter))
            .count();
        Ok(count as i64)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DataRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert(&self, record: NewRecord) -> Result<DataRecord> {
        let now = Utc::now();
        let row = DataRecord {
            id: Uuid::now_v7(),
            title: record.title,
            description: record.description,
            file: record.file,
            created_at: now,
            updated_at: now,
            is_active: record.is_active,
        };
        self.records.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: RecordChanges) -> Result<Option<DataRecord>> {
        let mut records = self.records.lock().unwrap();
        let Some(row) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(file) = changes.file {
            row.file = Some(file);
        }
        if let Some(is_active) = changes.is_active {
            row.is_active = is_active;
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn set_active_many(&self, ids: &[Uuid], is_active: bool) -> Result<u64> {
        let mut records = self.records.lock().unwrap();
        let mut changed = 0;
        for row in records.iter_mut().filter(|r| ids.contains(&r.id)) {
            row.is_active = is_active;
            row.updated_at = Utc::now();
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Vec<User>,
}

impl MemoryUserStore {
    pub fn with_users(users: Vec<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }
}

#[derive(Default)]
pub struct MemoryTokenBlacklist {
    revoked: Mutex<HashSet<String>>,
}

impl MemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for MemoryTokenBlacklist {
    async fn is_blacklisted(&self, jti: &str) -> Result<bool> {
        Ok(self.revoked.lock().unwrap().contains(jti))
    }

    async fn blacklist(&self, jti: &str, _expires_at: DateTime<Utc>) -> Result<()> {
        self.revoked.lock().unwrap().insert(jti.to_string());
        Ok(())
    }
}

/// Blob store that records what was uploaded and deleted.
#[derive(Default)]
pub struct MemoryBlobStorage {
    pub uploads: Mutex<Vec<(String, String)>>,
    pub deletes: Mutex<Vec<String>>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    fn generate_key(&self, original_filename: &str) -> String {
        let extension = original_filename.rsplit('.').next().unwrap_or("bin");
        format!("records/{}.{}", Uuid::now_v7(), extension)
    }

    async fn upload(&self, key: &str, _data: Vec<u8>, content_type: &str) -> Result<()> {
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn file_url(&self, key: &str) -> String {
        format!("http://testserver/{}", key)
    }
}

pub fn make_db_user(username: &str, role: Option<&str>, is_active: bool) -> User {
    User {
        id: Uuid::now_v7(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: crate::features::auth::services::auth_service::hash_password(
            "secret123", "pepper",
        ),
        password_salt: "pepper".to_string(),
        role: role.map(|r| r.to_string()),
        is_active,
        created_at: Utc::now(),
    }
}
