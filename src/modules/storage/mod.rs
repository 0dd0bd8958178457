pub mod minio_client;

pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::Result;

/// Opaque blob store the record `file` field points into.
///
/// Only put/delete-by-key and URL rendering are needed here; clients fetch
/// blob content from the store directly via the rendered URL.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Build a new storage key for an uploaded file, keeping its extension.
    fn generate_key(&self, original_filename: &str) -> String;

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Publicly reachable URL for a stored key.
    fn file_url(&self, key: &str) -> String;
}
