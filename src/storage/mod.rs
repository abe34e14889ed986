use async_trait::async_trait;

use crate::error::Result;

pub mod image;
pub mod local;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use image::DecodedImage;
pub use local::LocalObjectStore;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryObjectStore;

/// Blob storage for member photos. Keys are relative paths such as
/// `user_photos/<id>-selfie.jpg`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `data` under `key` and returns its download URL.
    async fn upload(&self, key: &str, content_type: &str, data: &[u8]) -> Result<String>;

    async fn delete(&self, key: &str) -> Result<()>;
}
