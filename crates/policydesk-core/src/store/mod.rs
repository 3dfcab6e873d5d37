//! Key-value storage backends for the session record.
//!
//! This module provides:
//! - `KeyValueStore`: the async get/set/remove seam the router persists through
//! - `MemoryStore`: process-local map, nothing survives a restart
//! - `FileStore`: one JSON file per key in a data directory
//! - `KeyringStore`: OS keychain entry per key

pub mod file;
pub mod keychain;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

pub use file::FileStore;
pub use keychain::KeyringStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Minimal string key-value store.
///
/// Removing a key that is not present succeeds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Backend name for diagnostics
    fn name(&self) -> &str;

    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    async fn remove_item(&self, key: &str) -> StoreResult<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key).await
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key).await
    }
}
