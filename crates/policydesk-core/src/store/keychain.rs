use async_trait::async_trait;
use keyring::Entry;

use super::{KeyValueStore, StoreResult};
use crate::error::StoreError;

/// Default keychain service name
pub const DEFAULT_SERVICE: &str = "policydesk";

/// Store backed by the OS keychain, one entry per key under `service`.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Keychain calls block, so run them off the async worker threads
    async fn with_entry<T, F>(&self, key: &str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> StoreResult<T> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key)?;
            f(entry)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("keychain task failed: {}", e)))?
    }
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    fn name(&self) -> &str {
        "keyring"
    }

    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let value = value.to_string();
        self.with_entry(key, move |entry| Ok(entry.set_password(&value)?))
            .await
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service() {
        let store = KeyringStore::default();
        assert_eq!(store.service(), DEFAULT_SERVICE);
        assert_eq!(store.name(), "keyring");
    }

    // The tests below talk to the real OS keychain (Keychain Services,
    // Credential Manager or the Secret Service over D-Bus). Run them with
    // `cargo test -- --ignored` on a machine with an unlocked keychain.

    #[tokio::test]
    #[ignore = "needs an unlocked OS keychain"]
    async fn test_missing_entry_reads_as_none() {
        let store = KeyringStore::new("policydesk-test-missing");
        assert_eq!(store.get_item("@never_written").await.unwrap(), None);
        store.remove_item("@never_written").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs an unlocked OS keychain"]
    async fn test_values_persist_across_instances() {
        let key = "@policydesk_keychain_round_trip";
        let writer = KeyringStore::new("policydesk-test");
        writer.set_item(key, r#"{"id":"u1","isAdmin":false}"#).await.unwrap();

        // A fresh store opens a fresh keychain entry; the value must come back
        let reader = KeyringStore::new("policydesk-test");
        let stored = reader.get_item(key).await.unwrap();

        reader.remove_item(key).await.unwrap();
        assert_eq!(stored.as_deref(), Some(r#"{"id":"u1","isAdmin":false}"#));
        assert_eq!(reader.get_item(key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "needs an unlocked OS keychain"]
    async fn test_session_survives_restart() {
        use crate::navigation::NavigationTree;
        use crate::router::SessionRouter;
        use crate::session::UserData;

        let service = "policydesk-test-session";
        let first = SessionRouter::start(KeyringStore::new(service)).await;
        let session = first.login(UserData::new("u1", false)).await.unwrap();
        assert_eq!(first.load_session().await, Some(session.clone()));
        drop(first);

        let second = SessionRouter::start(KeyringStore::new(service)).await;
        let restored = second.current();
        second.logout().await.unwrap();

        assert_eq!(restored, Some(session));
        assert_eq!(second.navigation_tree(), NavigationTree::Unauthenticated);
    }
}
