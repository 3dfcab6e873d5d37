//! Policydesk core - session routing for the policy quoting and claims app.
//!
//! The [`SessionRouter`] owns the persisted user record, decides which
//! [`NavigationTree`] the front-end shows, and keeps that decision in sync
//! with login and logout. Storage is pluggable through [`KeyValueStore`].

pub mod config;
pub mod error;
pub mod navigation;
pub mod router;
pub mod session;
pub mod store;

pub use config::{Config, StorageBackend};
pub use error::{SessionError, StoreError, StoreOp};
pub use navigation::{select_navigation_tree, NavigationTree, Screen, Tab};
pub use router::{SessionRouter, SESSION_KEY};
pub use session::{Session, UserData};
pub use store::{FileStore, KeyValueStore, KeyringStore, MemoryStore};
