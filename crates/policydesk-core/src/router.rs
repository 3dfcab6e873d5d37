//! Session router: the single owner of the persisted session.
//!
//! The router rehydrates the session once at startup, applies login and
//! logout to both the store and in-memory state, and publishes read-only
//! snapshots to the presentation layer through a `watch` channel.
//!
//! Store access goes through a fair read/write gate. Mutations hold it
//! exclusively, so a second login or logout issued while one is in flight
//! queues behind it instead of racing on last-write-wins. Reads share it.

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::error::{SessionError, StoreOp};
use crate::navigation::{select_navigation_tree, NavigationTree};
use crate::session::{Session, UserData};
use crate::store::KeyValueStore;

/// Storage key holding the serialized user record
pub const SESSION_KEY: &str = "@user_data";

pub struct SessionRouter<S> {
    store: S,
    gate: RwLock<()>,
    state: watch::Sender<Option<Session>>,
}

impl<S: KeyValueStore> SessionRouter<S> {
    /// Router with empty in-memory state. Call [`rehydrate`](Self::rehydrate)
    /// or use [`start`](Self::start) to pick up a persisted session.
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            store,
            gate: RwLock::new(()),
            state,
        }
    }

    /// Create the router and restore any persisted session
    pub async fn start(store: S) -> Self {
        let router = Self::new(store);
        router.rehydrate().await;
        router
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted session into memory and return the resulting tree.
    pub async fn rehydrate(&self) -> NavigationTree {
        let _guard = self.gate.write().await;
        let session = self.read_session().await;
        let tree = select_navigation_tree(session.as_ref());
        info!(backend = self.store.name(), %tree, "Session rehydrated");
        self.state.send_replace(session);
        tree
    }

    /// Read the persisted session without touching in-memory state.
    ///
    /// Never fails: a missing key, unreadable storage or a malformed record
    /// all come back as `None`, the latter two with a logged diagnostic.
    pub async fn load_session(&self) -> Option<Session> {
        let _guard = self.gate.read().await;
        self.read_session().await
    }

    async fn read_session(&self) -> Option<Session> {
        let raw = match self.store.get_item(SESSION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted session");
                return None;
            }
            Err(e) => {
                let err = SessionError::persistence(StoreOp::Read, SESSION_KEY, e);
                warn!(error = %err, "Failed to read persisted session");
                return None;
            }
        };

        match UserData::from_json(&raw) {
            Ok(user) => Some(Session::new(user)),
            Err(e) => {
                warn!(
                    error = %e.redacted(),
                    bytes = raw.len(),
                    "Discarding malformed persisted session"
                );
                None
            }
        }
    }

    /// Persist `user` as the session and make it current.
    ///
    /// Replaces any existing session. If the store write fails nothing in
    /// memory changes and the caller gets `SessionError::Persistence`.
    pub async fn login(&self, user: UserData) -> Result<Session, SessionError> {
        let raw = user.to_json()?;

        let _guard = self.gate.write().await;
        if let Err(e) = self.store.set_item(SESSION_KEY, &raw).await {
            let err = SessionError::persistence(StoreOp::Write, SESSION_KEY, e);
            warn!(error = %err, user_id = %user.id, "Login not persisted");
            return Err(err);
        }

        let session = Session::new(user);
        let tree = select_navigation_tree(Some(&session));
        self.state.send_replace(Some(session.clone()));
        info!(user_id = %session.id(), %tree, "Login successful");
        Ok(session)
    }

    /// Remove the persisted session and clear in-memory state.
    ///
    /// Memory is cleared even when the store removal fails so the user is
    /// never left looking logged in; the failure is returned as a non-fatal
    /// `SessionError::Persistence` for the caller to report.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _guard = self.gate.write().await;
        let removed = self.store.remove_item(SESSION_KEY).await;
        let previous = self.state.send_replace(None);

        let user_id = previous.as_ref().map(|s| s.id().to_string());
        match removed {
            Ok(()) => {
                info!(?user_id, "Logged out");
                Ok(())
            }
            Err(e) => {
                let err = SessionError::persistence(StoreOp::Remove, SESSION_KEY, e);
                warn!(error = %err, ?user_id, "Logged out, but persisted session was not removed");
                Err(err)
            }
        }
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Tree for the current in-memory session
    pub fn navigation_tree(&self) -> NavigationTree {
        select_navigation_tree(self.state.borrow().as_ref())
    }

    /// Change feed for consumers; every login and logout publishes a new value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }
}

// ============================================================================
// Tests
// ============================================================================
