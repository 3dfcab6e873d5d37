//! Navigation trees and the selector that picks one from session state.
//!
//! The presentation layer renders exactly one of three pre-built trees.
//! Which one is a pure function of the current session; see
//! [`select_navigation_tree`].

pub mod routes;

use serde::{Deserialize, Serialize};

use crate::session::Session;

pub use routes::{Screen, Tab};

/// The navigation tree the application shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum NavigationTree {
    /// Onboarding, login and registration stack
    Unauthenticated,
    /// Home, quote and profile tabs
    StandardUser,
    /// Dashboard, user management, claims and profile tabs
    Admin,
}

/// Pick the navigation tree for a session.
pub fn select_navigation_tree(session: Option<&Session>) -> NavigationTree {
    match session {
        None => NavigationTree::Unauthenticated,
        Some(s) if s.is_admin() => NavigationTree::Admin,
        Some(_) => NavigationTree::StandardUser,
    }
}

impl NavigationTree {
    /// Stable identifier used by the presentation layer
    pub fn name(&self) -> &'static str {
        match self {
            NavigationTree::Unauthenticated => "unauthenticated",
            NavigationTree::StandardUser => "standard_user",
            NavigationTree::Admin => "admin",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, NavigationTree::Unauthenticated)
    }
}

impl std::fmt::Display for NavigationTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
