//! The persisted session record and the snapshot type handed to consumers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SessionError;

/// Field names owned by `UserData` itself; extras may not shadow them.
const RESERVED_FIELDS: [&str; 2] = ["id", "isAdmin"];

/// The user record written under the session key.
///
/// `id` and `isAdmin` are required. Anything else the login flow supplies
/// (name, email, policy numbers) is kept in `extra` and round-trips untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub id: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserData {
    pub fn new(id: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id: id.into(),
            is_admin,
            extra: Map::new(),
        }
    }

    /// Attach an additional field to the record
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Reject records that would not survive a save/load cycle intact
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.id.trim().is_empty() {
            return Err(SessionError::InvalidRecord("empty user id".to_string()));
        }
        if let Some(key) = RESERVED_FIELDS.iter().find(|k| self.extra.contains_key(**k)) {
            return Err(SessionError::InvalidRecord(format!(
                "extra field '{}' shadows a required field",
                key
            )));
        }
        Ok(())
    }

    /// Parse a stored record. Any shape problem is an error; there is no
    /// partially-filled result.
    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        let data: UserData = serde_json::from_str(raw)?;
        data.validate()?;
        Ok(data)
    }

    /// Compact JSON, `id` and `isAdmin` first
    pub fn to_json(&self) -> Result<String, SessionError> {
        self.validate()?;
        Ok(serde_json::to_string(self)?)
    }
}

/// Read-only snapshot of the logged-in user.
///
/// Absence of a session is `Option::None` at every API boundary, so a
/// `Session` value always means "logged in".
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: UserData,
}

impl Session {
    pub(crate) fn new(user: UserData) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &UserData {
        &self.user
    }

    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }

    pub fn into_user(self) -> UserData {
        self.user
    }
}
