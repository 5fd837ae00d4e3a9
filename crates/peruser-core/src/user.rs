//! The user record and the payloads that create and modify it.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{ApiKey, UserIndex};
use crate::validation::{validate_index, validate_key, validate_name};

/// A stored user record.
///
/// `admin` is only meaningful while `enabled` is true. Code deciding on
/// privileges goes through [`User::is_enabled`] and [`User::is_admin`], never
/// through the raw fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub index: UserIndex,
    pub key: ApiKey,
    pub name: String,
    pub admin: bool,
    pub enabled: bool,
}

impl User {
    /// The account is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Effective admin status: the flag counts only on an enabled account.
    pub fn is_admin(&self) -> bool {
        self.is_enabled() && self.admin
    }

    /// The account is active and its own index is `index`.
    pub fn owns(&self, index: &UserIndex) -> bool {
        self.is_enabled() && &self.index == index
    }
}

/// Body of a create request.
///
/// `index` and `key` may be omitted, in which case the store assigns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    #[serde(default)]
    pub index: Option<UserIndex>,
    #[serde(default)]
    pub key: Option<ApiKey>,
    pub name: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl NewUser {
    /// An enabled, non-admin user with store-assigned index and key.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            index: None,
            key: None,
            name: name.into(),
            admin: false,
            enabled: true,
        }
    }

    pub fn index(mut self, index: impl Into<UserIndex>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn key(mut self, key: impl Into<ApiKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Check the fields that were supplied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(index) = &self.index {
            validate_index(index)?;
        }
        if let Some(key) = &self.key {
            validate_key(key)?;
        }
        validate_name(&self.name)
    }

    /// Complete the record once the store has settled index and key.
    pub fn into_user(self, index: UserIndex, key: ApiKey) -> User {
        User {
            index,
            key,
            name: self.name,
            admin: self.admin,
            enabled: self.enabled,
        }
    }
}

/// Body of an update request. Absent fields are left unchanged.
///
/// There is no `index` field: the index is immutable, and a body naming it is
/// rejected at deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ApiKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = &self.key {
            validate_key(key)?;
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }

    /// Whether the update touches the privilege fields.
    pub fn touches_privileges(&self) -> bool {
        self.admin.is_some() || self.enabled.is_some()
    }

    /// Apply the present fields to `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(key) = &self.key {
            user.key = key.clone();
        }
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(admin) = self.admin {
            user.admin = admin;
        }
        if let Some(enabled) = self.enabled {
            user.enabled = enabled;
        }
    }
}
