//! Customer identity and the authentication state machine.
//!
//! A client is either anonymous or fully authenticated with both a user and
//! a token; the enum makes the half-signed-in state unrepresentable.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// Errors from auth state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthStateError {
    #[error("not signed in")]
    NotAuthenticated,
}

/// A customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Merge the supplied fields of `update` into the profile.
    pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            self.phone = non_blank(phone);
        }
        if let Some(address) = update.address {
            self.address = non_blank(address);
        }
        self.updated_at = now;
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Partial profile edit. `None` fields are left untouched; a blank phone or
/// address clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Opaque session token issued by the mock auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Authentication state of one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated { user: User, token: AuthToken },
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            Self::Anonymous => None,
        }
    }

    /// anonymous or authenticated -> authenticated as `user`.
    #[must_use]
    pub const fn sign_in(user: User, token: AuthToken) -> Self {
        Self::Authenticated { user, token }
    }

    /// Drop user and token together.
    pub fn sign_out(&mut self) {
        *self = Self::Anonymous;
    }

    /// Replace the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when anonymous.
    pub fn replace_user(&mut self, updated: User) -> Result<(), AuthStateError> {
        match self {
            Self::Authenticated { user, .. } => {
                *user = updated;
                Ok(())
            }
            Self::Anonymous => Err(AuthStateError::NotAuthenticated),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn user() -> User {
        let created = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        User {
            id: UserId::new(1),
            email: Email::parse("maker@example.com").unwrap(),
            first_name: "Mei".to_string(),
            last_name: "Lin".to_string(),
            phone: Some("+886 912 345 678".to_string()),
            address: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_sign_in_and_out() {
        let mut state = AuthState::sign_in(user(), AuthToken::new("mock-jwt-token"));
        assert!(state.is_authenticated());
        assert_eq!(state.user().unwrap().first_name, "Mei");
        assert_eq!(state.token().unwrap().as_str(), "mock-jwt-token");

        state.sign_out();
        assert_eq!(state, AuthState::Anonymous);
        assert!(state.user().is_none());
        assert!(state.token().is_none());
    }

    #[test]
    fn test_replace_user_requires_sign_in() {
        let mut state = AuthState::default();
        assert_eq!(
            state.replace_user(user()),
            Err(AuthStateError::NotAuthenticated)
        );
    }

    #[test]
    fn test_profile_update_merges_supplied_fields() {
        let mut profile = user();
        let later = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
        profile.apply(
            ProfileUpdate {
                first_name: Some("Mei-Ling".to_string()),
                phone: Some(String::new()),
                address: Some("No. 7, Section 5, Xinyi Rd, Taipei".to_string()),
                ..ProfileUpdate::default()
            },
            later,
        );

        assert_eq!(profile.first_name, "Mei-Ling");
        assert_eq!(profile.last_name, "Lin");
        assert_eq!(profile.phone, None);
        assert!(profile.address.is_some());
        assert_eq!(profile.updated_at, later);
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let debug = format!("{:?}", AuthToken::new("mock-jwt-token"));
        assert!(!debug.contains("mock-jwt-token"));
    }

    #[test]
    fn test_snapshot_shape() {
        let anonymous = serde_json::to_value(AuthState::Anonymous).unwrap();
        assert_eq!(anonymous["status"], "anonymous");

        let state = AuthState::sign_in(user(), AuthToken::new("mock-jwt-token"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "authenticated");
        assert_eq!(json["token"], "mock-jwt-token");
        assert_eq!(json["user"]["email"], "maker@example.com");

        let restored: AuthState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, state);
    }
}
