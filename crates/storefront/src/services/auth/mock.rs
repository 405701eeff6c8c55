//! In-memory auth service with simulated latency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bizoe_core::{AuthToken, Email, ProfileUpdate, User, UserId};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

use super::{AuthError, AuthService, AuthSession, NewAccount};
use crate::config::MockLatencyConfig;

/// Accepts any well-formed credentials.
///
/// Login returns the registered profile for the email if there is one,
/// otherwise a profile derived from the address. Registering an email that
/// already exists replaces the stored profile.
#[derive(Debug)]
pub struct MockAuthService {
    auth_latency: Duration,
    account_latency: Duration,
    accounts: RwLock<HashMap<Email, User>>,
    next_id: AtomicI32,
    available: AtomicBool,
}

impl MockAuthService {
    #[must_use]
    pub fn new(latency: &MockLatencyConfig) -> Self {
        Self {
            auth_latency: latency.auth,
            account_latency: latency.account,
            accounts: RwLock::new(HashMap::new()),
            next_id: AtomicI32::new(1),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: every call fails with `Unavailable` until
    /// re-enabled.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    async fn round_trip(&self, latency: Duration) -> Result<(), AuthError> {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.available.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(AuthError::Unavailable)
        }
    }

    fn allocate_id(&self) -> UserId {
        UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn issue_token() -> AuthToken {
        AuthToken::new(format!("mock-{}", Uuid::new_v4()))
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    #[instrument(skip(self))]
    async fn login(&self, email: &Email) -> Result<AuthSession, AuthError> {
        self.round_trip(self.auth_latency).await?;

        if let Some(user) = self.accounts.read().await.get(email).cloned() {
            return Ok(AuthSession {
                user,
                token: Self::issue_token(),
            });
        }

        let now = Utc::now();
        let user = User {
            id: self.allocate_id(),
            email: email.clone(),
            first_name: email.local_part().to_string(),
            last_name: String::new(),
            phone: None,
            address: None,
            created_at: now,
            updated_at: now,
        };
        self.accounts
            .write()
            .await
            .insert(email.clone(), user.clone());

        Ok(AuthSession {
            user,
            token: Self::issue_token(),
        })
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn register(&self, account: NewAccount) -> Result<AuthSession, AuthError> {
        self.round_trip(self.auth_latency).await?;

        let now = Utc::now();
        let mut accounts = self.accounts.write().await;
        let id = accounts
            .get(&account.email)
            .map_or_else(|| self.allocate_id(), |existing| existing.id);
        let user = User {
            id,
            email: account.email.clone(),
            first_name: account.first_name,
            last_name: account.last_name,
            phone: Some(account.phone).filter(|p| !p.is_empty()),
            address: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.email, user.clone());
        drop(accounts);

        Ok(AuthSession {
            user,
            token: Self::issue_token(),
        })
    }

    #[instrument(skip(self, user, update), fields(user_id = %user.id))]
    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<User, AuthError> {
        self.round_trip(self.account_latency).await?;

        let mut updated = user.clone();
        updated.apply(update, Utc::now());
        self.accounts
            .write()
            .await
            .insert(updated.email.clone(), updated.clone());
        Ok(updated)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn change_password(&self, user: &User) -> Result<(), AuthError> {
        self.round_trip(self.account_latency).await?;
        tracing::info!("Password changed");
        Ok(())
    }
}
