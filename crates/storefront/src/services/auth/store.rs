//! Auth store: the auth state machine over a persisted snapshot.

use bizoe_core::{AuthState, User};
use tracing::instrument;

use super::{AuthError, AuthSession};
use crate::models::session_keys;
use crate::storage::SnapshotStore;

/// Auth state operations for one client.
pub struct AuthStore<'a, S> {
    store: &'a S,
}

impl<'a, S: SnapshotStore> AuthStore<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Current state; anonymous when nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the snapshot cannot be read.
    pub async fn state(&self) -> Result<AuthState, AuthError> {
        Ok(self
            .store
            .load::<AuthState>(session_keys::AUTH)
            .await?
            .unwrap_or_default())
    }

    /// The signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the snapshot cannot be read.
    pub async fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.state().await?.user().cloned())
    }

    /// Record a successful login or registration.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the snapshot cannot be written.
    #[instrument(skip(self, session), fields(user_id = %session.user.id))]
    pub async fn sign_in(&self, session: AuthSession) -> Result<AuthState, AuthError> {
        let state = AuthState::sign_in(session.user, session.token);
        self.store.save(session_keys::AUTH, &state).await?;
        tracing::info!("Signed in");
        Ok(state)
    }

    /// Drop the user and token together.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the snapshot cannot be written.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let mut state = self.state().await?;
        state.sign_out();
        self.store.save(session_keys::AUTH, &state).await?;
        Ok(())
    }

    /// Replace the signed-in user's profile, keeping the token.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when anonymous, or `Storage` on a snapshot
    /// failure.
    pub async fn replace_user(&self, user: User) -> Result<AuthState, AuthError> {
        let mut state = self.state().await?;
        state.replace_user(user)?;
        self.store.save(session_keys::AUTH, &state).await?;
        Ok(state)
    }
}
