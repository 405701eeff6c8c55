//! Session-stored snapshots.
//!
//! Each client keeps its cart and auth state as two independent entries.

/// Session keys for persisted snapshots.
pub mod keys {
    /// Cart snapshot (`CartSnapshot`).
    pub const CART: &str = "cart-storage";

    /// Auth snapshot (`AuthState`).
    pub const AUTH: &str = "auth-storage";
}
