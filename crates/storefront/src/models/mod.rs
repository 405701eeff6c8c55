//! Types shared between handlers, middleware and services.

pub mod session;

pub use session::keys as session_keys;
