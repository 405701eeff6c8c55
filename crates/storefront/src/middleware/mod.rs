//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with the in-memory store)
//!
//! Authentication and locale are extractors rather than layers.

pub mod auth;
pub mod locale;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth};
pub use locale::RequestLocale;
pub use session::create_session_layer;
