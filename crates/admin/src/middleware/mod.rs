//! HTTP middleware stack for the back office.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID
//! 4. Session layer (tower-sessions, `shop.admin_session`)
//! 5. Security headers
//! 6. Rate limiting on login
//!
//! Request IDs, security headers and rate limiters are shared with the
//! storefront.

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, clear_current_admin, set_current_admin};
pub use fraz_modern_storefront::middleware::{
    auth_rate_limiter, request_id_middleware, security_headers_middleware,
};
pub use session::create_session_layer;
