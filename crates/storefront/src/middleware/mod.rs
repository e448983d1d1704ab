//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. Set request ID (keep upstream `x-request-id` or generate a UUID)
//! 3. `TraceLayer` (request span with `request_id` field)
//! 4. Record request ID (span field and Sentry tag)
//! 5. Propagate request ID (echo on response)
//!
//! Identity is not middleware: handlers declare [`RequireAuth`],
//! [`RequireAdmin`] or [`OptionalAuth`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{Identity, OptionalAuth, RequireAdmin, RequireAuth};
pub use request_id::{
    REQUEST_ID_HEADER, propagate_request_id_layer, record_request_id, set_request_id_layer,
};
