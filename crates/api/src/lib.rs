//! HTTP API layer for the vv backend.
//!
//! Every endpoint is a JSON `POST` taking its parameters in the body, grouped
//! under `/contents`, `/reactions`, `/comments`, `/playlists` and `/users`.
//! Requests carrying `Authorization: Bearer <token>` are resolved to a user by
//! [`middleware::auth_middleware`] before reaching the handlers.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
