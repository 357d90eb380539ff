//! HTTP API layer for pulso.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: report submission, listing, voting, translation,
//!   map view and geolocation
//! - **Extractors**: acting identity and browser session
//! - **Middleware**: identity headers and the session cookie
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
