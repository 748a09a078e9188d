//! API Layer
//!
//! HTTP endpoints, request handling, and the bearer-token middleware.

pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use handlers::AppState;
pub use middleware::{auth_middleware, AuthUser};
pub use routes::RouterBuilder;
