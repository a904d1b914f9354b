//! Web API module for legend-auth.
//!
//! This module exposes login, account creation and account lookup over a
//! JSON REST API.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
