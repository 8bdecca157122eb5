//! # HTTP Server Module
//!
//! JSON API and static pages for the room board.
//!
//! # Endpoints
//!
//! - `/api/login`, `/api/logout`, `/api/verify` - Admin sessions
//! - `/api/status`, `/api/occupy`, `/api/release` - Room occupancy
//! - `/api/admins` - Reviewer directory
//! - `/api/requests` - Access requests and reviews
//! - `/admin` - Admin page, everything else from the public directory

pub mod admin_routes;
pub mod auth_routes;
pub mod config;
pub mod cookies;
pub mod errors;
pub mod request_routes;
pub mod room_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::ApiError;
pub use server::{build_router, HttpServer};
pub use state::AppState;
