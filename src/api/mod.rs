//! API layer - HTTP handlers and page rendering
//!
//! This module contains all HTTP-related concerns:
//! - Request handlers and route definitions
//! - The per-request caller context, path extraction and flash messages
//! - Form parsing and HTML templates

pub mod context;
pub mod extract;
pub mod flash;
pub mod forms;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod views;

pub use routes::create_router;
pub use state::AppState;
