//! Web layer for the timetable gateway.
//!
//! Provides the HTTP endpoints and the JSON response envelope.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router, enabled_endpoints};
pub use state::AppState;
