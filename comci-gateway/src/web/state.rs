//! Application state for the web layer.

use crate::config::Endpoints;
use crate::gateway::Gateway;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Timetable gateway
    pub gateway: Gateway,

    /// Optional endpoints to serve
    pub endpoints: Endpoints,
}

impl AppState {
    /// Create a new app state.
    pub fn new(gateway: Gateway, endpoints: Endpoints) -> Self {
        Self { gateway, endpoints }
    }
}
