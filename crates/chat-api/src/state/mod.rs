//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! the socket gateway and configuration.

use std::sync::Arc;

use axum::extract::FromRef;
use chat_common::AppConfig;
use chat_gateway::GatewayState;
use chat_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Socket side, sharing the same service context
    gateway: GatewayState,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service_context: Arc<ServiceContext>, gateway: GatewayState, config: AppConfig) -> Self {
        Self {
            service_context,
            gateway,
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn gateway(&self) -> &GatewayState {
        &self.gateway
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl FromRef<AppState> for GatewayState {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("gateway", &self.gateway)
            .field("config", &"AppConfig")
            .finish()
    }
}
