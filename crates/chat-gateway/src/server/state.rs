//! Gateway state

use std::sync::Arc;

use chat_common::GatewayConfig;
use chat_service::ServiceContext;

use crate::connection::ConnectionRegistry;

/// Shared dependencies of the socket handler
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with repositories and services
    service_context: Arc<ServiceContext>,
    /// Live connections
    registry: Arc<ConnectionRegistry>,
    config: GatewayConfig,
}

impl GatewayState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        registry: Arc<ConnectionRegistry>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            service_context,
            registry,
            config,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
