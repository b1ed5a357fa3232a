//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod container;
pub mod context;
pub mod error;
pub mod file;
mod hydrate;
pub mod message;
pub mod pagination;
pub mod profile;

#[cfg(test)]
mod test_support;

// Re-export all services for convenience
pub use container::ContainerService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use file::{FileService, IncomingFile};
pub use message::MessageService;
pub use pagination::PaginationService;
pub use profile::ProfileService;
