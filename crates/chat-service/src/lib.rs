//! # chat-service
//!
//! Application layer containing business logic, services, and DTOs.

pub mod dto;
pub mod services;

pub use services::{
    ContainerService, FileService, IncomingFile, MessageService, PaginationService,
    ProfileService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
