//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod channels;
pub mod conversations;
pub mod groups;
pub mod health;
pub mod messages;
pub mod profiles;
pub mod uploads;
