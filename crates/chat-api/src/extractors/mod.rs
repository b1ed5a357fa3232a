//! Axum extractors for request handling
//!
//! Validation and typed id extraction.

mod path;
mod validated;

pub use path::IdPath;
pub use validated::{ValidatedJson, ValidatedQuery};
