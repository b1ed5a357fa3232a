//! In-process store
//!
//! Implements every repository trait over plain maps behind one lock. Used by
//! the test suites and by `STORE_BACKEND=memory`; data lives as long as the
//! process.

mod store;

pub use store::MemoryStore;
