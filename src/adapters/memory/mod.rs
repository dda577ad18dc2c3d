//! In-memory storage adapter
//!
//! Used by tests and by the `memory` database target. Data lives only as long
//! as the process.

pub mod adapter;

pub use adapter::InMemoryReportStore;
