//! Storage abstraction layer
//!
//! This module provides the trait every report store implements and the
//! factory that picks an implementation from configuration.

pub mod factory;
pub mod traits;

pub use factory::create_report_store;
pub use traits::{AppendOutcome, ReportStore};
