//! Storage adapters for MedReport.
//!
//! - [`database`] - the [`database::ReportStore`] trait and the factory
//! - [`memory`] - in-process implementation used by tests and the `memory` target
//! - [`postgresql`] - PostgreSQL implementation
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern**: the report service only sees the
//! trait, and each backend maps its own failures into the domain error type.
//!
//! ```rust
//! use medreport::adapters::database::create_report_store;
//! use medreport::config::MedReportConfig;
//!
//! let store = create_report_store(&MedReportConfig::in_memory()).unwrap();
//! assert_eq!(store.backend_name(), "memory");
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
