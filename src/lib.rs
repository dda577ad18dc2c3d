// MedReport - Discharge Report Lifecycle Service
// Copyright (c) 2025 MedReport Contributors
// Licensed under the MIT License

//! # MedReport - Discharge Report Lifecycle
//!
//! MedReport manages hospital discharge reports from first draft to signature.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Authoring** reports whose every save is kept in an append-only version ledger
//! - **Validating** clinical content before a report may leave draft
//! - **Moving** reports through the draft, review, approval and signing workflow
//! - **Guarding** concurrent writers with optimistic revisions
//!
//! ## Architecture
//!
//! MedReport follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (workflow, version ledger, report service)
//! - [`adapters`] - Report stores (PostgreSQL, in-memory)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medreport::config::load_config;
//! use medreport::core::ReportService;
//! use medreport::domain::{HospitalId, NewReport, ReportStatus, ReportType, Specialty, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("medreport.toml")?;
//!     let service = ReportService::from_config(&config)?;
//!     service.ensure_schema().await?;
//!
//!     let author = UserId::new();
//!     let report = service
//!         .create(NewReport {
//!             hospital_id: HospitalId::new(),
//!             national_id: "1850312400123".to_string(),
//!             first_name: "Ana".to_string(),
//!             last_name: "Popescu".to_string(),
//!             specialty: Specialty::Cardiology,
//!             report_type: ReportType::DischargeSummary,
//!             author_id: author,
//!         })
//!         .await?;
//!
//!     // Edits append versions; an incomplete draft cannot be submitted
//!     let content = service.get_report(report.id).await?.content;
//!     service.update_content(report.id, content, author).await?;
//!     assert!(service.change_status(report.id, ReportStatus::InReview).await.is_err());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::MedReportError`]. Conflicts and
//! unavailability are retryable; workflow rejections are not:
//!
//! ```rust
//! use medreport::domain::{MedReportError, ReportStatus};
//!
//! let err = MedReportError::InvalidTransition {
//!     from: ReportStatus::Signed,
//!     to: ReportStatus::Draft,
//! };
//! assert!(!err.is_retryable());
//! assert!(MedReportError::ConcurrencyConflict("stale".into()).is_retryable());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
