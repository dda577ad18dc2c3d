//! PostgreSQL storage adapter
//!
//! Reports live in the `reports` table and their ledgers in `report_versions`
//! (see `migrations/001_initial_schema.sql`).

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{PostgreSQLReport, PostgreSQLVersion};
