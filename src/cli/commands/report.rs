//! Report commands
//!
//! Thin callers of [`ReportService`]: parse arguments, run one service
//! operation, print the outcome. Content files are JSON documents holding a
//! [`ReportContent`].

use crate::cli::commands::{connect, exit_code_for, EXIT_FATAL, EXIT_OK};
use crate::core::ledger::LedgerAudit;
use crate::core::service::ReportService;
use crate::domain::{
    HospitalId, MedReportError, NewReport, Report, ReportContent, ReportFilter, ReportId,
    ReportStatus, ReportType, ReportVersion, Specialty, UserId,
};
use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Create a draft report with an empty first version
    Create(CreateArgs),

    /// Print a report with its current content as JSON
    Show(ReportRef),

    /// Save new content from a JSON file as the next version
    Edit(EditArgs),

    /// Move a report to another workflow status
    Transition(TransitionArgs),

    /// Append a copy of a historical version as the newest version
    Restore(RestoreArgs),

    /// List the version ledger, newest first
    History(ReportRef),

    /// Delete a draft report and its versions
    Delete(ReportRef),

    /// List a clinician's reports, most recently modified first
    List(ListArgs),

    /// Check ledger numbering, checksums and current content
    Audit(ReportRef),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub hospital_id: HospitalId,

    /// 13-character patient national id
    #[arg(long)]
    pub national_id: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// internal_medicine, cardiology, neurology, pediatrics or surgery
    #[arg(long)]
    pub specialty: Specialty,

    /// discharge_summary, transfer_summary or operative_note
    #[arg(long)]
    pub report_type: ReportType,

    /// Creating clinician
    #[arg(long)]
    pub author: UserId,
}

#[derive(Args, Debug)]
pub struct ReportRef {
    /// Report id
    pub id: ReportId,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Report id
    pub id: ReportId,

    /// JSON file with the full report content
    #[arg(long)]
    pub content: PathBuf,

    #[arg(long)]
    pub editor: UserId,
}

#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Report id
    pub id: ReportId,

    /// Target status
    #[arg(long)]
    pub to: ReportStatus,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Report id
    pub id: ReportId,

    /// Version number to restore
    #[arg(long = "version")]
    pub version_number: u32,

    #[arg(long)]
    pub editor: UserId,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Creating clinician
    #[arg(long)]
    pub author: UserId,

    #[arg(long)]
    pub status: Option<ReportStatus>,

    /// Page size; 0 uses the configured default
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

impl ReportCommand {
    /// Connect to the configured store and run the command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let service = match connect(config_path).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };
        self.run(&service).await
    }

    /// Run the command against an existing service
    pub async fn run(&self, service: &ReportService) -> anyhow::Result<i32> {
        match self {
            ReportCommand::Create(args) => {
                let request = NewReport {
                    hospital_id: args.hospital_id,
                    national_id: args.national_id.clone(),
                    first_name: args.first_name.clone(),
                    last_name: args.last_name.clone(),
                    specialty: args.specialty,
                    report_type: args.report_type,
                    author_id: args.author,
                };
                match service.create(request).await {
                    Ok(report) => {
                        println!("✅ Report created: {}", report.id);
                        print_summary(&report);
                        Ok(EXIT_OK)
                    }
                    Err(e) => Ok(rejected(&e)),
                }
            }
            ReportCommand::Show(args) => match service.get_report(args.id).await {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(EXIT_OK)
                }
                Err(e) => Ok(rejected(&e)),
            },
            ReportCommand::Edit(args) => {
                let content = read_content(&args.content)?;
                match service.update_content(args.id, content, args.editor).await {
                    Ok(outcome) => {
                        println!(
                            "✅ Saved version {} of report {}",
                            outcome.version.version_number, args.id
                        );
                        if !outcome.report.content.is_complete() {
                            println!("   Content is not yet complete for review");
                        }
                        Ok(EXIT_OK)
                    }
                    Err(e) => Ok(rejected(&e)),
                }
            }
            ReportCommand::Transition(args) => {
                match service.change_status(args.id, args.to).await {
                    Ok(report) => {
                        println!("✅ Report {} is now {}", report.id, report.status);
                        print_summary(&report);
                        Ok(EXIT_OK)
                    }
                    Err(e) => Ok(rejected(&e)),
                }
            }
            ReportCommand::Restore(args) => {
                match service
                    .restore_version(args.id, args.version_number, args.editor)
                    .await
                {
                    Ok(outcome) => {
                        println!(
                            "✅ Version {} restored as version {}",
                            args.version_number, outcome.version.version_number
                        );
                        Ok(EXIT_OK)
                    }
                    Err(e) => Ok(rejected(&e)),
                }
            }
            ReportCommand::History(args) => match service.list_versions(args.id).await {
                Ok(versions) => {
                    print_history(&versions);
                    Ok(EXIT_OK)
                }
                Err(e) => Ok(rejected(&e)),
            },
            ReportCommand::Delete(args) => match service.delete(args.id).await {
                Ok(()) => {
                    println!("✅ Report {} deleted", args.id);
                    Ok(EXIT_OK)
                }
                Err(e) => Ok(rejected(&e)),
            },
            ReportCommand::List(args) => {
                let mut filter =
                    ReportFilter::for_author(args.author).page(args.limit, args.offset);
                if let Some(status) = args.status {
                    filter = filter.with_status(status);
                }
                match service.list_reports(filter).await {
                    Ok(reports) => {
                        print_report_table(&reports);
                        Ok(EXIT_OK)
                    }
                    Err(e) => Ok(rejected(&e)),
                }
            }
            ReportCommand::Audit(args) => match service.audit_ledger(args.id).await {
                Ok(audit) => {
                    print_audit(&audit);
                    Ok(if audit.is_consistent() {
                        EXIT_OK
                    } else {
                        EXIT_FATAL
                    })
                }
                Err(e) => Ok(rejected(&e)),
            },
        }
    }
}

fn read_content(path: &Path) -> anyhow::Result<ReportContent> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read content file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Content file {} is not valid report JSON", path.display()))
}

/// Print a service rejection and pick the exit code
fn rejected(error: &MedReportError) -> i32 {
    tracing::debug!(error = %error, "Report command rejected");
    match error {
        MedReportError::IncompleteContent(violations) => {
            println!("❌ Report content is incomplete");
            for violation in violations {
                println!("   - {violation}");
            }
        }
        other => {
            println!("❌ {other}");
        }
    }
    exit_code_for(error)
}

fn print_summary(report: &Report) {
    println!("   Status: {}", report.status);
    println!("   Patient: {}", report.patient.national_id.masked());
    println!("   Specialty: {}", report.specialty);
    println!("   Type: {}", report.report_type);
    println!("   Revision: {}", report.revision);
    if let Some(finalized_at) = report.finalized_at {
        println!(
            "   Finalized: {}",
            finalized_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

fn print_history(versions: &[ReportVersion]) {
    println!("Found {} version(s):", versions.len());
    println!();
    println!(
        "{:<8} {:<20} {:<38} {:<30}",
        "Version", "Saved At", "Saved By", "Comment"
    );
    println!("{}", "-".repeat(96));
    for version in versions {
        println!(
            "{:<8} {:<20} {:<38} {:<30}",
            version.version_number,
            version.saved_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            version.saved_by.to_string(),
            version.comment
        );
    }
}

fn print_report_table(reports: &[Report]) {
    if reports.is_empty() {
        println!("No reports found.");
        return;
    }

    println!("Found {} report(s):", reports.len());
    println!();
    println!(
        "{:<38} {:<12} {:<18} {:<18} {:<20}",
        "Report ID", "Status", "Specialty", "Type", "Last Modified"
    );
    println!("{}", "-".repeat(110));
    for report in reports {
        println!(
            "{:<38} {:<12} {:<18} {:<18} {:<20}",
            report.id.to_string(),
            report.status.as_str(),
            report.specialty.as_str(),
            report.report_type.as_str(),
            report.last_modified.format("%Y-%m-%d %H:%M:%S").to_string()
        );
    }
}

fn print_audit(audit: &LedgerAudit) {
    let verdict = if audit.is_consistent() {
        "✅ Ledger is consistent"
    } else {
        "❌ Ledger is inconsistent"
    };
    println!("{verdict}");
    println!("   Versions: {}", audit.version_count);
    if let Some(latest) = audit.latest_version {
        println!("   Latest: {latest}");
    }
    if !audit.missing_numbers.is_empty() {
        println!("   Missing numbers: {:?}", audit.missing_numbers);
    }
    if !audit.duplicate_numbers.is_empty() {
        println!("   Duplicate numbers: {:?}", audit.duplicate_numbers);
    }
    if !audit.checksum_mismatches.is_empty() {
        println!("   Checksum mismatches: {:?}", audit.checksum_mismatches);
    }
    if !audit.content_matches_latest {
        println!("   Current content differs from the latest version");
    }
}
