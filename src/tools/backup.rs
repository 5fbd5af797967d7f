/// Tools for backups and the legacy CSV format
///
/// This module implements backup_export, backup_import, logs_export_csv
/// and logs_import_csv.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use tracing::info;
use crate::backup::csv::{self as legacy_csv, SkippedRow};
use crate::backup::reconcile::import_json;
use crate::backup::{backup_file_name, BackupSnapshot, ImportReport};
use crate::storage::GoalStore;
use crate::tools::ToolError;

/// Parameters for exporting a backup (none)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ExportBackupParams {}

/// Response from exporting a backup
#[derive(Debug, Serialize)]
pub struct ExportBackupResponse {
    /// Suggested download name
    pub file_name: String,
    pub goal_count: usize,
    /// The pretty-printed backup document
    pub document: String,
    pub message: String,
}

/// Export long-term goals and category settings as a version-1 backup
pub fn export_backup<S: GoalStore>(
    storage: &S,
    _params: ExportBackupParams,
    now: DateTime<Utc>,
) -> Result<ExportBackupResponse, ToolError> {
    let snapshot = BackupSnapshot::capture(storage, now)?;
    let document = snapshot.to_json_pretty()?;
    let file_name = backup_file_name(now.date_naive());

    Ok(ExportBackupResponse {
        message: format!("💾 Exported {} goal(s) to {}", snapshot.goals.len(), file_name),
        goal_count: snapshot.goals.len(),
        file_name,
        document,
    })
}

/// Parameters for importing a backup
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImportBackupParams {
    /// Full text of a backup JSON document
    pub document: String,
}

/// Response from importing a backup
#[derive(Debug, Serialize)]
pub struct ImportBackupResponse {
    pub report: ImportReport,
    pub message: String,
}

/// Reconcile a backup document into the store
///
/// The document is validated completely before anything is written, and
/// the resulting diff is written as one batch.
pub fn import_backup<S: GoalStore>(
    storage: &S,
    params: ImportBackupParams,
) -> Result<ImportBackupResponse, ToolError> {
    let report = import_json(storage, &params.document)?;

    let mut message = format!(
        "📥 Import finished: {} restored, {} updated, {} unchanged{}",
        report.restored.len(),
        report.updated.len(),
        report.unchanged,
        if report.settings_updated { ", settings updated" } else { "" }
    );
    if !report.ambiguous_matches.is_empty() {
        message.push_str(&format!(
            "\n⚠️ {} record(s) matched more than one existing goal; the first match was used",
            report.ambiguous_matches.len()
        ));
    }

    Ok(ImportBackupResponse { report, message })
}

/// Parameters for exporting logs as CSV (none)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ExportCsvParams {}

/// Response from exporting logs as CSV
#[derive(Debug, Serialize)]
pub struct ExportCsvResponse {
    pub row_count: usize,
    pub csv: String,
    pub message: String,
}

/// Export every log as `Date,Habit Name,Status,Value,Notes` rows
pub fn export_logs_csv<S: GoalStore>(
    storage: &S,
    _params: ExportCsvParams,
) -> Result<ExportCsvResponse, ToolError> {
    let snapshot = storage.snapshot()?;
    let export = legacy_csv::export_logs(&snapshot.goals, &snapshot.logs)?;

    Ok(ExportCsvResponse {
        message: format!("📄 Exported {} log row(s) as CSV", export.rows),
        row_count: export.rows,
        csv: export.text,
    })
}

/// Parameters for importing logs from CSV
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImportCsvParams {
    /// CSV text with a `Date,Habit Name,Status` header
    pub csv: String,
}

/// Response from importing logs from CSV
#[derive(Debug, Serialize)]
pub struct ImportCsvResponse {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
    pub message: String,
}

/// Upsert every valid CSV row as a log
///
/// Rows are matched to goals by title. There is no reconciliation: each
/// valid row overwrites whatever status the day had.
pub fn import_logs_csv<S: GoalStore>(
    storage: &S,
    params: ImportCsvParams,
) -> Result<ImportCsvResponse, ToolError> {
    let rows = legacy_csv::parse_rows(&params.csv)?;
    let goals = storage.list_goals()?;
    let plan = legacy_csv::plan_import(&goals, &rows);

    for log in &plan.logs {
        storage.upsert_log(log)?;
    }
    info!("CSV import: {} rows imported, {} skipped", plan.logs.len(), plan.skipped.len());

    let mut message = format!("📥 Imported {} log row(s)", plan.logs.len());
    if !plan.skipped.is_empty() {
        message.push_str(&format!(", skipped {}:", plan.skipped.len()));
        for skipped in &plan.skipped {
            message.push_str(&format!("\n• line {}: {}", skipped.line, skipped.reason));
        }
    }

    Ok(ImportCsvResponse {
        imported: plan.logs.len(),
        skipped: plan.skipped,
        message,
    })
}
