/// Legacy CSV export/import of raw logs
///
/// The format is `Date,Habit Name,Status,Value,Notes` with RFC 4180 quoting.
/// Import has no reconciliation semantics: every valid row becomes a plain
/// upsert, every invalid row is skipped and reported.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use crate::backup::BackupError;
use crate::domain::{date_key, parse_date_key, Goal, GoalId, GoalLog, LogStatus};

/// Header row written on export and expected on import
pub const CSV_HEADER: [&str; 5] = ["Date", "Habit Name", "Status", "Value", "Notes"];

/// One data row as read from the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line in the file
    pub line: u64,
    pub date: String,
    pub goal_title: String,
    pub status: String,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Logs to upsert plus the rows left out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvImportPlan {
    pub logs: Vec<GoalLog>,
    pub skipped: Vec<SkippedRow>,
}

/// Rendered CSV text and the number of data records in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub text: String,
    pub rows: usize,
}

fn csv_error(line: u64, error: impl std::fmt::Display) -> BackupError {
    BackupError::Csv {
        line,
        message: error.to_string(),
    }
}

/// Render logs as CSV, one row per log, date ascending
///
/// Logs of goals missing from `goals` are left out.
pub fn export_logs(goals: &[Goal], logs: &[GoalLog]) -> Result<CsvExport, BackupError> {
    let titles: HashMap<&GoalId, &str> = goals
        .iter()
        .map(|goal| (&goal.id, goal.title.as_str()))
        .collect();

    let mut sorted: Vec<&GoalLog> = logs.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(|e| csv_error(1, e))?;

    let mut rows = 0;
    for (row, log) in sorted.into_iter().enumerate() {
        let Some(title) = titles.get(&log.goal_id) else {
            continue;
        };
        let value = match log.status {
            LogStatus::Done => "1",
            LogStatus::Missed => "0",
        };
        writer
            .write_record([date_key(log.date).as_str(), *title, log.status.as_str(), value, ""])
            .map_err(|e| csv_error(row as u64 + 2, e))?;
        rows += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv_error(0, e.error()))?;
    let text = String::from_utf8(bytes).map_err(|e| csv_error(0, e))?;
    Ok(CsvExport { text, rows })
}

/// Read the data rows of a CSV document
///
/// The header must start with `Date,Habit Name,Status`; rows with fewer
/// than three fields come back with empty strings and are rejected later.
pub fn parse_rows(text: &str) -> Result<Vec<CsvRow>, BackupError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| csv_error(1, e))?.clone();
    let expected = &CSV_HEADER[..3];
    let matches_header = headers.len() >= 3
        && headers
            .iter()
            .zip(expected.iter())
            .all(|(found, wanted)| found.eq_ignore_ascii_case(wanted));
    if !matches_header {
        return Err(csv_error(
            1,
            format!("expected header '{}', found '{}'", CSV_HEADER.join(","), headers.iter().collect::<Vec<_>>().join(",")),
        ));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line());
            csv_error(line, e)
        })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(CsvRow {
            line: record.position().map_or(0, |p| p.line()),
            date: record.get(0).unwrap_or_default().to_string(),
            goal_title: record.get(1).unwrap_or_default().to_string(),
            status: record.get(2).unwrap_or_default().to_string(),
        });
    }

    Ok(rows)
}

/// Resolve rows against the goals and decide what to upsert
///
/// Goals are found by title (first match in goal order). A row is skipped
/// for an unknown goal, a bad date, a bad status, or a date outside the
/// goal's validity window.
pub fn plan_import(goals: &[Goal], rows: &[CsvRow]) -> CsvImportPlan {
    let mut plan = CsvImportPlan::default();

    for row in rows {
        let skip = |reason: String| SkippedRow { line: row.line, reason };

        let Some(goal) = goals.iter().find(|goal| goal.title == row.goal_title) else {
            plan.skipped.push(skip(format!("unknown goal '{}'", row.goal_title)));
            continue;
        };

        let date = match parse_date_key(&row.date) {
            Ok(date) => date,
            Err(e) => {
                plan.skipped.push(skip(e.to_string()));
                continue;
            }
        };

        let status = match row.status.parse::<LogStatus>() {
            Ok(status) => status,
            Err(e) => {
                plan.skipped.push(skip(e.to_string()));
                continue;
            }
        };

        if let Err(e) = goal.ensure_active_on(date) {
            plan.skipped.push(skip(e.to_string()));
            continue;
        }

        plan.logs.push(GoalLog::new(goal.id.clone(), date, status));
    }

    plan
}
