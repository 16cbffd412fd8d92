//! Writes transaction lists to timestamped CSV or JSON files
//!
//! Files are named after the local time at minute resolution, so two exports
//! into the same folder within one minute overwrite each other unless the
//! caller supplies its own file name.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::Transaction;

pub const DEFAULT_FOLDER: &str = "transactions";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No transactions to export")]
    Empty,

    #[error("Invalid export file name '{0}'")]
    InvalidFileName(String),

    #[error("Failed to render transactions: {0}")]
    Render(String),

    #[error("Failed to write {}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where and how an export is written
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub folder: PathBuf,
    /// File stem used instead of the timestamp
    pub file_name: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            folder: PathBuf::from(DEFAULT_FOLDER),
            file_name: None,
        }
    }
}

impl ExportOptions {
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folder = folder.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Save `transactions` and return the written path
///
/// `None` is rejected before the filesystem is touched; an empty slice
/// produces an empty CSV body or `[]`.
pub fn save_transactions(
    transactions: Option<&[Transaction]>,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    save_transactions_at(transactions, options, Local::now().naive_local())
}

/// [`save_transactions`] with an explicit local time for the file name
pub fn save_transactions_at(
    transactions: Option<&[Transaction]>,
    options: &ExportOptions,
    now: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    let transactions = transactions.ok_or(ExportError::Empty)?;

    let stem = match &options.file_name {
        Some(name) => validate_file_name(name)?,
        None => now.format(TIMESTAMP_FORMAT).to_string(),
    };

    let body = match options.format {
        ExportFormat::Csv => render_csv(transactions)?,
        ExportFormat::Json => render_json(transactions)?,
    };

    std::fs::create_dir_all(&options.folder).map_err(|source| ExportError::WriteFailed {
        path: options.folder.clone(),
        source,
    })?;

    let path = options
        .folder
        .join(format!("{}.{}", stem, options.format.extension()));
    if path.exists() {
        tracing::warn!("Overwriting existing export {}", path.display());
    }

    std::fs::write(&path, body).map_err(|source| ExportError::WriteFailed {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        "Exported {} transactions to {}",
        transactions.len(),
        path.display()
    );
    Ok(path)
}

fn validate_file_name(name: &str) -> Result<String, ExportError> {
    let name = name.trim();
    let is_plain = !name.is_empty()
        && Path::new(name).file_name().map(|f| f == name).unwrap_or(false);
    if !is_plain {
        return Err(ExportError::InvalidFileName(name.to_string()));
    }
    Ok(name.to_string())
}

/// Header from the first transaction's keys, one comma-joined row per transaction
///
/// Fields are never quoted; commas inside values end up splitting columns.
pub fn render_csv(transactions: &[Transaction]) -> Result<String, ExportError> {
    let rows = transactions
        .iter()
        .map(to_object)
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let header: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());

    writer
        .write_record(&header)
        .map_err(|e| ExportError::Render(e.to_string()))?;
    for row in &rows {
        writer
            .write_record(header.iter().map(|key| render_cell(row.get(*key))))
            .map_err(|e| ExportError::Render(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Render(e.to_string()))
}

pub fn render_json(transactions: &[Transaction]) -> Result<String, ExportError> {
    serde_json::to_string_pretty(transactions).map_err(|e| ExportError::Render(e.to_string()))
}

fn to_object(transaction: &Transaction) -> Result<Map<String, Value>, ExportError> {
    match serde_json::to_value(transaction) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ExportError::Render(format!(
            "transaction is not an object: {}",
            other
        ))),
        Err(e) => Err(ExportError::Render(e.to_string())),
    }
}

/// Falsy values (`null`, `false`, `0`, `""`) and missing keys render empty
fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => render_number(n),
        Some(composite) => composite.to_string(),
    }
}

fn render_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return if i == 0 { String::new() } else { i.to_string() };
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => String::new(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn coffee() -> Vec<Transaction> {
        vec![Transaction::new("2024-01-01", "Coffee", 3.5)]
    }

    #[test]
    fn test_csv_export() {
        let dir = TempDir::new().unwrap();
        let options = ExportOptions::default().with_folder(dir.path().join("transactions"));

        let path = save_transactions_at(Some(coffee().as_slice()), &options, at(8, 5, 0)).unwrap();
        assert_eq!(
            path,
            dir.path().join("transactions").join("2024-03-09T08-05.csv")
        );

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["date,description,amount", "2024-01-01,Coffee,3.5"]);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_none_is_rejected_without_writing() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("transactions");
        let options = ExportOptions::default().with_folder(&folder);

        let result = save_transactions(None, &options);
        assert!(matches!(result, Err(ExportError::Empty)));
        assert!(!folder.exists());
    }

    #[test]
    fn test_empty_slice_is_accepted() {
        let dir = TempDir::new().unwrap();
        let options = ExportOptions::default().with_folder(dir.path());

        let path = save_transactions_at(Some(&[][..]), &options, at(9, 0, 0)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "");

        let options = options.with_format(ExportFormat::Json);
        let path = save_transactions_at(Some(&[][..]), &options, at(9, 0, 0)).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn test_json_export_round_trips() {
        let dir = TempDir::new().unwrap();
        let options = ExportOptions::default()
            .with_folder(dir.path())
            .with_format(ExportFormat::Json);
        let transactions = vec![
            Transaction::new("2024-01-01", "Coffee", 3.5),
            Transaction::new("2024-01-02", "Lunch, menu", -12.25)
                .with_field("merchant", json!({"city": "Madrid"}))
                .with_field("pending", json!(false)),
        ];

        let path = save_transactions_at(Some(transactions.as_slice()), &options, at(10, 0, 0)).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));

        let content = std::fs::read_to_string(path).unwrap();
        let parsed: Vec<Transaction> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, transactions);
    }

    #[test]
    fn test_same_minute_overwrites() {
        let dir = TempDir::new().unwrap();
        let options = ExportOptions::default().with_folder(dir.path());

        let first = save_transactions_at(Some(coffee().as_slice()), &options, at(12, 30, 1)).unwrap();
        let second_batch = vec![Transaction::new("2024-01-05", "Dinner", 30.0)];
        let second = save_transactions_at(Some(second_batch.as_slice()), &options, at(12, 30, 59)).unwrap();

        assert_eq!(first, second);
        let content = std::fs::read_to_string(second).unwrap();
        assert!(content.contains("Dinner"));
        assert!(!content.contains("Coffee"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_custom_file_name() {
        let dir = TempDir::new().unwrap();
        let options = ExportOptions::default()
            .with_folder(dir.path())
            .with_file_name("march");

        let path = save_transactions_at(Some(coffee().as_slice()), &options, at(1, 2, 3)).unwrap();
        assert_eq!(path, dir.path().join("march.csv"));

        for bad in ["", "  ", "../escape", "a/b"] {
            let options = ExportOptions::default()
                .with_folder(dir.path())
                .with_file_name(bad);
            assert!(matches!(
                save_transactions_at(Some(coffee().as_slice()), &options, at(1, 2, 3)),
                Err(ExportError::InvalidFileName(_))
            ));
        }
    }

    #[test]
    fn test_existing_folder_is_reused() {
        let dir = TempDir::new().unwrap();
        let options = ExportOptions::default().with_folder(dir.path());
        save_transactions_at(Some(coffee().as_slice()), &options, at(1, 0, 0)).unwrap();
        save_transactions_at(Some(coffee().as_slice()), &options, at(1, 1, 0)).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_write_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-folder");
        std::fs::write(&blocker, "x").unwrap();

        let options = ExportOptions::default().with_folder(&blocker);
        let result = save_transactions_at(Some(coffee().as_slice()), &options, at(1, 0, 0));
        assert!(matches!(result, Err(ExportError::WriteFailed { .. })));
    }

    #[test]
    fn test_csv_cell_rendering() {
        let transactions = vec![
            Transaction::new("2024-01-01", "Refund", 0.0)
                .with_field("merchant", json!({"city": "Madrid"}))
                .with_field("tags", json!(["a", "b"]))
                .with_field("pending", json!(false))
                .with_field("note", json!(null))
                .with_field("points", json!(12)),
            Transaction::new("2024-01-02", "", 12.0).with_field("pending", json!(true)),
            Transaction::new(Value::Null, "Pending", "3.50"),
        ];

        let csv = render_csv(&transactions).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "date,description,amount,merchant,tags,pending,note,points",
                r#"2024-01-01,Refund,,{"city":"Madrid"},["a","b"],,,12"#,
                "2024-01-02,,12,,,true,,",
                ",Pending,3.50,,,,,",
            ]
        );
    }

    #[test]
    fn test_csv_does_not_quote() {
        let transactions = vec![Transaction::new("2024-01-01", "Lunch, menu", 9.9)];
        let csv = render_csv(&transactions).unwrap();
        assert_eq!(csv.lines().nth(1), Some("2024-01-01,Lunch, menu,9.9"));
    }
}
