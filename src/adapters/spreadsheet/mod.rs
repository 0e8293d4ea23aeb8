//! Spreadsheet formats the tool can read tracking numbers from and write results to.

pub mod reader;
pub mod writer;

use crate::utils::error::{Result, TrackerError};
use std::path::Path;

pub use reader::read_sheet;
pub use writer::render_sheet;

pub const READABLE_EXTENSIONS: &[&str] = &["csv", "tsv", "xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const WRITABLE_EXTENSIONS: &[&str] = &["csv", "tsv", "xlsx"];

pub const STATUS_COLUMN: &str = "Status";
pub const CHECKED_AT_COLUMN: &str = "Checked At";
pub const LAST_UPDATE_COLUMN: &str = "Last Update";
pub const ACTION_REQUIRED_COLUMN: &str = "Action Required";

/// Header names tried, in order, when no tracking column is given explicitly.
pub const TRACKING_COLUMN_CANDIDATES: &[&str] = &[
    "Tracking Number",
    "TrackingNumber",
    "Tracking_Number",
    "tracking_number",
    "tracking number",
    "Číslo zásilky",
    "Cislo zasilky",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// Plain text table with the given field delimiter.
    Delimited(u8),
    /// Excel or OpenDocument workbook; only the first worksheet is used.
    Workbook,
}

impl SheetFormat {
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        match extension.as_str() {
            "csv" => Some(SheetFormat::Delimited(b',')),
            "tsv" => Some(SheetFormat::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SheetFormat::Workbook),
            _ => None,
        }
    }

    pub fn for_input(path: &str) -> Result<Self> {
        Self::from_path(path).ok_or_else(|| {
            TrackerError::file_format(
                path,
                format!(
                    "unsupported file type, expected one of: {}",
                    READABLE_EXTENSIONS.join(", ")
                ),
            )
        })
    }

    /// Workbooks are always written as xlsx.
    pub fn for_output(path: &str) -> Result<Self> {
        let writable = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| WRITABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));

        match Self::from_path(path) {
            Some(format) if writable => Ok(format),
            _ => Err(TrackerError::InvalidConfigValueError {
                field: "output".to_string(),
                value: path.to_string(),
                reason: format!(
                    "cannot write this file type, use one of: {}",
                    WRITABLE_EXTENSIONS.join(", ")
                ),
            }),
        }
    }
}

/// `orders.xlsx` -> `orders_updated.xlsx`, next to the input.
pub fn default_output_path(input: &str) -> String {
    let path = Path::new(input);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("tracking");
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| WRITABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or("xlsx");

    path.with_file_name(format!("{}_updated.{}", stem, extension))
        .to_string_lossy()
        .into_owned()
}
