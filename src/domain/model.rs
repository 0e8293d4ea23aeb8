use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One spreadsheet row and the status fetched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub tracking_number: String,
    pub original_row_data: HashMap<String, String>,
    pub status: Option<String>,
    pub checked_at: Option<DateTime<Utc>>,
    pub event_date: Option<String>,
    pub action_required: Option<String>,
    pub error: Option<String>,
}

impl TrackingRecord {
    pub fn new(tracking_number: impl Into<String>, original_row_data: HashMap<String, String>) -> Self {
        Self {
            tracking_number: tracking_number.into().trim().to_string(),
            original_row_data,
            status: None,
            checked_at: None,
            event_date: None,
            action_required: None,
            error: None,
        }
    }

    /// Rows with a blank tracking cell are carried through but never fetched.
    pub fn is_trackable(&self) -> bool {
        !self.tracking_number.is_empty()
    }

    pub fn apply_status(&mut self, status: ParcelStatus, action_required: Option<String>, checked_at: DateTime<Utc>) {
        self.status = Some(status.text);
        self.event_date = status.event_date;
        self.action_required = action_required;
        self.checked_at = Some(checked_at);
        self.error = None;
    }

    pub fn apply_failure(&mut self, error: impl Into<String>) {
        self.status = None;
        self.event_date = None;
        self.checked_at = None;
        self.action_required = Some(FAILED_ACTION.to_string());
        self.error = Some(error.into());
    }

    pub fn value(&self, column: &str) -> &str {
        self.original_row_data
            .get(column)
            .map(String::as_str)
            .unwrap_or("")
    }
}

pub const FAILED_ACTION: &str = "Failed to get status";

/// Newest carrier state for a parcel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelStatus {
    pub text: String,
    pub event_date: Option<String>,
}

impl ParcelStatus {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            event_date: None,
        }
    }

    pub fn with_event_date(mut self, date: impl Into<String>) -> Self {
        self.event_date = Some(date.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSheet {
    pub headers: Vec<String>,
    pub tracking_column: String,
    pub records: Vec<TrackingRecord>,
}

impl TrackingSheet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub sheet: TrackingSheet,
    pub summary: RunSummary,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub summary: RunSummary,
}

/// What a dry run found, without any status lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetPreview {
    pub tracking_column: String,
    pub headers: Vec<String>,
    pub rows: usize,
    pub trackable: usize,
    pub output_path: String,
}
