use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Cannot read spreadsheet '{path}': {reason}")]
    FileFormat { path: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    XlsxWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for tracking number {tracking_number}")]
    ApiStatusError { status: u16, tracking_number: String },

    #[error("Invalid response for tracking number {tracking_number}: {reason}")]
    InvalidResponseError {
        tracking_number: String,
        reason: String,
    },

    #[error("Invalid tracking number: '{value}'")]
    InvalidTrackingNumber { value: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Response,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn file_format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        TrackerError::FileFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TrackerError::FileFormat { .. }
            | TrackerError::CsvError(_)
            | TrackerError::SpreadsheetError(_)
            | TrackerError::InvalidTrackingNumber { .. } => ErrorCategory::Input,
            TrackerError::ApiError(_) | TrackerError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            TrackerError::InvalidResponseError { .. } | TrackerError::SerializationError(_) => {
                ErrorCategory::Response
            }
            TrackerError::IoError(_) | TrackerError::XlsxWriteError(_) => ErrorCategory::Output,
            TrackerError::InvalidConfigValueError { .. } | TrackerError::MissingConfigError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Response => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TrackerError::ApiError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TrackerError::ApiStatusError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TrackerError::FileFormat { .. } => {
                "Check that the file exists, is a csv/tsv/xlsx/xls/ods spreadsheet and has a tracking number column (or pass --tracking-column)"
            }
            TrackerError::CsvError(_) | TrackerError::SpreadsheetError(_) => {
                "Open the file in a spreadsheet editor and save it again in a supported format"
            }
            TrackerError::InvalidTrackingNumber { .. } => {
                "Fill in the tracking number cell or remove the row"
            }
            TrackerError::ApiError(_) => "Check your network connection and try again later",
            TrackerError::ApiStatusError { status, .. } if *status >= 500 || *status == 429 => {
                "The tracking service is busy or unavailable, try again later"
            }
            TrackerError::ApiStatusError { .. } => {
                "Check the tracking number and the API credentials (PARCEL_API_KEY / PARCEL_API_SECRET)"
            }
            TrackerError::InvalidResponseError { .. } | TrackerError::SerializationError(_) => {
                "The carrier does not know this tracking number yet, try again later"
            }
            TrackerError::IoError(_) | TrackerError::XlsxWriteError(_) => {
                "Check that the output location is writable and the file is not open in another program"
            }
            TrackerError::InvalidConfigValueError { .. } | TrackerError::MissingConfigError { .. } => {
                "Run with --help to see the accepted options"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TrackerError::FileFormat { path, reason } => {
                format!("Could not use spreadsheet {}: {}", path, reason)
            }
            TrackerError::ApiError(e) if e.is_timeout() => {
                "The tracking service did not answer in time".to_string()
            }
            TrackerError::ApiError(_) => "Could not reach the tracking service".to_string(),
            TrackerError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
