pub mod cli;

use crate::adapters::http::{ApiCredentials, ApiSettings, DEFAULT_ENDPOINT, DEFAULT_LANGUAGE};
use crate::adapters::spreadsheet::{default_output_path, READABLE_EXTENSIONS, WRITABLE_EXTENSIONS};
use crate::core::retry::RetryPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "parcel-tracker")]
#[command(about = "Refresh parcel tracking statuses in a spreadsheet")]
#[command(version)]
pub struct CliConfig {
    /// Spreadsheet with a tracking number column (csv, tsv, xlsx, xls, ods)
    #[arg(short, long)]
    pub input: String,

    /// Where to write the results [default: <input>_updated.<ext>]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Name of the tracking number column; detected from common names when omitted
    #[arg(long)]
    pub tracking_column: Option<String>,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub api_endpoint: String,

    /// Language of the returned status texts
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    #[arg(long, env = "PARCEL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "PARCEL_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,

    /// Attempts per tracking number when the API fails transiently
    #[arg(long, default_value = "3")]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled on every further retry
    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    /// Save intermediate results every N records (0 disables)
    #[arg(long, default_value = "10")]
    pub checkpoint_every: usize,

    /// Also write the carrier's last update date and the action required
    #[arg(long)]
    pub with_details: bool,

    /// Read the spreadsheet and report what would be checked, without calling the API
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn api_settings(&self) -> ApiSettings {
        let credentials = match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Some(ApiCredentials {
                key: key.clone(),
                secret: secret.clone(),
            }),
            _ => None,
        };

        ApiSettings {
            endpoint: self.api_endpoint.clone(),
            language: self.language.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            credentials,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.retry_delay_ms),
            ..RetryPolicy::default()
        }
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.input))
    }

    fn tracking_column(&self) -> Option<&str> {
        self.tracking_column.as_deref()
    }

    fn checkpoint_every(&self) -> usize {
        self.checkpoint_every
    }

    fn include_details(&self) -> bool {
        self.with_details
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, READABLE_EXTENSIONS)?;

        let output = self.output_path();
        validation::validate_path("output", &output)?;
        validation::validate_file_extension("output", &output, WRITABLE_EXTENSIONS)?;

        if let Some(column) = &self.tracking_column {
            validation::validate_non_empty_string("tracking_column", column)?;
        }

        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_non_empty_string("language", &self.language)?;
        validation::validate_range("timeout_secs", self.timeout_secs, 1, 300)?;
        validation::validate_positive_number("max_attempts", self.max_attempts as usize, 1)?;
        validation::validate_range("retry_delay_ms", self.retry_delay_ms, 0, 60_000)?;
        validation::validate_credential_pair(self.api_key.as_deref(), self.api_secret.as_deref())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["parcel-tracker"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--input", "orders.xlsx"]);

        assert_eq!(config.output_path(), "orders_updated.xlsx");
        assert_eq!(config.api_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.checkpoint_every, 10);
        assert_eq!(config.retry_policy().max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_input_is_required() {
        assert!(CliConfig::try_parse_from(["parcel-tracker"]).is_err());
    }

    #[test]
    fn test_explicit_output_and_in_place() {
        let config = parse(&["--input", "orders.csv", "--output", "orders.csv"]);
        assert_eq!(config.output_path(), "orders.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(parse(&["--input", "orders.txt"]).validate().is_err());
        assert!(parse(&["--input", "a.csv", "--output", "b.ods"]).validate().is_err());
        assert!(parse(&["--input", "a.csv", "--api-endpoint", "ftp://x"]).validate().is_err());
        assert!(parse(&["--input", "a.csv", "--timeout-secs", "0"]).validate().is_err());
        assert!(parse(&["--input", "a.csv", "--max-attempts", "0"]).validate().is_err());
        assert!(parse(&["--input", "a.csv", "--tracking-column", " "]).validate().is_err());
    }

    #[test]
    fn test_credentials_from_flags() {
        let config = parse(&["--input", "a.csv", "--api-key", "k", "--api-secret", "s"]);
        let credentials = config.api_settings().credentials.unwrap();
        assert_eq!(credentials.key, "k");
        assert_eq!(credentials.secret, "s");
    }
}
