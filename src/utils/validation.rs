use crate::utils::error::{Result, TrackerError};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> TrackerError {
    TrackerError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// Checks the extension of `path` case-insensitively against `allowed_extensions`.
pub fn validate_file_extension(field_name: &str, path: &str, allowed_extensions: &[&str]) -> Result<()> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| invalid(field_name, path, "File has no extension or invalid filename"))?;

    if !allowed_extensions.contains(&extension.as_str()) {
        return Err(invalid(
            field_name,
            path,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        ));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// Credentials are a pair: either both halves are present or neither.
pub fn validate_credential_pair(key: Option<&str>, secret: Option<&str>) -> Result<()> {
    match (key, secret) {
        (Some(_), None) => Err(TrackerError::MissingConfigError {
            field: "PARCEL_API_SECRET".to_string(),
        }),
        (None, Some(_)) => Err(TrackerError::MissingConfigError {
            field: "PARCEL_API_KEY".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_endpoint", "https://example.com").is_ok());
        assert!(validate_url("api_endpoint", "http://example.com").is_ok());
        assert!(validate_url("api_endpoint", "").is_err());
        assert!(validate_url("api_endpoint", "invalid-url").is_err());
        assert!(validate_url("api_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["csv", "tsv", "xlsx"];
        assert!(validate_file_extension("input", "parcels.csv", &allowed).is_ok());
        assert!(validate_file_extension("input", "PARCELS.XLSX", &allowed).is_ok());
        assert!(validate_file_extension("input", "parcels.txt", &allowed).is_err());
        assert!(validate_file_extension("input", "parcels", &allowed).is_err());
    }

    #[test]
    fn test_validate_range_and_positive() {
        assert!(validate_range("timeout_secs", 10u64, 1, 300).is_ok());
        assert!(validate_range("timeout_secs", 0u64, 1, 300).is_err());
        assert!(validate_positive_number("max_attempts", 0, 1).is_err());
        assert!(validate_non_empty_string("tracking_column", "  ").is_err());
    }

    #[test]
    fn test_credentials_must_come_in_pairs() {
        assert!(validate_credential_pair(None, None).is_ok());
        assert!(validate_credential_pair(Some("key"), Some("secret")).is_ok());
        assert!(matches!(
            validate_credential_pair(Some("key"), None),
            Err(TrackerError::MissingConfigError { field }) if field == "PARCEL_API_SECRET"
        ));
    }
}
