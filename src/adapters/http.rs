//! Client for the Czech Post B2C `ParcelHistory` JSON endpoint.

use crate::domain::model::ParcelStatus;
use crate::domain::ports::StatusFetcher;
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://b2c.cpost.cz/services/ParcelHistory/getDataAsJson";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const API_SECRET_HEADER: &str = "X-Api-Secret";

#[derive(Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub endpoint: String,
    pub language: String,
    pub timeout: Duration,
    pub credentials: Option<ApiCredentials>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            credentials: None,
        }
    }
}

pub struct CzechPostClient {
    client: Client,
    settings: ApiSettings,
}

impl CzechPostClient {
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("parcel-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Request for one parcel, with query parameters and credential headers applied.
    pub fn request(&self, tracking_number: &str) -> RequestBuilder {
        let mut request = self.client.get(&self.settings.endpoint).query(&[
            ("idParcel", tracking_number.trim()),
            ("language", self.settings.language.as_str()),
        ]);

        if let Some(credentials) = &self.settings.credentials {
            request = request
                .header(API_KEY_HEADER, &credentials.key)
                .header(API_SECRET_HEADER, &credentials.secret);
        }

        request
    }
}

#[async_trait]
impl StatusFetcher for CzechPostClient {
    async fn fetch_status(&self, tracking_number: &str) -> Result<ParcelStatus> {
        let tracking_number = tracking_number.trim();
        if tracking_number.is_empty() {
            return Err(TrackerError::InvalidTrackingNumber {
                value: tracking_number.to_string(),
            });
        }

        tracing::debug!(
            "Making API request to: {} (idParcel={})",
            self.settings.endpoint,
            tracking_number
        );
        let response = self.request(tracking_number).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(TrackerError::ApiStatusError {
                status: status.as_u16(),
                tracking_number: tracking_number.to_string(),
            });
        }

        let body = response.text().await?;
        parse_parcel_history(tracking_number, &body)
    }
}

#[derive(Debug, Deserialize)]
struct ParcelHistory {
    states: Option<ParcelStates>,
}

#[derive(Debug, Deserialize)]
struct ParcelStates {
    state: Option<OneOrMany<ParcelState>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParcelState {
    date: Option<String>,
    text: Option<String>,
}

/// Extracts the newest state from a `getDataAsJson` body.
///
/// The API does not guarantee chronological order, so the state with the
/// greatest non-empty `date` wins; the first one wins on ties.
pub fn parse_parcel_history(tracking_number: &str, body: &str) -> Result<ParcelStatus> {
    let invalid = |reason: String| TrackerError::InvalidResponseError {
        tracking_number: tracking_number.to_string(),
        reason,
    };

    // Only the first parcel is read; later elements may have any shape.
    let parcels: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| invalid(format!("unexpected response body: {}", e)))?;
    let first = match parcels.into_iter().next() {
        Some(value) => Some(
            serde_json::from_value::<ParcelHistory>(value)
                .map_err(|e| invalid(format!("unexpected parcel entry: {}", e)))?,
        ),
        None => None,
    };

    let states = first
        .and_then(|parcel| parcel.states)
        .and_then(|states| states.state)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    let newest = states
        .into_iter()
        .filter(|state| state.date.as_deref().is_some_and(|date| !date.is_empty()))
        .fold(None::<ParcelState>, |newest, state| match newest {
            Some(current) if state.date <= current.date => Some(current),
            _ => Some(state),
        })
        .ok_or_else(|| invalid("response contains no dated states".to_string()))?;

    let text = newest
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| invalid("newest state has no text".to_string()))?;

    let mut status = ParcelStatus::new(text);
    status.event_date = newest.date;
    Ok(status)
}
