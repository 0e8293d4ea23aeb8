pub mod cancel;
pub mod etl;
pub mod retry;

pub use crate::domain::model::{ParcelStatus, RefreshResult, RunSummary, TrackingRecord, TrackingSheet};
pub use crate::domain::ports::{ConfigProvider, Pipeline, StatusFetcher, Storage};
pub use crate::utils::error::Result;
