pub mod adapters;
pub mod app;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::http::{ApiSettings, CzechPostClient};
pub use app::pipelines::StatusPipeline;
pub use core::{
    cancel::CancellationFlag,
    etl::TrackingEngine,
    retry::{RetryPolicy, RetryingFetcher},
};
pub use domain::model::{
    ParcelStatus, RunReport, RunSummary, SheetPreview, TrackingRecord, TrackingSheet,
};
pub use utils::error::{Result, TrackerError};
