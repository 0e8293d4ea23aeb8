use crate::domain::model::{ParcelStatus, RefreshResult, TrackingSheet};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> String;
    fn tracking_column(&self) -> Option<&str>;
    fn checkpoint_every(&self) -> usize;
    fn include_details(&self) -> bool;
}

/// Looks up the current carrier status of one parcel.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch_status(&self, tracking_number: &str) -> Result<ParcelStatus>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<TrackingSheet>;
    async fn transform(&self, sheet: TrackingSheet) -> Result<RefreshResult>;
    async fn load(&self, result: RefreshResult) -> Result<String>;
}
