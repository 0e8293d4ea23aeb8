use crate::domain::model::RunReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's extract, transform and load phases in order.
pub struct TrackingEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> TrackingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("📥 Reading spreadsheet...");
        let sheet = self.pipeline.extract().await?;
        tracing::info!(
            "Read {} records (tracking column: '{}')",
            sheet.len(),
            sheet.tracking_column
        );
        self.monitor.log_stats("Extract");

        tracing::info!("🔎 Fetching parcel statuses...");
        let result = self.pipeline.transform(sheet).await?;
        let summary = result.summary.clone();
        tracing::info!(
            "Checked {} of {} records: {} succeeded, {} failed, {} skipped",
            summary.processed(),
            summary.total,
            summary.succeeded,
            summary.failed,
            summary.skipped
        );
        if summary.cancelled {
            tracing::warn!("⚠️ Run was cancelled, unprocessed rows keep an empty status");
        }
        self.monitor.log_stats("Transform");

        tracing::info!("💾 Writing results...");
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_throughput(summary.processed());

        Ok(RunReport {
            output_path,
            summary,
        })
    }
}
