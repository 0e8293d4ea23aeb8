use crate::adapters::spreadsheet::{read_sheet, render_sheet};
use crate::core::cancel::CancellationFlag;
use crate::core::{
    ConfigProvider, ParcelStatus, Pipeline, RefreshResult, RunSummary, StatusFetcher, Storage,
    TrackingSheet,
};
use crate::domain::model::SheetPreview;
use crate::domain::services::{action_for_status, normalize_status_text};
use crate::utils::error::{Result, TrackerError};
use chrono::Utc;

/// Reads a spreadsheet, refreshes the status of every row and writes it back.
pub struct StatusPipeline<S: Storage, C: ConfigProvider, F: StatusFetcher> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) fetcher: F,
    cancel: CancellationFlag,
}

impl<S: Storage, C: ConfigProvider, F: StatusFetcher> StatusPipeline<S, C, F> {
    pub fn new(storage: S, config: C, fetcher: F) -> Self {
        Self {
            storage,
            config,
            fetcher,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reads the input and reports what a run would check.
    pub async fn preview(&self) -> Result<SheetPreview> {
        let sheet = self.extract().await?;
        Ok(SheetPreview {
            trackable: sheet.records.iter().filter(|r| r.is_trackable()).count(),
            rows: sheet.len(),
            tracking_column: sheet.tracking_column,
            headers: sheet.headers,
            output_path: self.config.output_path(),
        })
    }

    async fn write_sheet(&self, sheet: &TrackingSheet) -> Result<String> {
        let output_path = self.config.output_path();
        let data = render_sheet(&output_path, sheet, self.config.include_details())?;

        tracing::debug!("Writing {} bytes to {}", data.len(), output_path);
        self.storage.write_file(&output_path, &data).await?;
        Ok(output_path)
    }

    fn is_checkpoint(&self, processed: usize, total: usize) -> bool {
        let every = self.config.checkpoint_every();
        every > 0 && processed < total && processed % every == 0
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: StatusFetcher> Pipeline for StatusPipeline<S, C, F> {
    async fn extract(&self) -> Result<TrackingSheet> {
        let input_path = self.config.input_path();
        tracing::debug!("Reading spreadsheet from: {}", input_path);

        let data = self
            .storage
            .read_file(input_path)
            .await
            .map_err(|e| match e {
                TrackerError::IoError(io) => TrackerError::file_format(input_path, io.to_string()),
                other => other,
            })?;

        read_sheet(input_path, &data, self.config.tracking_column())
    }

    async fn transform(&self, mut sheet: TrackingSheet) -> Result<RefreshResult> {
        let total = sheet.len();
        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };

        for index in 0..total {
            if self.cancel.is_cancelled() {
                tracing::warn!("🛑 Stopping after {} of {} records", index, total);
                summary.cancelled = true;
                break;
            }

            {
                let record = &mut sheet.records[index];
                if !record.is_trackable() {
                    tracing::warn!("⏭️ [{}/{}] Row has no tracking number, skipping", index + 1, total);
                    summary.skipped += 1;
                } else {
                    let tracking_number = record.tracking_number.clone();
                    tracing::info!("🔎 [{}/{}] Checking {}", index + 1, total, tracking_number);

                    match self.fetcher.fetch_status(&tracking_number).await {
                        Ok(status) => {
                            let text = normalize_status_text(&status.text);
                            let action = action_for_status(&text).map(str::to_string);
                            tracing::info!("✅ {}: {}", tracking_number, text);
                            if let Some(action) = &action {
                                tracing::info!("⚠️ {}: {}", tracking_number, action);
                            }
                            record.apply_status(
                                ParcelStatus {
                                    text,
                                    event_date: status.event_date,
                                },
                                action,
                                Utc::now(),
                            );
                            summary.succeeded += 1;
                        }
                        Err(e) => {
                            tracing::error!("❌ {}: {}", tracking_number, e);
                            record.apply_failure(e.to_string());
                            summary.failed += 1;
                        }
                    }
                }
            }

            if self.is_checkpoint(index + 1, total) {
                match self.write_sheet(&sheet).await {
                    Ok(path) => tracing::info!("💾 Checkpoint after {} records saved to {}", index + 1, path),
                    Err(e) => tracing::warn!("Checkpoint after {} records failed: {}", index + 1, e),
                }
            }
        }

        Ok(RefreshResult { sheet, summary })
    }

    async fn load(&self, result: RefreshResult) -> Result<String> {
        let output_path = self.write_sheet(&result.sheet).await?;
        tracing::debug!("Spreadsheet saved successfully");
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FAILED_ACTION;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        writes: Arc<AtomicUsize>,
    }

    impl MockStorage {
        fn with_file(path: &str, content: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), content.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
                writes: Arc::new(AtomicUsize::new(0)),
            }
        }

        async fn get_text(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }

        fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                TrackerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        output_path: String,
        tracking_column: Option<String>,
        checkpoint_every: usize,
        include_details: bool,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                input_path: "in.csv".to_string(),
                output_path: "out.csv".to_string(),
                tracking_column: None,
                checkpoint_every: 0,
                include_details: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_path(&self) -> String {
            self.output_path.clone()
        }

        fn tracking_column(&self) -> Option<&str> {
            self.tracking_column.as_deref()
        }

        fn checkpoint_every(&self) -> usize {
            self.checkpoint_every
        }

        fn include_details(&self) -> bool {
            self.include_details
        }
    }

    /// Answers from a fixed table; unknown numbers fail with HTTP 404.
    #[derive(Default)]
    struct StubFetcher {
        statuses: HashMap<String, String>,
        calls: AtomicUsize,
        cancel_after_first: Option<CancellationFlag>,
    }

    impl StubFetcher {
        fn with(entries: &[(&str, &str)]) -> Self {
            Self {
                statuses: entries
                    .iter()
                    .map(|(number, status)| (number.to_string(), status.to_string()))
                    .collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait::async_trait]
    impl StatusFetcher for StubFetcher {
        async fn fetch_status(&self, tracking_number: &str) -> Result<ParcelStatus> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(cancel) = &self.cancel_after_first {
                cancel.cancel();
            }
            self.statuses
                .get(tracking_number)
                .map(|text| ParcelStatus::new(text.clone()).with_event_date("2024-05-01"))
                .ok_or_else(|| TrackerError::ApiStatusError {
                    status: 404,
                    tracking_number: tracking_number.to_string(),
                })
        }
    }

    const INPUT: &str = "Tracking Number,Customer\n123456789,Alice\nRR000000000CZ,Bob\n,Carol\n";

    async fn run_once(
        storage: MockStorage,
        config: MockConfig,
        fetcher: StubFetcher,
    ) -> (RefreshResult, String) {
        let pipeline = StatusPipeline::new(storage.clone(), config, fetcher);
        let sheet = pipeline.extract().await.unwrap();
        let result = pipeline.transform(sheet).await.unwrap();
        let path = pipeline.load(result.clone()).await.unwrap();
        let output = storage.get_text(&path).await.unwrap();
        (result, output)
    }

    #[tokio::test]
    async fn test_extract_reads_records_from_storage() {
        let storage = MockStorage::with_file("in.csv", INPUT);
        let pipeline = StatusPipeline::new(storage, MockConfig::new(), StubFetcher::default());

        let sheet = pipeline.extract().await.unwrap();

        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.records[1].tracking_number, "RR000000000CZ");
    }

    #[tokio::test]
    async fn test_preview_counts_rows_without_fetching() {
        let storage = MockStorage::with_file("in.csv", INPUT);
        let fetcher = StubFetcher::with(&[("123456789", "Delivered")]);
        let pipeline = StatusPipeline::new(storage.clone(), MockConfig::new(), fetcher);

        let preview = pipeline.preview().await.unwrap();

        assert_eq!(
            preview,
            SheetPreview {
                tracking_column: "Tracking Number".to_string(),
                headers: vec!["Tracking Number".to_string(), "Customer".to_string()],
                rows: 3,
                trackable: 2,
                output_path: "out.csv".to_string(),
            }
        );
        assert_eq!(pipeline.fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_a_file_format_error() {
        let storage = MockStorage::with_file("other.csv", INPUT);
        let pipeline = StatusPipeline::new(storage, MockConfig::new(), StubFetcher::default());

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, TrackerError::FileFormat { path, .. } if path == "in.csv"));
    }

    #[tokio::test]
    async fn test_transform_success_failure_and_skip() {
        let storage = MockStorage::with_file("in.csv", INPUT);
        let fetcher = StubFetcher::with(&[("123456789", "Delivered")]);

        let (result, output) = run_once(storage, MockConfig::new(), fetcher).await;

        assert_eq!(
            result.summary,
            RunSummary {
                total: 3,
                succeeded: 1,
                failed: 1,
                skipped: 1,
                cancelled: false,
            }
        );

        let delivered = &result.sheet.records[0];
        assert_eq!(delivered.status.as_deref(), Some("Delivered"));
        assert!(delivered.checked_at.is_some());

        let failed = &result.sheet.records[1];
        assert!(failed.status.is_none());
        assert_eq!(failed.action_required.as_deref(), Some(FAILED_ACTION));

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Tracking Number,Customer,Status,Checked At");
        assert!(lines[1].starts_with("123456789,Alice,Delivered,"));
        assert_eq!(lines[2], "RR000000000CZ,Bob,,");
        assert_eq!(lines[3], ",Carol,,");
    }

    #[tokio::test]
    async fn test_blank_rows_are_never_fetched() {
        let storage = MockStorage::with_file("in.csv", INPUT);
        let fetcher = StubFetcher::default();
        let pipeline = StatusPipeline::new(storage, MockConfig::new(), fetcher);

        let sheet = pipeline.extract().await.unwrap();
        pipeline.transform(sheet).await.unwrap();

        assert_eq!(pipeline.fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_status_text_is_normalised_and_actions_applied() {
        let input = "Tracking Number\nRR1\nRR2\n";
        let storage = MockStorage::with_file("in.csv", input);
        let fetcher = StubFetcher::with(&[
            ("RR1", "Receipt of data about consignment before posting."),
            ("RR2", "For&nbsp;more&nbsp;information&nbsp;please&nbsp;call&nbsp;information&nbsp;line&nbsp;CP<br>at&nbsp;218&nbsp;218&nbsp;218"),
        ]);
        let mut config = MockConfig::new();
        config.include_details = true;

        let (result, output) = run_once(storage, config, fetcher).await;

        assert_eq!(
            result.sheet.records[0].action_required.as_deref(),
            Some("The parcel has not been handed over for transport")
        );
        assert_eq!(
            result.sheet.records[1].status.as_deref(),
            Some("For more information please call information line CP at 218 218 218")
        );
        assert_eq!(
            result.sheet.records[1].action_required.as_deref(),
            Some("Please file a complaint with the Czech Post")
        );
        assert!(output.starts_with("Tracking Number,Last Update,Action Required,Status,Checked At\n"));
        assert!(output.contains("RR1,2024-05-01,The parcel has not been handed over for transport,"));
    }

    #[tokio::test]
    async fn test_rerun_yields_identical_statuses() {
        let statuses = [("123456789", "Delivered"), ("RR000000000CZ", "In transit")];
        let storage = MockStorage::with_file("in.csv", INPUT);

        let (first, _) = run_once(storage.clone(), MockConfig::new(), StubFetcher::with(&statuses)).await;
        let (second, _) = run_once(storage, MockConfig::new(), StubFetcher::with(&statuses)).await;

        let first_statuses: Vec<_> = first.sheet.records.iter().map(|r| r.status.clone()).collect();
        let second_statuses: Vec<_> = second.sheet.records.iter().map(|r| r.status.clone()).collect();
        assert_eq!(first_statuses, second_statuses);
    }

    #[tokio::test]
    async fn test_checkpoints_are_written_periodically() {
        let mut input = String::from("Tracking Number\n");
        for i in 0..25 {
            input.push_str(&format!("RR{:03}\n", i));
        }
        let storage = MockStorage::with_file("in.csv", &input);
        let mut config = MockConfig::new();
        config.checkpoint_every = 10;

        let (result, _) = run_once(storage.clone(), config, StubFetcher::default()).await;

        assert_eq!(result.summary.failed, 25);
        // two checkpoints (after 10 and 20 records) plus the final write
        assert_eq!(storage.write_count(), 3);
    }

    #[tokio::test]
    async fn test_cancellation_keeps_every_row() {
        let storage = MockStorage::with_file("in.csv", INPUT);
        let cancel = CancellationFlag::new();
        let fetcher = StubFetcher {
            cancel_after_first: Some(cancel.clone()),
            ..StubFetcher::with(&[("123456789", "Delivered")])
        };
        let pipeline =
            StatusPipeline::new(storage.clone(), MockConfig::new(), fetcher).with_cancellation(cancel);

        let sheet = pipeline.extract().await.unwrap();
        let result = pipeline.transform(sheet).await.unwrap();
        pipeline.load(result.clone()).await.unwrap();

        assert!(result.summary.cancelled);
        assert_eq!(result.summary.processed(), 1);
        assert_eq!(pipeline.fetcher.calls.load(Ordering::SeqCst), 1);

        let output = storage.get_text("out.csv").await.unwrap();
        assert_eq!(output.lines().count(), 4);
    }
}
