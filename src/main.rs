use clap::Parser;
use parcel_tracker::core::cancel::cancel_on_ctrl_c;
use parcel_tracker::utils::{logger, validation::Validate};
use parcel_tracker::{
    CancellationFlag, CliConfig, CzechPostClient, LocalStorage, RetryingFetcher, StatusPipeline,
    TrackerError, TrackingEngine,
};

fn report_failure(stage: &str, e: &TrackerError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting parcel-tracker");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        report_failure("Configuration validation", &e);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let client = match CzechPostClient::new(config.api_settings()) {
        Ok(client) => client,
        Err(e) => report_failure("HTTP client setup", &e),
    };
    let cancel = CancellationFlag::new();
    let fetcher =
        RetryingFetcher::new(client, config.retry_policy()).with_cancellation(cancel.clone());

    let dry_run = config.dry_run;
    let pipeline = StatusPipeline::new(LocalStorage::current_dir(), config, fetcher)
        .with_cancellation(cancel.clone());

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no API requests will be made");
        match pipeline.preview().await {
            Ok(preview) => {
                println!("📋 Tracking column: {}", preview.tracking_column);
                println!("📋 Columns: {}", preview.headers.join(", "));
                println!(
                    "📋 {} rows, {} with a tracking number, results would go to {}",
                    preview.rows, preview.trackable, preview.output_path
                );
            }
            Err(e) => report_failure("Reading spreadsheet", &e),
        }
        return;
    }

    let listener = cancel_on_ctrl_c(cancel);
    let engine = TrackingEngine::new_with_monitoring(pipeline, monitor_enabled);
    let outcome = engine.run().await;
    listener.abort();

    match outcome {
        Ok(report) => {
            let summary = &report.summary;
            tracing::info!("✅ Status refresh completed");
            tracing::info!("📁 Output saved to: {}", report.output_path);
            println!(
                "✅ Checked {} of {} parcels: {} successful, {} failed, {} without tracking number",
                summary.processed(),
                summary.total,
                summary.succeeded,
                summary.failed,
                summary.skipped
            );
            if summary.cancelled {
                println!("⚠️ Run was interrupted, remaining rows have no status");
            }
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => report_failure("Status refresh", &e),
    }
}
