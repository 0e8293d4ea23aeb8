use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("parcel_tracker=debug,info")
        } else {
            EnvFilter::new("parcel_tracker=info")
        }
    })
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Machine readable output, one JSON object per event.
pub fn init_json_logger(verbose: bool) {
    json_subscriber(verbose, std::io::stdout).init();
}

fn json_subscriber<W>(verbose: bool, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(default_filter(verbose)).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(writer)
            .json()
            .with_current_span(false),
    )
}
