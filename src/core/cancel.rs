use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop request, checked by the pipeline between records.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Exit status used when a second interrupt aborts the run.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Sets `flag` on the first Ctrl-C; a second one exits the process without writing.
pub fn cancel_on_ctrl_c(flag: CancellationFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("🛑 Interrupt received, finishing the current record and writing results");
        tracing::warn!("🛑 Press Ctrl-C again to stop immediately");
        flag.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("🛑 Second interrupt received, exiting without writing results");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
