//! Background task driving the cognition loop.
//!
//! Cycles run back to back with a verdict-dependent rest in between. The
//! rest sleep races the cancellation token; a cycle in progress (including
//! its diary write) always completes before the task exits.

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::cycle::CognitionLoop;

pub struct CognitionRunner {
    token: CancellationToken,
    handle: JoinHandle<CognitionLoop>,
}

impl CognitionRunner {
    /// Spawn the loop on the tokio runtime. It runs until `token` is
    /// cancelled or, when given, `max_cycles` cycles have completed.
    pub fn spawn(
        mut cognition: CognitionLoop,
        token: CancellationToken,
        max_cycles: Option<u64>,
    ) -> Self {
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            info!(run_id = %cognition.run_id(), ?max_cycles, "Cognition loop started");
            loop {
                if task_token.is_cancelled()
                    || max_cycles.is_some_and(|max| cognition.cycle() >= max)
                {
                    break;
                }
                let entry = cognition.run_one_cycle().await;
                if max_cycles.is_some_and(|max| cognition.cycle() >= max) {
                    break;
                }
                let rest = cognition.rest_duration(entry.reflection.verdict);
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = tokio::time::sleep(rest) => {}
                }
            }
            info!(cycles = cognition.cycle(), "Cognition loop stopped");
            cognition
        });
        Self { token, handle }
    }

    /// Request a stop. The current cycle finishes; the rest sleep is cut short.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task to exit and take the loop back.
    pub async fn join(self) -> Result<CognitionLoop> {
        self.handle.await.context("Cognition task panicked")
    }

    /// Stop and wait.
    pub async fn shutdown(self) -> Result<CognitionLoop> {
        self.stop();
        self.join().await
    }
}
