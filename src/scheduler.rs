//! Recurring inbox runs on a timer, plus manual triggers

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{Settings, SettingsStore};
use crate::notifications;
use crate::processor::InboxProcessor;
use crate::store::FileStore;

/// Handle to a running scheduler task
pub struct SchedulerHandle {
    trigger: mpsc::Sender<()>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request a manual run. Returns `false` if one is already queued.
    pub fn trigger(&self) -> bool {
        self.trigger.try_send(()).is_ok()
    }

    /// A sender other tasks can use to request manual runs
    pub fn trigger_sender(&self) -> mpsc::Sender<()> {
        self.trigger.clone()
    }

    /// Clear the pending timer and wait for the task to end.
    ///
    /// A run that is already in progress is allowed to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!("Scheduler task failed: {}", e);
        }
    }
}

/// Waits for the next tick, or forever when automatic runs are disabled
async fn next_tick(interval: Option<Duration>) {
    match interval {
        Some(interval) => tokio::time::sleep(interval).await,
        None => std::future::pending().await,
    }
}

fn log_interval(interval: Option<Duration>) {
    match interval {
        Some(interval) => info!("Processing inbox every {}s", interval.as_secs()),
        None => info!("Automatic runs disabled; waiting for manual triggers"),
    }
}

/// Pick up settings saved since the last run. On failure the current ones stay.
fn refresh<S: FileStore>(processor: &InboxProcessor<S>, source: &dyn SettingsStore) {
    match Settings::load_from(source) {
        Ok(settings) => {
            notifications::init(settings.notify_on_error);
            processor.reload(settings);
        }
        Err(e) => warn!("Keeping current settings: {:#}", e),
    }
}

/// Start the run loop for a processor.
///
/// With a settings `source`, settings are reloaded before every run and the
/// interval is re-read before every wait. The next run is scheduled only
/// once the previous one has completed, so runs never overlap.
pub fn spawn<S>(
    processor: Arc<InboxProcessor<S>>,
    source: Option<Arc<dyn SettingsStore>>,
) -> SchedulerHandle
where
    S: FileStore + 'static,
{
    let (trigger_tx, mut trigger_rx) = mpsc::channel(1);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
    let mut interval = processor.settings().interval();
    log_interval(interval);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!("Scheduler shutting down");
                    break;
                }
                Some(()) = trigger_rx.recv() => {
                    info!("Manual inbox run requested");
                }
                _ = next_tick(interval) => {
                    debug!("Scheduled inbox run");
                }
            }

            let run = Arc::clone(&processor);
            let source = source.clone();
            let result = tokio::task::spawn_blocking(move || {
                if let Some(source) = source {
                    refresh(&run, source.as_ref());
                }
                run.process_inbox()
            })
            .await;
            match result {
                Ok(report) => debug!("Run finished: {:?}", report),
                Err(e) => error!("Inbox run panicked: {}", e),
            }

            let next = processor.settings().interval();
            if next != interval {
                log_interval(next);
                interval = next;
            }
        }
    });

    SchedulerHandle {
        trigger: trigger_tx,
        shutdown: shutdown_tx,
        task,
    }
}
