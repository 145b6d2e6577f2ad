// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{oneshot, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::{PollerConfig, SdnError};

#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
/// Latest accepted value of a poller plus the error of the last fetch.
///
/// A failed fetch sets `error` but keeps `value`, so stale-but-valid data is
/// still available during transient outages.
pub struct PollState<T> {
    pub value: Option<Arc<T>>,
    pub error: Option<SdnError>,
    /// Incremented on every publish of a new value.
    pub generation: u64,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            value: None,
            error: None,
            generation: 0,
        }
    }
}

impl<T> PollState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_deref()
    }
}

/// Repeatedly fetch a value and publish it to subscribers only when it is
/// structurally different from the last accepted one.
///
/// Only one fetch is in flight at a time: timer ticks that fire during a
/// fetch are skipped and refresh requests are dropped. A failed fetch never
/// stops the loop.
pub struct ReconcilingPoller<T> {
    name: String,
    state_rx: watch::Receiver<PollState<T>>,
    refresh_notify: Arc<Notify>,
    in_flight: Arc<AtomicBool>,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl<T> ReconcilingPoller<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    /// Spawn the polling loop on current tokio runtime. The first fetch
    /// happens immediately.
    ///
    /// Fails with [crate::ErrorKind::InvalidArgument] when the interval of
    /// `config` is zero.
    pub fn start<F, Fut>(
        name: &str,
        config: PollerConfig,
        fetch: F,
    ) -> Result<Self, SdnError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, SdnError>> + Send + 'static,
    {
        config.validate()?;
        let (state_tx, state_rx) = watch::channel(PollState::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let refresh_notify = Arc::new(Notify::new());
        let in_flight = Arc::new(AtomicBool::new(false));

        log::debug!(
            "Starting poller {name} with interval {}ms, min gap {}ms",
            config.interval_ms,
            config.min_gap_ms
        );
        let task = tokio::spawn(poll_loop(
            name.to_string(),
            config,
            fetch,
            state_tx,
            refresh_notify.clone(),
            in_flight.clone(),
            shutdown_rx,
        ));

        Ok(Self {
            name: name.to_string(),
            state_rx,
            refresh_notify,
            in_flight,
            shutdown_tx,
            task,
        })
    }

    /// Receiver notified on every publish and on every change of the error
    /// state.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.state_rx.clone()
    }

    /// Clone of the current state.
    pub fn state(&self) -> PollState<T> {
        self.state_rx.borrow().clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Ask for a fetch ahead of the next timer tick. Returns false when the
    /// request is dropped because a fetch is already in flight. The request
    /// is still subject to [PollerConfig::min_gap_ms].
    pub fn request_refresh(&self) -> bool {
        if self.is_fetching() {
            log::debug!(
                "Poller {}: dropping refresh request, fetch in flight",
                self.name
            );
            false
        } else {
            self.refresh_notify.notify_one();
            true
        }
    }

    /// Stop the loop. An in-flight fetch is cancelled, no fetch is started
    /// and no subscriber is notified once this function returns.
    pub async fn stop(self) {
        // Error means the loop has already quit
        self.shutdown_tx.send(()).ok();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
        log::debug!("Poller {} stopped", self.name);
    }
}

impl<T> Clone for PollState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            error: self.error.clone(),
            generation: self.generation,
        }
    }
}

async fn poll_loop<T, F, Fut>(
    name: String,
    config: PollerConfig,
    mut fetch: F,
    state_tx: watch::Sender<PollState<T>>,
    refresh_notify: Arc<Notify>,
    in_flight: Arc<AtomicBool>,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    T: PartialEq + Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, SdnError>> + Send + 'static,
{
    let mut interval = tokio::time::interval(config.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_success: Option<Instant> = None;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            _ = interval.tick() => (),
            _ = refresh_notify.notified() => {
                log::debug!("Poller {name}: refresh requested");
            }
        }

        if let Some(last) = last_success {
            if last.elapsed() < config.min_gap() {
                log::debug!(
                    "Poller {name}: skipping fetch, last success {}ms ago",
                    last.elapsed().as_millis()
                );
                continue;
            }
        }

        in_flight.store(true, Ordering::SeqCst);
        let result = tokio::select! {
            biased;
            _ = &mut shutdown_rx => {
                in_flight.store(false, Ordering::SeqCst);
                break;
            }
            result = fetch() => result,
        };
        in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(new_value) => {
                last_success = Some(Instant::now());
                state_tx.send_if_modified(|state| {
                    let recovered = state.error.take().is_some();
                    if state.value.as_deref() == Some(&new_value) {
                        log::debug!("Poller {name}: value unchanged");
                        recovered
                    } else {
                        state.value = Some(Arc::new(new_value));
                        state.generation += 1;
                        log::info!(
                            "Poller {name}: published generation {}",
                            state.generation
                        );
                        true
                    }
                });
            }
            Err(e) => {
                log::warn!("Poller {name}: fetch failed: {e}");
                state_tx.send_modify(|state| state.error = Some(e));
            }
        }
    }
}
