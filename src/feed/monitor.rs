//! Watchdog for the continuous visual feed
//!
//! - Initial refresh on start, cache buster attached per refresh
//! - Periodic staleness check that refreshes a feed gone quiet
//! - Delayed, bounded retries after load failures
//! - One terminal "lost" report when the retry budget is spent

use chrono::Utc;
use parking_lot::Mutex;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::FeedConfig;
use super::health::{FeedHealth, FeedSnapshot};
use super::transport::FeedTransport;
use crate::schedule::{spawn_delayed, spawn_recurring, PollSlot};
use crate::surface::{DisplaySurface, FeedStatusKind, NoticeLevel, Notifier};

struct MonitorState {
    health: FeedHealth,
    started_at: Instant,
    started: bool,
    /// A retry is scheduled; the staleness check stays out of its way
    retry_pending: bool,
    /// A load is in flight
    loading: bool,
    /// Retry budget spent, reported once
    lost: bool,
    /// A manual reconnect after a loss awaits its first successful load
    recovering: bool,
    disposed: bool,
    refreshes: u64,
    staleness: PollSlot,
    retry: PollSlot,
    load: PollSlot,
}

/// What a load result turned into, reported after the lock is released
enum Report {
    Quiet,
    Recovered,
    Reconnecting { attempt: u32, max: u32 },
    Lost { max: u32 },
}

struct MonitorInner {
    transport: Arc<dyn FeedTransport>,
    surface: Arc<dyn DisplaySurface>,
    notifier: Arc<dyn Notifier>,
    config: FeedConfig,
    state: Mutex<MonitorState>,
}

/// Keeps the feed alive without user intervention
pub struct FeedMonitor {
    inner: Arc<MonitorInner>,
}

impl FeedMonitor {
    pub fn new(
        transport: Arc<dyn FeedTransport>,
        surface: Arc<dyn DisplaySurface>,
        notifier: Arc<dyn Notifier>,
        config: FeedConfig,
    ) -> Self {
        let state = MonitorState {
            health: FeedHealth::new(config.max_retries),
            started_at: Instant::now(),
            started: false,
            retry_pending: false,
            loading: false,
            lost: false,
            recovering: false,
            disposed: false,
            refreshes: 0,
            staleness: PollSlot::new(),
            retry: PollSlot::new(),
            load: PollSlot::new(),
        };

        Self {
            inner: Arc::new(MonitorInner {
                transport,
                surface,
                notifier,
                config,
                state: Mutex::new(state),
            }),
        }
    }

    /// Perform the initial refresh and install the staleness check
    pub fn start(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.started || state.disposed {
                warn!("Feed monitor already started");
                return;
            }
            state.started = true;
            state.started_at = Instant::now();

            let inner = Arc::clone(&self.inner);
            state.staleness.restart(|| {
                spawn_recurring("feed-staleness", self.inner.config.check_interval(), move || {
                    std::future::ready(inner.check_staleness())
                })
            });
        }

        info!(
            "Feed monitor started (check every {:?}, stale after {:?}, {} retries)",
            self.inner.config.check_interval(),
            self.inner.config.stale_after(),
            self.inner.config.max_retries
        );
        self.inner.refresh("initial");
    }

    /// Report a load outcome observed outside the transport (e.g. a rendering element)
    pub fn report_loaded(&self) {
        self.inner.on_load_result(Ok(()), false);
    }

    pub fn report_failure(&self, reason: &str) {
        self.inner
            .on_load_result(Err(anyhow::anyhow!(reason.to_string())), false);
    }

    /// Manual reconnect: forget past failures and refresh now
    pub fn reconnect(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return;
            }
            state.recovering = state.lost || state.health.failure_count() > 0;
            state.lost = false;
            state.retry_pending = false;
            state.retry.cancel();
            state.health.reset_failures();
        }

        info!("Manual feed reconnect requested");
        self.inner.refresh("manual");
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.inner.state.lock();
        FeedSnapshot {
            consecutive_failures: state.health.failure_count(),
            max_retries: state.health.max_failures(),
            last_success_at: state.health.last_success_at(),
            last_success_secs_ago: state.health.secs_since_success(),
            retry_pending: state.retry_pending,
            lost: state.lost,
            disposed: state.disposed,
            refreshes: state.refreshes,
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.inner.state.lock().health.failure_count()
    }

    pub fn is_lost(&self) -> bool {
        self.inner.state.lock().lost
    }

    /// Cancel every callback; retries that still fire become no-ops
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.staleness.cancel();
        state.retry.cancel();
        state.load.cancel();
        state.loading = false;
        state.retry_pending = false;
        info!("Feed monitor disposed after {} refreshes", state.refreshes);
    }
}

impl Drop for FeedMonitor {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl MonitorInner {
    /// Start one load unless one is already in flight
    fn refresh(self: &Arc<Self>, reason: &'static str) {
        let mut state = self.state.lock();
        if state.disposed || state.loading {
            debug!("Feed refresh ({}) skipped", reason);
            return;
        }

        state.loading = true;
        state.refreshes += 1;
        let cache_buster = format!("{}-{}", Utc::now().timestamp_millis(), state.refreshes);
        debug!("Refreshing feed ({}), buster {}", reason, cache_buster);

        let inner = Arc::clone(self);
        state.load.restart(|| {
            spawn_delayed("feed-load", Duration::ZERO, async move {
                let result = inner.transport.load(&cache_buster).await;
                inner.on_load_result(result, true);
            })
        });
    }

    fn check_staleness(self: &Arc<Self>) -> ControlFlow<()> {
        let stale = {
            let state = self.state.lock();
            if state.disposed {
                return ControlFlow::Break(());
            }
            !state.lost
                && !state.retry_pending
                && !state.loading
                && state
                    .health
                    .is_stale(self.config.stale_after(), state.started_at)
        };

        if stale {
            info!("Feed is stale, refreshing");
            self.refresh("stale");
        }
        ControlFlow::Continue(())
    }

    fn on_load_result(self: &Arc<Self>, result: anyhow::Result<()>, from_load_task: bool) {
        let report = {
            let mut state = self.state.lock();
            if from_load_task {
                state.load.release();
                state.loading = false;
            }
            if state.disposed {
                return;
            }

            match result {
                Ok(()) => {
                    let reconnected = std::mem::take(&mut state.recovering) || state.lost;
                    let recovered = state.health.record_success() || reconnected;
                    state.retry_pending = false;
                    state.lost = false;
                    state.retry.cancel();
                    if recovered {
                        Report::Recovered
                    } else {
                        Report::Quiet
                    }
                }
                Err(e) if state.lost => {
                    debug!("Feed load failed after it was declared lost: {:#}", e);
                    Report::Quiet
                }
                Err(e) => {
                    let max = state.health.max_failures();
                    match state.health.record_failure() {
                        Some(attempt) => {
                            warn!("Feed load failed ({}/{}): {:#}", attempt, max, e);
                            state.retry_pending = true;

                            let inner = Arc::clone(self);
                            state.retry.restart(|| {
                                spawn_delayed("feed-retry", self.config.retry_delay(), async move {
                                    inner.fire_retry();
                                })
                            });
                            Report::Reconnecting { attempt, max }
                        }
                        None => {
                            error!("Feed lost after {} reconnect attempts: {:#}", max, e);
                            state.lost = true;
                            state.retry_pending = false;
                            Report::Lost { max }
                        }
                    }
                }
            }
        };

        self.publish(report);
    }

    fn fire_retry(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            state.retry.release();
            if state.disposed || !state.retry_pending {
                return;
            }
            state.retry_pending = false;
        }
        self.refresh("retry");
    }

    fn publish(&self, report: Report) {
        match report {
            Report::Quiet => debug!("Feed loaded"),
            Report::Recovered => {
                info!("Feed recovered");
                self.surface
                    .on_feed_status(FeedStatusKind::Recovered, "Video feed reconnected");
                self.notifier
                    .notify(NoticeLevel::Success, "Video feed reconnected");
            }
            Report::Reconnecting { attempt, max } => {
                let detail = format!("Reconnecting ({}/{})", attempt, max);
                self.surface
                    .on_feed_status(FeedStatusKind::Reconnecting, &detail);
                self.notifier.notify(NoticeLevel::Warning, &detail);
            }
            Report::Lost { max } => {
                let detail = format!(
                    "Video feed lost after {} attempts. Reconnect manually to try again.",
                    max
                );
                self.surface.on_feed_status(FeedStatusKind::Lost, &detail);
                self.notifier.notify(NoticeLevel::Error, &detail);
            }
        }
    }
}
