use parking_lot::Mutex;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::gateway::SessionService;
use crate::schedule::{spawn_recurring, PollSlot};
use crate::surface::DisplaySurface;

/// Fetches the current prediction on a fixed cadence while a session is active
pub struct PredictionPoller {
    service: Arc<dyn SessionService>,
    surface: Arc<dyn DisplaySurface>,
    interval: Duration,
    slot: Mutex<PollSlot>,

    /// Bumped on every start/stop so a tick already past its fetch can tell it is stale
    generation: Arc<AtomicU64>,

    ticks: Arc<AtomicUsize>,
    failed_ticks: Arc<AtomicUsize>,
}

impl PredictionPoller {
    pub fn new(
        service: Arc<dyn SessionService>,
        surface: Arc<dyn DisplaySurface>,
        interval: Duration,
    ) -> Self {
        Self {
            service,
            surface,
            interval,
            slot: Mutex::new(PollSlot::new()),
            generation: Arc::new(AtomicU64::new(0)),
            ticks: Arc::new(AtomicUsize::new(0)),
            failed_ticks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start polling, replacing any previous poller
    pub fn start(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.ticks.store(0, Ordering::SeqCst);
        self.failed_ticks.store(0, Ordering::SeqCst);

        let service = Arc::clone(&self.service);
        let surface = Arc::clone(&self.surface);
        let current = Arc::clone(&self.generation);
        let ticks = Arc::clone(&self.ticks);
        let failed_ticks = Arc::clone(&self.failed_ticks);

        self.slot.lock().restart(|| {
            spawn_recurring("prediction-poller", self.interval, move || {
                let service = Arc::clone(&service);
                let surface = Arc::clone(&surface);
                let current = Arc::clone(&current);
                let ticks = Arc::clone(&ticks);
                let failed_ticks = Arc::clone(&failed_ticks);

                async move {
                    let result = service.current_prediction().await;

                    if current.load(Ordering::SeqCst) != generation {
                        return ControlFlow::Break(());
                    }

                    match result {
                        Ok(prediction) => {
                            ticks.fetch_add(1, Ordering::SeqCst);
                            surface.on_prediction_tick(&prediction);
                        }
                        Err(e) => {
                            // Best effort: a failed tick never stops the poller
                            failed_ticks.fetch_add(1, Ordering::SeqCst);
                            warn!("Prediction poll failed: {}", e);
                        }
                    }

                    ControlFlow::Continue(())
                }
            })
        });

        info!("Prediction poller started ({:?} cadence)", self.interval);
    }

    /// Stop polling. Returns `false` if nothing was running.
    pub fn stop(&self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let cancelled = self.slot.lock().cancel();
        if cancelled {
            info!("Prediction poller stopped");
        } else {
            debug!("Prediction poller was not running");
        }
        cancelled
    }

    pub fn is_running(&self) -> bool {
        self.slot.lock().is_active()
    }

    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn failed_ticks(&self) -> usize {
        self.failed_ticks.load(Ordering::SeqCst)
    }
}
