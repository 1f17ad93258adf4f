// Metric simulator - Generates bounded time series for the metric catalog
use crate::application::scheduler::{Scheduler, TaskHandle};
use crate::application::store::{Store, Subscription};
use crate::domain::metric_catalog::{FAN_PAIRED_TEMPERATURES, METRIC_CATALOG, MetricClass, find_spec};
use crate::domain::signal;
use crate::domain::telemetry::HardwareMetric;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Weak};
use std::time::Duration;

pub const DEFAULT_POLLING_RATE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorState {
    pub is_polling: bool,
    pub polling_rate: Duration,
    /// One entry per catalog metric, in catalog order.
    pub metrics: Vec<HardwareMetric>,
}

impl SimulatorState {
    pub fn metric(&self, id: &str) -> Option<&HardwareMetric> {
        self.metrics.iter().find(|m| m.id == id)
    }
}

pub struct MetricSimulator {
    store: Store<SimulatorState>,
    scheduler: Arc<dyn Scheduler>,
    timer: Mutex<Option<TaskHandle>>,
    rng: Mutex<StdRng>,
    this: Weak<MetricSimulator>,
}

impl MetricSimulator {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Arc<Self> {
        Self::with_rng(scheduler, StdRng::from_os_rng())
    }

    /// Simulator whose values are reproducible for a given seed.
    pub fn with_seed(scheduler: Arc<dyn Scheduler>, seed: u64) -> Arc<Self> {
        Self::with_rng(scheduler, StdRng::seed_from_u64(seed))
    }

    fn with_rng(scheduler: Arc<dyn Scheduler>, mut rng: StdRng) -> Arc<Self> {
        let metrics = METRIC_CATALOG
            .iter()
            .map(|spec| {
                HardwareMetric::new(
                    spec.id.to_string(),
                    spec.name.to_string(),
                    spec.unit.to_string(),
                    spec.min,
                    spec.max,
                    rng.random_range(spec.seed.clone()),
                )
            })
            .collect();

        Arc::new_cyclic(|this| Self {
            store: Store::new(SimulatorState {
                is_polling: false,
                polling_rate: DEFAULT_POLLING_RATE,
                metrics,
            }),
            scheduler,
            timer: Mutex::new(None),
            rng: Mutex::new(rng),
            this: this.clone(),
        })
    }

    pub fn start_polling(&self) {
        self.store.update(|s| SimulatorState {
            is_polling: true,
            ..s.clone()
        });

        let rate = self.store.state().polling_rate;
        let mut timer = self.timer.lock();
        if let Some(previous) = timer.take() {
            self.scheduler.cancel(previous);
        }

        let this = self.this.clone();
        let handle = self.scheduler.schedule(
            rate,
            Box::new(move || {
                if let Some(simulator) = this.upgrade() {
                    simulator.tick();
                }
            }),
        );
        *timer = Some(handle);
        tracing::info!(rate_ms = rate.as_millis() as u64, "metric polling started");
    }

    pub fn stop_polling(&self) {
        if let Some(handle) = self.timer.lock().take() {
            self.scheduler.cancel(handle);
            tracing::info!("metric polling stopped");
        }
        self.store.update(|s| SimulatorState {
            is_polling: false,
            ..s.clone()
        });
    }

    /// Change the tick interval; a running timer is replaced at the new rate.
    /// A zero rate falls back to the default.
    pub fn set_polling_rate(&self, rate: Duration) {
        let rate = if rate.is_zero() {
            tracing::warn!("polling rate of zero rejected, using default");
            DEFAULT_POLLING_RATE
        } else {
            rate
        };
        self.store.update(|s| SimulatorState {
            polling_rate: rate,
            ..s.clone()
        });

        if self.is_polling() {
            self.stop_polling();
            self.start_polling();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.store.state().is_polling
    }

    pub fn polling_rate(&self) -> Duration {
        self.store.state().polling_rate
    }

    pub fn get_metric(&self, id: &str) -> Option<HardwareMetric> {
        self.store.state().metric(id).cloned()
    }

    pub fn metrics(&self) -> Vec<HardwareMetric> {
        self.store.state().metrics.clone()
    }

    pub fn state(&self) -> Arc<SimulatorState> {
        self.store.state()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SimulatorState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn tick(&self) {
        self.tick_at(chrono::Utc::now().timestamp_millis());
    }

    /// Advance every metric one step as of `now_ms` (unix millis).
    pub fn tick_at(&self, now_ms: i64) {
        let t_secs = now_ms as f64 / 1000.0;

        self.store.update(|s| {
            let mut rng = self.rng.lock();
            let paired_temperature = FAN_PAIRED_TEMPERATURES
                .iter()
                .find_map(|id| s.metric(id))
                .map(|m| m.current_value);

            let metrics = s
                .metrics
                .iter()
                .map(|metric| {
                    let class = find_spec(&metric.id).map_or(MetricClass::Other, |spec| spec.class);
                    let delta = signal::delta(class, t_secs, paired_temperature, &mut *rng);
                    let mut next = metric.clone();
                    next.record(now_ms, metric.current_value + delta);
                    next
                })
                .collect();

            SimulatorState {
                metrics,
                ..s.clone()
            }
        });
        tracing::trace!(now_ms, "metrics ticked");
    }
}

impl Drop for MetricSimulator {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            self.scheduler.cancel(handle);
        }
    }
}
