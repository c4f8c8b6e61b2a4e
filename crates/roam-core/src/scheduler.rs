//! Tick Scheduler
//!
//! Drives an `Engine` on a fixed wall-clock period and broadcasts each
//! committed snapshot to subscribers.

use roam_events::PopulationSnapshot;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::engine::Engine;
use crate::store::TickReport;

/// Periodic driver for an engine
pub struct TickScheduler {
    engine: Arc<Engine>,
    period: Duration,
    sender: watch::Sender<Arc<PopulationSnapshot>>,
}

impl TickScheduler {
    /// Uses the configured `tick_seconds` as the period.
    pub fn new(engine: Arc<Engine>) -> Self {
        let period = Duration::from_secs_f64(engine.config().simulation.tick_seconds);
        Self::with_period(engine, period)
    }

    pub fn with_period(engine: Arc<Engine>, period: Duration) -> Self {
        let (sender, _) = watch::channel(engine.snapshot());
        Self {
            engine,
            period,
            sender,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Receiver that always holds the latest committed snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PopulationSnapshot>> {
        self.sender.subscribe()
    }

    /// Runs exactly `ticks` ticks, one per period, calling `on_tick` after
    /// each. Returns the report of the last tick run.
    pub async fn run_ticks<F>(&self, ticks: u64, mut on_tick: F) -> Option<TickReport>
    where
        F: FnMut(&TickReport, &Arc<PopulationSnapshot>),
    {
        let mut timer = self.timer();
        let mut last = None;

        for _ in 0..ticks {
            timer.tick().await;
            last = Some(self.step(&mut on_tick));
        }
        last
    }

    /// Ticks until `shutdown` resolves. Returns the number of ticks run.
    pub async fn run_until<S, F>(&self, shutdown: S, mut on_tick: F) -> u64
    where
        S: Future<Output = ()>,
        F: FnMut(&TickReport, &Arc<PopulationSnapshot>),
    {
        let mut timer = self.timer();
        let mut ticks = 0;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Scheduler stopping after {} ticks", ticks);
                    break;
                }
                _ = timer.tick() => {
                    self.step(&mut on_tick);
                    ticks += 1;
                }
            }
        }
        ticks
    }

    // First tick fires one period from now; a late tick delays the ones after
    // it instead of bursting.
    fn timer(&self) -> Interval {
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }

    fn step<F>(&self, on_tick: &mut F) -> TickReport
    where
        F: FnMut(&TickReport, &Arc<PopulationSnapshot>),
    {
        let report = self.engine.tick();
        let snapshot = self.engine.snapshot();
        on_tick(&report, &snapshot);
        self.sender.send_replace(snapshot);
        report
    }
}
