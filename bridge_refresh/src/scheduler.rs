use crate::refresher::Refresher;
use bridge_core::{BridgeError, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerSummary {
    pub cycles: u64,
    /// A cycle was still running when the grace period ran out.
    pub abandoned_cycle: bool,
}

/// Drives the refresher at a fixed interval until cancelled.
///
/// The first cycle starts immediately. Cycles never overlap: ticks that fall
/// due while a cycle is still running are dropped rather than queued.
pub struct Scheduler {
    refresher: Refresher,
    interval: Duration,
    shutdown_grace: Duration,
    shutdown: CancellationToken,
    state: watch::Sender<SchedulerState>,
}

impl Scheduler {
    pub fn new(refresher: Refresher, interval: Duration, shutdown: CancellationToken) -> Result<Self> {
        if interval.is_zero() {
            return Err(BridgeError::InvalidConfig(
                "Refresh interval must be > 0".to_string(),
            ));
        }

        let (state, _) = watch::channel(SchedulerState::Idle);
        Ok(Self {
            refresher,
            interval,
            shutdown_grace: Duration::from_secs(5),
            shutdown,
            state,
        })
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub async fn run(self) -> SchedulerSummary {
        info!("Starting refresh scheduler (interval: {:?})", self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut summary = SchedulerSummary::default();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.state.send_replace(SchedulerState::Running);
            let cycle = self.refresher.run_cycle();
            tokio::pin!(cycle);

            tokio::select! {
                report = &mut cycle => {
                    summary.cycles += 1;
                    debug!("Cycle {} done, next tick in at most {:?}", report.cycle, self.interval);
                    self.state.send_replace(SchedulerState::Idle);
                }
                _ = self.shutdown.cancelled() => {
                    match tokio::time::timeout(self.shutdown_grace, &mut cycle).await {
                        Ok(_) => summary.cycles += 1,
                        Err(_) => {
                            warn!(
                                "Refresh cycle still running after {:?}, abandoning it",
                                self.shutdown_grace
                            );
                            summary.abandoned_cycle = true;
                        }
                    }
                    break;
                }
            }
        }

        self.state.send_replace(SchedulerState::Stopped);
        info!("Refresh scheduler stopped after {} cycle(s)", summary.cycles);
        summary
    }
}
