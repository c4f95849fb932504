//! Fetch Cycle Controller
//!
//! One controller drives one cadence (fast or slow) for one session. Each tick
//! fires every group of that cadence concurrently; results are tagged with the
//! session generation and sent to the session's publisher over an unbounded
//! channel. Requests are allowed to overlap across ticks. Nothing here decides
//! whether a result is still wanted beyond the local stop flag: the publisher
//! repeats the generation check under the session lock.

use crate::error::Result;
use crate::models::{SyncConfig, Symbol};
use crate::services::{DataGroup, DataSource, Payload};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Polling cadence a data group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Bot state, spot price, brain status
    Fast,
    /// Candles, 24h ticker, equity curve
    Slow,
}

impl Cadence {
    pub const ALL: [Cadence; 2] = [Cadence::Fast, Cadence::Slow];

    pub fn of(group: DataGroup) -> Self {
        match group {
            DataGroup::Stats
            | DataGroup::History
            | DataGroup::BotStatus
            | DataGroup::Price
            | DataGroup::AiStatus => Cadence::Fast,
            DataGroup::Candles | DataGroup::Ticker | DataGroup::Equity => Cadence::Slow,
        }
    }

    pub fn groups(self) -> Vec<DataGroup> {
        DataGroup::ALL
            .into_iter()
            .filter(|g| Cadence::of(*g) == self)
            .collect()
    }

    pub fn period(self, config: &SyncConfig) -> Duration {
        match self {
            Cadence::Fast => config.fast_period,
            Cadence::Slow => config.slow_period,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Fast => "fast",
            Cadence::Slow => "slow",
        }
    }
}

/// One resolved fetch, tagged with the generation that issued it
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub symbol: Symbol,
    pub group: DataGroup,
    pub result: Result<Payload>,
}

pub type OutcomeSender = mpsc::UnboundedSender<FetchOutcome>;
pub type OutcomeReceiver = mpsc::UnboundedReceiver<FetchOutcome>;

/// Repeating fetch timer bound to one symbol and generation
pub struct FetchCycleController {
    cadence: Cadence,
    groups: Vec<DataGroup>,
    period: Duration,
    symbol: Symbol,
    generation: u64,
    source: Arc<dyn DataSource>,
    outcomes: OutcomeSender,
    cancelled: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    timer: Option<JoinHandle<()>>,
}

impl FetchCycleController {
    pub fn new(
        cadence: Cadence,
        period: Duration,
        symbol: Symbol,
        generation: u64,
        source: Arc<dyn DataSource>,
        outcomes: OutcomeSender,
    ) -> Self {
        Self {
            cadence,
            groups: cadence.groups(),
            period,
            symbol,
            generation,
            source,
            outcomes,
            cancelled: Arc::new(AtomicBool::new(false)),
            ticks: Arc::new(AtomicU64::new(0)),
            timer: None,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticks fired so far (the immediate first fetch counts as one)
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some() && !self.cancelled.load(Ordering::Acquire)
    }

    /// Fire immediately, then every `period`
    ///
    /// No-op if already running or stopped; a stopped controller is never restarted.
    pub fn start(&mut self) {
        if self.timer.is_some() || self.cancelled.load(Ordering::Acquire) {
            return;
        }

        info!(
            symbol = %self.symbol,
            generation = self.generation,
            cadence = self.cadence.as_str(),
            period_ms = self.period.as_millis() as u64,
            "Starting fetch cycle"
        );

        let groups = self.groups.clone();
        let period = self.period;
        let symbol = self.symbol.clone();
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let outcomes = self.outcomes.clone();
        let cancelled = Arc::clone(&self.cancelled);
        let ticks = Arc::clone(&self.ticks);

        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if cancelled.load(Ordering::Acquire) {
                    break;
                }

                let tick = ticks.fetch_add(1, Ordering::AcqRel) + 1;
                debug!(symbol = %symbol, generation, tick, "Fetch tick");

                for &group in &groups {
                    let request = source.fetch(group, &symbol);
                    let outcomes = outcomes.clone();
                    let cancelled = Arc::clone(&cancelled);
                    let symbol = symbol.clone();

                    tokio::spawn(async move {
                        let result = request.await;

                        if cancelled.load(Ordering::Acquire) {
                            debug!(
                                symbol = %symbol,
                                generation,
                                group = %group,
                                "Discarding result that arrived after stop"
                            );
                            return;
                        }

                        let outcome = FetchOutcome {
                            generation,
                            symbol,
                            group,
                            result,
                        };
                        if outcomes.send(outcome).is_err() {
                            debug!(generation, group = %group, "Session publisher gone");
                        }
                    });
                }
            }
        }));
    }

    /// Cancel the timer and mark in-flight requests for discard; idempotent
    pub fn stop(&mut self) {
        let was_cancelled = self.cancelled.swap(true, Ordering::AcqRel);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if !was_cancelled {
            debug!(
                symbol = %self.symbol,
                generation = self.generation,
                cadence = self.cadence.as_str(),
                "Stopped fetch cycle"
            );
        }
    }
}

impl Drop for FetchCycleController {
    fn drop(&mut self) {
        self.stop();
    }
}
