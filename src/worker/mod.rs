pub mod fetch_cycle;

#[cfg(test)]
pub(crate) mod scripted;

pub use fetch_cycle::{Cadence, FetchCycleController, FetchOutcome, OutcomeReceiver, OutcomeSender};
