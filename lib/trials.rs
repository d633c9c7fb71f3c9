//! Monte Carlo over many independent simulator instances.
//!
//! Instances share no mutable state, so trials are spread over a `rayon`
//! thread pool with one [`Simulator`] per trial. Trial `t` is seeded with
//! `seed + t`, which makes the collected results independent of scheduling.

use rayon::prelude::*;
use tracing::info;
use crate::{
    error::Result,
    sim::Simulator,
};

/// Parameters for [`run_trials`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrialConfig {
    /// Number of qubits per instance.
    pub qubits: usize,
    /// Number of independent instances.
    pub trials: usize,
    /// Seed of the first instance.
    pub seed: u64,
}

impl Default for TrialConfig {
    fn default() -> Self { Self { qubits: 1, trials: 1000, seed: 0 } }
}

/// Run `f` on `config.trials` freshly built simulators in parallel, returning
/// the results in trial order.
///
/// Fails if any trial fails; which error is returned when several do is
/// unspecified.
pub fn run_trials<T, F>(config: &TrialConfig, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&mut Simulator) -> Result<T> + Sync,
{
    info!(qubits = config.qubits, trials = config.trials, seed = config.seed, "running trials");
    (0..config.trials)
        .into_par_iter()
        .map(|t| {
            let mut sim
                = Simulator::new(config.qubits, config.seed.wrapping_add(t as u64))?;
            f(&mut sim)
        })
        .collect()
}

/// Counts of measured zeros and ones.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub zeros: usize,
    pub ones: usize,
}

impl Tally {
    pub fn total(&self) -> usize { self.zeros + self.ones }

    /// Fraction of ones, or `None` if nothing was counted.
    pub fn fraction_ones(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.ones as f64 / total as f64)
    }

    /// Fraction of zeros, or `None` if nothing was counted.
    pub fn fraction_zeros(&self) -> Option<f64> {
        self.fraction_ones().map(|p| 1.0 - p)
    }
}

/// Count the zeros and ones in a sequence of bits.
pub fn tally_bits<I>(bits: I) -> Tally
where I: IntoIterator<Item = u8>
{
    bits.into_iter()
        .fold(Tally::default(), |mut acc, b| {
            if b == 0 { acc.zeros += 1; } else { acc.ones += 1; }
            acc
        })
}
