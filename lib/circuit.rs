//! Queued gate/measurement sequences and their outcome records.
//!
//! A [`Circuit`] is built up front and run against a [`Simulator`] in one go.
//! Measurements carry a caller-chosen key (e.g. a lattice coordinate), and the
//! outcomes come back as a [`Record`] keyed the same way.

use std::hash::Hash;
use indexmap::IndexMap;
use rand::Rng;
use tracing::debug;
use crate::{
    error::Result,
    gate::{ check_qubit, Gate },
    sim::{ Outcome, Simulator },
};

/// A single step of a [`Circuit`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation<K> {
    /// Apply a gate.
    Gate(Gate),
    /// Measure `qubit` in the Z-basis and record the outcome under `key`.
    Measure { qubit: usize, key: K },
}

/// An ordered list of gates and keyed measurements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circuit<K> {
    ops: Vec<Operation<K>>,
}

impl<K> Default for Circuit<K> {
    fn default() -> Self { Self::new() }
}

impl<K> IntoIterator for Circuit<K> {
    type Item = Operation<K>;
    type IntoIter = <Vec<Operation<K>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.ops.into_iter() }
}

impl<'a, K> IntoIterator for &'a Circuit<K> {
    type Item = &'a Operation<K>;
    type IntoIter = <&'a Vec<Operation<K>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.ops.iter() }
}

impl<K> Circuit<K> {
    /// Create a new, empty circuit.
    pub fn new() -> Self { Self { ops: Vec::new() } }

    pub fn len(&self) -> usize { self.ops.len() }

    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Append a gate.
    pub fn push(&mut self, gate: Gate) -> &mut Self {
        self.ops.push(Operation::Gate(gate));
        self
    }

    /// Append a CNOT with control `a` and target `b`.
    pub fn add_cx(&mut self, a: usize, b: usize) -> &mut Self { self.push(Gate::CX(a, b)) }

    /// Append a Hadamard on `k`.
    pub fn add_h(&mut self, k: usize) -> &mut Self { self.push(Gate::H(k)) }

    /// Append an S gate on `k`.
    pub fn add_s(&mut self, k: usize) -> &mut Self { self.push(Gate::S(k)) }

    /// Append a Pauli X on `k`.
    pub fn add_x(&mut self, k: usize) -> &mut Self { self.push(Gate::X(k)) }

    /// Append a Pauli Z on `k`.
    pub fn add_z(&mut self, k: usize) -> &mut Self { self.push(Gate::Z(k)) }

    /// Append a Z-basis measurement of `qubit`, recorded under `key`.
    pub fn add_measurement(&mut self, qubit: usize, key: K) -> &mut Self {
        self.ops.push(Operation::Measure { qubit, key });
        self
    }

    /// Check every operation against a register of `n` qubits.
    pub fn check(&self, n: usize) -> Result<()> {
        self.ops.iter()
            .try_for_each(|op| {
                match op {
                    Operation::Gate(gate) => gate.check(n),
                    Operation::Measure { qubit, .. } => check_qubit(*qubit, n),
                }
            })
    }
}

impl<K> Circuit<K>
where K: Clone + Hash + Eq
{
    /// Run all operations in order on `sim`.
    ///
    /// The whole circuit is checked first; if any operation is invalid for
    /// `sim`, nothing is applied.
    pub fn run(&self, sim: &mut Simulator) -> Result<Record<K>> {
        self.check(sim.num_qubits())?;
        let mut record = Record::new();
        for op in self.ops.iter() {
            match op {
                Operation::Gate(gate) => { sim.apply_gate(*gate)?; },
                Operation::Measure { qubit, key } => {
                    let outcome = sim.measure(*qubit)?;
                    record.insert(key.clone(), outcome);
                },
            }
        }
        debug!(ops = self.len(), measurements = record.len(), "circuit run");
        Ok(record)
    }
}

impl Circuit<(usize, usize)> {
    /// Generate `depth` layers of a brickwork circuit on `n` qubits.
    ///
    /// Each layer consists of:
    /// 1. A random single-qubit gate (*H*, *S*, *X*, *Z*) on each qubit
    /// 1. A CNOT on adjacent pairs of qubits, alternating between left and
    /// right neighbors on each layer
    /// 1. A Z-basis measurement of each qubit with probability `p_meas`, keyed
    /// by `(layer, qubit)`
    pub fn brickwork<R>(n: usize, depth: usize, p_meas: f64, rng: &mut R)
        -> Self
    where R: Rng + ?Sized
    {
        let mut circuit = Self::new();
        for d in 0..depth {
            (0..n).for_each(|k| { circuit.push(Gate::sample_single(k, rng)); });
            CNots::new(d % 2 == 1, n)
                .for_each(|cx| { circuit.push(cx); });
            for k in 0..n {
                if rng.gen::<f64>() < p_meas {
                    circuit.add_measurement(k, (d, k));
                }
            }
        }
        circuit
    }
}

struct CNots {
    iter: std::ops::Range<usize>
}

impl CNots {
    fn new(offs: bool, stop: usize) -> Self {
        Self { iter: if offs { 1 } else { 0 } .. stop }
    }
}

impl Iterator for CNots {
    type Item = Gate;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
            .zip(self.iter.next())
            .map(|(a, b)| Gate::CX(a, b))
    }
}

/// Measurement outcomes keyed by caller identifier.
///
/// Iteration follows the order in which keys were first measured. Measuring
/// the same key again replaces its outcome in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record<K: Hash + Eq> {
    outcomes: IndexMap<K, Outcome>,
}

impl<K: Hash + Eq> Default for Record<K> {
    fn default() -> Self { Self::new() }
}

impl<K: Hash + Eq> Record<K> {
    /// Create a new, empty record.
    pub fn new() -> Self { Self { outcomes: IndexMap::new() } }

    pub fn len(&self) -> usize { self.outcomes.len() }

    pub fn is_empty(&self) -> bool { self.outcomes.is_empty() }

    /// Store an outcome, returning the one it replaced, if any.
    pub fn insert(&mut self, key: K, outcome: Outcome) -> Option<Outcome> {
        self.outcomes.insert(key, outcome)
    }

    /// Get the full outcome recorded under `key`.
    pub fn get(&self, key: &K) -> Option<Outcome> {
        self.outcomes.get(key).copied()
    }

    /// Get the classical bit recorded under `key`.
    pub fn bit(&self, key: &K) -> Option<u8> { self.get(key).map(Outcome::bit) }

    /// Iterate over `(key, outcome)` pairs in measurement order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, Outcome)> + '_ {
        self.outcomes.iter().map(|(k, o)| (k, *o))
    }

    /// Iterate over the classical bits in measurement order.
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        self.outcomes.values().map(|o| o.bit())
    }
}
