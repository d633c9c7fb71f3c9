//! The CHP stabilizer simulator: a [`Tableau`] driven by Clifford gates and
//! single-qubit Z-basis measurements.
//!
//! Each gate updates all 2*n* rows of the tableau in *O*(*n*) time and each
//! measurement costs at most *O*(*n*<sup>2</sup>). Randomness is only needed
//! when a measurement outcome is not fixed by the current stabilizers; it is
//! drawn from a generator owned by the simulator, so instances built with the
//! same seed replay identically and instances never share state.
//!
//! # Example
//! ```
//! use chp_sim::sim::Simulator;
//!
//! # fn main() -> chp_sim::error::Result<()> {
//! let mut sim = Simulator::new(2, 10546)?;
//!
//! // generate a Bell state on qubits 0, 1
//! sim.h(0)?.cx(0, 1)?;
//!
//! // print out the destabilizers and stabilizers
//! println!("{:#}", sim.tableau()); // `#` formatter suppresses identities
//! // +Z. | +XX
//! // +.X | +ZZ
//!
//! let m0 = sim.measurement(0)?;
//! let m1 = sim.measurement(1)?;
//! assert_eq!(m0, m1);
//! # Ok(())
//! # }
//! ```

use itertools::Itertools;
use ndarray as nd;
use rand::{ rngs::StdRng, Rng, SeedableRng };
use tracing::{ debug, trace };
use crate::{
    error::{ Result, SimError },
    gate::{ check_qubit, Gate },
    tableau::Tableau,
};

/// The result of a measurement, generated by [`Simulator::measure`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// A deterministic outcome resulting in ∣0⟩
    Det0,
    /// A deterministic outcome resulting in ∣1⟩
    Det1,
    /// A random outcome resulting in ∣0⟩
    Rand0,
    /// A random outcome resulting in ∣1⟩
    Rand1,
}

impl Outcome {
    fn det(bit: u8) -> Self { if bit == 1 { Self::Det1 } else { Self::Det0 } }

    fn rand(bit: u8) -> Self { if bit == 1 { Self::Rand1 } else { Self::Rand0 } }

    /// Return the classical bit.
    pub fn bit(self) -> u8 {
        match self {
            Self::Det0 | Self::Rand0 => 0,
            Self::Det1 | Self::Rand1 => 1,
        }
    }

    /// Return `true` if the outcome required a coin flip.
    pub fn is_random(self) -> bool { matches!(self, Self::Rand0 | Self::Rand1) }

    /// Return `true` if the outcome was fixed by the state before measurement.
    pub fn is_deterministic(self) -> bool { !self.is_random() }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> Self { outcome.bit() }
}

/// An *n*-qubit stabilizer-state simulator with its own seeded random number
/// generator.
#[derive(Clone, Debug)]
pub struct Simulator {
    tableau: Tableau,
    rng: StdRng,
}

impl Simulator {
    /// Create a new simulator of `n` qubits initialized to ∣0...0⟩, seeding its
    /// random number generator with `seed`.
    pub fn new(n: usize, seed: u64) -> Result<Self> {
        if n == 0 { return Err(SimError::ZeroQubits); }
        Ok(Self { tableau: Tableau::new(n), rng: StdRng::seed_from_u64(seed) })
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.tableau.num_qubits() }

    /// Borrow the current tableau.
    pub fn tableau(&self) -> &Tableau { &self.tableau }

    /// Copy out the raw `2n × (2n + 1)` tableau matrix.
    pub fn snapshot(&self) -> nd::Array2<u8> { self.tableau.to_array() }

    /// Replace the tableau wholesale.
    ///
    /// The matrix is checked for shape and binary entries before anything is
    /// replaced; it is otherwise trusted to encode a valid state. The random
    /// number generator is not touched.
    pub fn restore(&mut self, tab: nd::Array2<u8>) -> Result<()> {
        self.tableau = Tableau::from_array(self.num_qubits(), tab)?;
        debug!("tableau restored");
        Ok(())
    }

    /// Return the state to ∣0...0⟩.
    pub fn reset(&mut self) {
        self.tableau.reset();
        debug!("tableau reset");
    }

    /// Apply a CNOT with control `a` and target `b`.
    pub fn cx(&mut self, a: usize, b: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::CX(a, b))
    }

    /// Apply a Hadamard gate to qubit `k`.
    pub fn h(&mut self, k: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::H(k))
    }

    /// Apply an S gate (= Z(π/2)) to qubit `k`.
    pub fn s(&mut self, k: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::S(k))
    }

    /// Apply a Pauli X gate to qubit `k`.
    pub fn x(&mut self, k: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::X(k))
    }

    /// Apply a Pauli Z gate to qubit `k`.
    pub fn z(&mut self, k: usize) -> Result<&mut Self> {
        self.apply_gate(Gate::Z(k))
    }

    // `gate` must already have been checked against the register size
    fn apply_unchecked(&mut self, gate: Gate) {
        trace!(%gate, "apply gate");
        match gate {
            Gate::CX(a, b) => self.tableau.apply_cx(a, b),
            Gate::H(k) => self.tableau.apply_h(k),
            Gate::S(k) => self.tableau.apply_s(k),
            Gate::X(k) => self.tableau.apply_x(k),
            Gate::Z(k) => self.tableau.apply_z(k),
        }
    }

    /// Perform the action of a gate.
    ///
    /// Fails without changing the state if any qubit index is out of bounds or
    /// the two indices of a `CX` are equal.
    pub fn apply_gate(&mut self, gate: Gate) -> Result<&mut Self> {
        gate.check(self.num_qubits())?;
        self.apply_unchecked(gate);
        Ok(self)
    }

    /// Perform a series of gates.
    ///
    /// Every gate is checked before the first one is applied, so an invalid
    /// gate anywhere in the series leaves the state unchanged.
    pub fn apply_circuit<'a, I>(&mut self, gates: I) -> Result<&mut Self>
    where I: IntoIterator<Item = &'a Gate>
    {
        let n = self.num_qubits();
        let gates: Vec<Gate> = gates.into_iter().copied().collect();
        gates.iter().try_for_each(|g| g.check(n))?;
        gates.into_iter().for_each(|g| self.apply_unchecked(g));
        Ok(self)
    }

    // outcome of measuring `k` when no stabilizer has an X or Y on it: Z_k is
    // (up to sign) the product of the stabilizers paired with the
    // destabilizers that do, and the sign of that product is the outcome
    fn deterministic_bit(&self, k: usize) -> Result<u8> {
        let n = self.num_qubits();
        let mut scratch = self.tableau.scratch_row();
        for i in (0..n).filter(|&i| self.tableau.x(i, k) == 1) {
            self.tableau.row_sum_into(&mut scratch, i + n)?;
        }
        Ok(scratch[self.tableau.r_col()])
    }

    /// Perform a projective measurement on qubit `k` in the Z-basis, returning
    /// the outcome of the measurement.
    ///
    /// The outcome is random exactly when some stabilizer has an X or Y factor
    /// on `k`. In that case one coin is drawn from the internal generator and
    /// the state collapses onto ±Z<sub>*k*</sub>; otherwise the outcome is read
    /// off the tableau, which is left unchanged, and no randomness is used.
    ///
    /// A [`SimError::PhaseResidue`] means the tableau was already invalid; the
    /// state may then be partially updated and should be reset or restored.
    pub fn measure(&mut self, k: usize) -> Result<Outcome> {
        let n = self.num_qubits();
        check_qubit(k, n)?;
        let maybe_p: Option<usize> = self.tableau.stab_rows_with_x(k).next();
        let outcome
            = match maybe_p {
                Some(p) => {
                    // every other generator with an X/Y on k absorbs row p so
                    // that only p anticommutes with Z_k; destabilizer p - n is
                    // overwritten below instead
                    let rows: Vec<usize>
                        = self.tableau.rows_with_x(k)
                        .filter(|&i| i != p && i != p - n)
                        .collect_vec();
                    for i in rows { self.tableau.row_sum(i, p)?; }
                    self.tableau.row_copy(p, p - n);
                    self.tableau.row_set_z(p, k);
                    let bit = u8::from(self.rng.gen::<bool>());
                    self.tableau.set_r(p, bit);
                    Outcome::rand(bit)
                },
                None => Outcome::det(self.deterministic_bit(k)?),
            };
        debug!(qubit = k, ?outcome, "measure");
        Ok(outcome)
    }

    /// Like [`Self::measure`], but returning only the classical bit.
    pub fn measurement(&mut self, k: usize) -> Result<u8> {
        self.measure(k).map(Outcome::bit)
    }

    /// Return the outcome of measuring qubit `k` if it is already determined,
    /// or `None` if it would be random, without changing the state or drawing
    /// randomness.
    pub fn peek(&self, k: usize) -> Result<Option<u8>> {
        check_qubit(k, self.num_qubits())?;
        if self.tableau.stab_rows_with_x(k).next().is_some() {
            Ok(None)
        } else {
            self.deterministic_bit(k).map(Some)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fresh_state_measures_zero() {
        let mut sim = Simulator::new(4, 0).unwrap();
        for k in 0..4 {
            assert_eq!(sim.measure(k), Ok(Outcome::Det0));
        }
        assert_eq!(sim.tableau(), &Tableau::new(4));
    }

    #[test]
    fn zero_qubits_rejected() {
        assert!(matches!(Simulator::new(0, 0), Err(SimError::ZeroQubits)));
    }

    #[test]
    fn x_flips_one_qubit() {
        let mut sim = Simulator::new(3, 0).unwrap();
        sim.x(1).unwrap();
        assert_eq!(sim.measure(0), Ok(Outcome::Det0));
        assert_eq!(sim.measure(1), Ok(Outcome::Det1));
        assert_eq!(sim.measure(2), Ok(Outcome::Det0));
    }

    #[test]
    fn z_on_zero_state_flips_destabilizer_only() {
        // Z X Z = -X, Z Z Z = Z
        let mut sim = Simulator::new(1, 0).unwrap();
        sim.z(0).unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot[[0, 2]], 1);
        assert_eq!(snapshot[[1, 2]], 0);
        assert_eq!(sim.measurement(0), Ok(0));
        sim.z(0).unwrap();
        assert_eq!(sim.tableau(), &Tableau::new(1));
    }

    #[test]
    fn hadamard_makes_random_outcome() {
        let mut sim = Simulator::new(1, 5).unwrap();
        sim.h(0).unwrap();
        assert_eq!(sim.peek(0), Ok(None));
        let first = sim.measure(0).unwrap();
        assert!(first.is_random());
        let second = sim.measure(0).unwrap();
        assert!(second.is_deterministic());
        assert_eq!(first.bit(), second.bit());
        assert_eq!(sim.peek(0), Ok(Some(first.bit())));
        assert!(sim.tableau().is_valid());
    }

    #[test]
    fn bell_pair_correlated() {
        for seed in 0..200 {
            let mut sim = Simulator::new(3, seed).unwrap();
            sim.h(0).unwrap().cx(0, 1).unwrap();
            let m0 = sim.measurement(0).unwrap();
            let m1 = sim.measurement(1).unwrap();
            assert_eq!(m0, m1);
            assert_eq!(sim.measurement(2), Ok(0));
        }
    }

    #[test]
    fn bell_pair_correlated_second_qubit_first() {
        // exercises the destabilizer update in the random branch: the second
        // measurement is only right if destabilizer 1 absorbed the old XX
        for seed in 0..200 {
            let mut sim = Simulator::new(2, seed).unwrap();
            sim.h(0).unwrap().cx(0, 1).unwrap();
            let m1 = sim.measure(1).unwrap();
            assert!(m1.is_random());
            assert!(sim.tableau().is_valid());
            let m0 = sim.measure(0).unwrap();
            assert!(m0.is_deterministic());
            assert_eq!(m0.bit(), m1.bit());
        }
    }

    #[test]
    fn ghz_state() {
        for seed in 0..100 {
            let mut sim = Simulator::new(5, seed).unwrap();
            sim.h(0).unwrap();
            for k in 1..5 { sim.cx(k - 1, k).unwrap(); }
            let bits: Vec<u8>
                = [3, 0, 4, 1, 2].into_iter()
                .map(|k| sim.measurement(k).unwrap())
                .collect();
            assert!(bits.iter().all(|&b| b == bits[0]));
        }
    }

    #[test]
    fn phase_kickback() {
        // H S S H = H Z H = X
        let mut sim = Simulator::new(1, 0).unwrap();
        sim.h(0).unwrap().s(0).unwrap().s(0).unwrap().h(0).unwrap();
        assert_eq!(sim.measure(0), Ok(Outcome::Det1));
    }

    #[test]
    fn involutions() {
        let mut sim = Simulator::new(3, 1).unwrap();
        sim.h(0).unwrap().cx(0, 2).unwrap().s(1).unwrap().h(1).unwrap();
        let before = sim.snapshot();

        sim.cx(2, 1).unwrap().cx(2, 1).unwrap();
        assert_eq!(sim.snapshot(), before);
        sim.h(2).unwrap().h(2).unwrap();
        assert_eq!(sim.snapshot(), before);
        sim.x(0).unwrap().x(0).unwrap();
        assert_eq!(sim.snapshot(), before);
        sim.z(1).unwrap().z(1).unwrap();
        assert_eq!(sim.snapshot(), before);
        for _ in 0..4 { sim.s(0).unwrap(); }
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn cx_sign_update() {
        // stabilizer -Z0 stays put; X0 spreads to X0 X1, Z1 to Z0 Z1
        let mut sim = Simulator::new(2, 0).unwrap();
        let mut tab = sim.snapshot();
        tab[[2, 4]] = 1;
        sim.restore(tab).unwrap();
        sim.cx(0, 1).unwrap();
        let expected: nd::Array2<u8> = nd::array![
            [1, 1, 0, 0, 0],
            [0, 1, 0, 0, 0],
            [0, 0, 1, 0, 1],
            [0, 0, 1, 1, 0],
        ];
        assert_eq!(sim.snapshot(), expected);
        assert_eq!(sim.measure(0), Ok(Outcome::Det1));
        assert_eq!(sim.measure(1), Ok(Outcome::Det1));
    }

    #[test]
    fn invalid_indices_leave_state_unchanged() {
        let mut sim = Simulator::new(2, 0).unwrap();
        sim.h(0).unwrap();
        let before = sim.snapshot();
        assert_eq!(sim.h(2).err(), Some(SimError::out_of_range(2, 2)));
        assert_eq!(sim.s(7).err(), Some(SimError::out_of_range(7, 2)));
        assert_eq!(sim.cx(0, 2).err(), Some(SimError::out_of_range(2, 2)));
        assert_eq!(sim.cx(1, 1).err(), Some(SimError::SameQubit { qubit: 1 }));
        assert_eq!(sim.measure(2), Err(SimError::out_of_range(2, 2)));
        assert_eq!(sim.peek(2), Err(SimError::out_of_range(2, 2)));
        let bad = [Gate::X(1), Gate::CX(0, 3)];
        assert!(sim.apply_circuit(&bad).is_err());
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn restore_rejects_wrong_shape() {
        let mut sim = Simulator::new(2, 0).unwrap();
        sim.x(0).unwrap();
        let before = sim.snapshot();
        let wrong = Tableau::new(3).to_array();
        assert_eq!(
            sim.restore(wrong),
            Err(SimError::ShapeMismatch { expected: (4, 5), actual: (6, 7) }),
        );
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut sim = Simulator::new(3, 7).unwrap();
        sim.h(0).unwrap().cx(0, 1).unwrap().s(2).unwrap();
        let saved = sim.snapshot();
        sim.measure(0).unwrap();
        sim.reset();
        assert_eq!(sim.tableau(), &Tableau::new(3));
        sim.restore(saved.clone()).unwrap();
        assert_eq!(sim.snapshot(), saved);
    }

    #[test]
    fn seeds_are_reproducible() {
        let run = |seed: u64| -> Vec<u8> {
            let mut sim = Simulator::new(8, seed).unwrap();
            (0..8).for_each(|k| { sim.h(k).unwrap(); });
            (0..8).map(|k| sim.measurement(k).unwrap()).collect()
        };
        assert_eq!(run(42), run(42));
        assert!((0..20).any(|seed| run(seed) != run(42)));
    }

    #[test]
    fn fatal_residue_surfaces() {
        // stabilizers X0 and Y0 anticommute, so folding one into the other
        // leaves an imaginary phase
        let mut sim = Simulator::new(2, 0).unwrap();
        let corrupted: nd::Array2<u8> = nd::array![
            [1, 0, 0, 0, 0],
            [0, 1, 0, 0, 0],
            [1, 0, 0, 0, 0],
            [1, 0, 1, 0, 0],
        ];
        sim.restore(corrupted).unwrap();
        assert!(!sim.tableau().is_valid());
        let err = sim.measure(0).unwrap_err();
        assert!(err.is_fatal());
    }
}
