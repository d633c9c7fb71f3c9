//! Descriptions of the Clifford gates the simulator applies.
//!
//! The gate set is generated by CNOT, Hadamard and the π/2 phase gate, with
//! the Pauli X and Z gates included as cheap sign flips. Each gate maps Pauli
//! strings to Pauli strings under conjugation, which is what lets the tableau
//! track it with bit operations alone.
//!
//! See also: <https://en.wikipedia.org/wiki/Clifford_gates>

use std::fmt;
use rand::Rng;
use crate::error::{ Result, SimError };

/// Description of a single gate for a register of `n` qubits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Z-controlled π rotation about X.
    ///
    /// The first qubit index is the control.
    CX(usize, usize),
    /// Hadamard
    H(usize),
    /// π/2 rotation about Z
    S(usize),
    /// π rotation about X
    X(usize),
    /// π rotation about Z
    Z(usize),
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CX(a, b) => write!(f, "cx({}, {})", a, b),
            Self::H(k) => write!(f, "h({})", k),
            Self::S(k) => write!(f, "s({})", k),
            Self::X(k) => write!(f, "x({})", k),
            Self::Z(k) => write!(f, "z({})", k),
        }
    }
}

impl Gate {
    /// Return `true` if `self` acts on two qubits.
    pub fn is_two_qubit(&self) -> bool { matches!(self, Self::CX(..)) }

    /// Return the qubit indices `self` acts on, control first.
    pub fn qubits(&self) -> (usize, Option<usize>) {
        match *self {
            Self::CX(a, b) => (a, Some(b)),
            Self::H(k) | Self::S(k) | Self::X(k) | Self::Z(k) => (k, None),
        }
    }

    /// Check that `self` is applicable to a register of `n` qubits: all indices
    /// are less than `n` and the two indices of a `CX` differ.
    pub fn check(&self, n: usize) -> Result<()> {
        let (a, maybe_b) = self.qubits();
        check_qubit(a, n)?;
        if let Some(b) = maybe_b {
            check_qubit(b, n)?;
            if a == b { return Err(SimError::SameQubit { qubit: a }); }
        }
        Ok(())
    }

    /// Return the inverse gate.
    ///
    /// All gates here are self-inverse except `S`, whose inverse is `S·S·S`
    /// and so has no single-gate form; `None` is returned for it.
    pub fn inverse(&self) -> Option<Self> {
        match *self {
            Self::S(..) => None,
            g => Some(g),
        }
    }

    /// Sample a random single-qubit gate (`H`, `S`, `X`, or `Z`) for a given
    /// qubit index.
    pub fn sample_single<R>(idx: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        match rng.gen_range(0..4_usize) {
            0 => Self::H(idx),
            1 => Self::S(idx),
            2 => Self::X(idx),
            3 => Self::Z(idx),
            _ => unreachable!(),
        }
    }
}

pub(crate) fn check_qubit(q: usize, n: usize) -> Result<()> {
    if q < n { Ok(()) } else { Err(SimError::out_of_range(q, n)) }
}
