//! Error types for the stabilizer simulator.
//!
//! Two kinds of failure exist. Usage errors (bad qubit indices, malformed
//! tableaux passed to [`Simulator::restore`][crate::sim::Simulator::restore])
//! are detected before any state is touched. A [`SimError::PhaseResidue`] is
//! different: it means a row-sum produced an imaginary phase, i.e. the tableau
//! no longer encodes a valid stabilizer state, and every later result from the
//! same simulator would be meaningless.

use thiserror::Error;

/// Result type alias for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur while driving a [`Simulator`][crate::sim::Simulator].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A simulator must hold at least one qubit.
    #[error("qubit count must be at least 1")]
    ZeroQubits,

    /// Qubit index outside `[0, n)`.
    #[error("qubit index {qubit} out of range for {n} qubits")]
    QubitOutOfRange {
        /// Offending index.
        qubit: usize,
        /// Number of qubits in the register.
        n: usize,
    },

    /// Control and target of a two-qubit gate coincide.
    #[error("two-qubit gate applied with control = target = {qubit}")]
    SameQubit {
        /// The repeated index.
        qubit: usize,
    },

    /// A restored tableau does not have shape `(2n, 2n + 1)`.
    #[error("tableau shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Required `(rows, cols)`.
        expected: (usize, usize),
        /// Shape that was supplied.
        actual: (usize, usize),
    },

    /// A restored tableau holds something other than 0 or 1.
    #[error("tableau entry ({row}, {col}) = {value} is not binary")]
    NonBinaryEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
        /// The entry itself.
        value: u8,
    },

    /// Row-sum residue was not 0 or 2 (mod 4).
    #[error(
        "corrupted tableau: row-sum of row {source_row} into {target} left residue {residue}"
    )]
    PhaseResidue {
        /// Row being overwritten.
        target: RowRef,
        /// Row being multiplied in.
        source_row: usize,
        /// The offending residue mod 4 (1 or 3).
        residue: i64,
    },
}

impl SimError {
    /// Create an out-of-range error.
    pub fn out_of_range(qubit: usize, n: usize) -> Self {
        Self::QubitOutOfRange { qubit, n }
    }

    /// Return `true` if the error indicates a broken tableau rather than
    /// caller misuse.
    pub fn is_fatal(&self) -> bool { matches!(self, Self::PhaseResidue { .. }) }
}

/// Target of a row-sum, as reported in [`SimError::PhaseResidue`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowRef {
    /// A row of the tableau.
    Row(usize),
    /// The scratch row used by deterministic measurements.
    Scratch,
}

impl std::fmt::Display for RowRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Row(k) => write!(f, "{}", k),
            Self::Scratch => write!(f, "scratch"),
        }
    }
}
