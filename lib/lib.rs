//! Polynomial-time simulation of Clifford circuits with Z-basis measurements on
//! registers of qubits, using the stabilizer tableau (CHP) method.
//!
//! Assumes all operations will be limited to Clifford-group transformations
//! (i.e. Hadamard, Pauli X/Z, CNOT, or phase rotations that are integer
//! multiples of π/2). Callers with their own qubit identifiers (e.g. lattice
//! coordinates) map them onto the linear indices `0..n` used here.
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod error;
pub mod tableau;
pub mod gate;
pub mod sim;
pub mod circuit;
pub mod trials;

pub use error::{ Result, SimError };
pub use gate::Gate;
pub use sim::{ Outcome, Simulator };
pub use tableau::Tableau;
