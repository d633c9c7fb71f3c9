//! The binary stabilizer/destabilizer tableau of an *n*-qubit register.
//!
//! States are not stored as 2<sup>*n*</sup> complex amplitudes but as the set
//! of *n* commuting Pauli strings that stabilize them, each encoded by two bits
//! per qubit and one sign bit. Following Aaronson and Gottesman
//! ([arXiv:quant-ph/0406196][tableau]), *n* extra "destabilizer" rows are kept
//! alongside, so that together the 2*n* rows generate the full *n*-qubit Pauli
//! group and measurements stay *O*(*n*<sup>2</sup>).
//!
//! The tableau is a `2n × (2n + 1)` matrix of `u8`s equal to 0 or 1:
//!
//! | rows        | meaning       |
//! | :---------- | :------------ |
//! | `0..n`      | destabilizers |
//! | `n..2n`     | stabilizers   |
//!
//! | columns     | meaning                         |
//! | :---------- | :------------------------------ |
//! | `0..n`      | X-block: X factor on qubit `j`  |
//! | `n..2n`     | Z-block: Z factor on qubit `j`  |
//! | `2n`        | sign: 0 for +1, 1 for −1        |
//!
//! A set bit in both blocks for the same qubit is a Y factor. Outside of this
//! module, the layout is only reached through the named column accessors.
//!
//! [tableau]: https://arxiv.org/abs/quant-ph/0406196

use std::fmt;
use ndarray::{ self as nd, s };
use tracing::error;
use crate::error::{ Result, RowRef, SimError };

/// The stabilizer/destabilizer tableau for a fixed number of qubits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tableau {
    n: usize,
    tab: nd::Array2<u8>, // size 2n × (2n + 1)
}

fn identity(n: usize) -> nd::Array2<u8> {
    let mut tab: nd::Array2<u8> = nd::Array2::zeros((2 * n, 2 * n + 1));
    tab.slice_mut(s![.., ..2 * n]).diag_mut().fill(1);
    tab
}

// phase exponent (as a power of i) picked up on qubit j when the Pauli
// (x1, z1) is multiplied onto (x2, z2)
fn g(x1: u8, z1: u8, x2: u8, z2: u8) -> i64 {
    let (x2, z2) = (i64::from(x2), i64::from(z2));
    match (x1, z1) {
        (0, 0) => 0,
        (1, 1) => z2 - x2,
        (1, 0) => z2 * (2 * x2 - 1),
        (0, 1) => x2 * (1 - 2 * z2),
        _ => unreachable!("tableau entries are binary"),
    }
}

// residue (mod 4) of the phase exponent of `source * target`
fn product_residue(
    n: usize,
    target: nd::ArrayView1<u8>,
    source: nd::ArrayView1<u8>,
) -> i64
{
    let e: i64
        = (0..n)
        .map(|j| g(source[j], source[n + j], target[j], target[n + j]))
        .sum();
    (e + 2 * i64::from(target[2 * n]) + 2 * i64::from(source[2 * n]))
        .rem_euclid(4)
}

fn phase_bit(residue: i64, target: RowRef, source_row: usize) -> Result<u8> {
    match residue {
        0 => Ok(0),
        2 => Ok(1),
        _ => {
            error!(%target, source_row, residue, "row-sum left an imaginary phase");
            Err(SimError::PhaseResidue { target, source_row, residue })
        },
    }
}

impl Tableau {
    /// Create a new tableau for `n` qubits encoding ∣0...0⟩: destabilizer `i`
    /// is X on qubit `i`, stabilizer `i` is Z on qubit `i`, all signs +1.
    ///
    /// `n = 0` is not checked here and gives an empty `0 × 1` tableau; callers
    /// wanting a usable register go through
    /// [`Simulator::new`][crate::sim::Simulator::new], which rejects it.
    pub fn new(n: usize) -> Self { Self { n, tab: identity(n) } }

    /// Build a tableau from a raw `2n × (2n + 1)` matrix.
    ///
    /// The matrix must have the right shape and contain only 0s and 1s; beyond
    /// that it is taken as given (see [`Self::is_valid`]).
    pub fn from_array(n: usize, tab: nd::Array2<u8>) -> Result<Self> {
        let expected = (2 * n, 2 * n + 1);
        if tab.dim() != expected {
            return Err(SimError::ShapeMismatch { expected, actual: tab.dim() });
        }
        if let Some(((row, col), &value))
            = tab.indexed_iter().find(|(_, &b)| b > 1)
        {
            return Err(SimError::NonBinaryEntry { row, col, value });
        }
        Ok(Self { n, tab })
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Return the tableau to the ∣0...0⟩ encoding.
    pub fn reset(&mut self) {
        self.tab.fill(0);
        self.tab.slice_mut(s![.., ..2 * self.n]).diag_mut().fill(1);
    }

    /// Borrow the raw matrix.
    pub fn as_array(&self) -> nd::ArrayView2<u8> { self.tab.view() }

    /// Copy out the raw matrix.
    pub fn to_array(&self) -> nd::Array2<u8> { self.tab.clone() }

    pub(crate) fn x_col(&self, q: usize) -> usize { q }

    pub(crate) fn z_col(&self, q: usize) -> usize { self.n + q }

    pub(crate) fn r_col(&self) -> usize { 2 * self.n }

    /// X bit of qubit `q` in row `row`.
    pub fn x(&self, row: usize, q: usize) -> u8 { self.tab[[row, self.x_col(q)]] }

    /// Z bit of qubit `q` in row `row`.
    pub fn z(&self, row: usize, q: usize) -> u8 { self.tab[[row, self.z_col(q)]] }

    /// Sign bit of row `row`.
    pub fn r(&self, row: usize) -> u8 { self.tab[[row, self.r_col()]] }

    /// Iterate over the indices of the stabilizer rows with an X or Y on `q`.
    pub(crate) fn stab_rows_with_x(&self, q: usize)
        -> impl Iterator<Item = usize> + '_
    {
        (self.n..2 * self.n).filter(move |&i| self.x(i, q) == 1)
    }

    /// Iterate over the indices of all rows with an X or Y on `q`.
    pub(crate) fn rows_with_x(&self, q: usize)
        -> impl Iterator<Item = usize> + '_
    {
        (0..2 * self.n).filter(move |&i| self.x(i, q) == 1)
    }

    pub(crate) fn apply_cx(&mut self, c: usize, t: usize) {
        let (xc, xt, zc, zt, r)
            = (self.x_col(c), self.x_col(t), self.z_col(c), self.z_col(t), self.r_col());
        let (x_c, mut x_t, mut z_c, z_t, mut r)
            = self.tab.multi_slice_mut((
                s![.., xc], s![.., xt], s![.., zc], s![.., zt], s![.., r],
            ));
        nd::Zip::from(&mut r)
            .and(&x_c)
            .and(&mut x_t)
            .and(&mut z_c)
            .and(&z_t)
            .for_each(|r_i, &x_ic, x_it, z_ic, &z_it| {
                *r_i ^= x_ic & z_it & (*x_it ^ *z_ic ^ 1);
                *x_it ^= x_ic;
                *z_ic ^= z_it;
            });
    }

    pub(crate) fn apply_h(&mut self, q: usize) {
        let (xq, zq, r) = (self.x_col(q), self.z_col(q), self.r_col());
        let (mut x_q, mut z_q, mut r)
            = self.tab.multi_slice_mut((s![.., xq], s![.., zq], s![.., r]));
        nd::Zip::from(&mut r)
            .and(&mut x_q)
            .and(&mut z_q)
            .for_each(|r_i, x_iq, z_iq| {
                *r_i ^= *x_iq & *z_iq;
                std::mem::swap(x_iq, z_iq);
            });
    }

    pub(crate) fn apply_s(&mut self, q: usize) {
        let (xq, zq, r) = (self.x_col(q), self.z_col(q), self.r_col());
        let (x_q, mut z_q, mut r)
            = self.tab.multi_slice_mut((s![.., xq], s![.., zq], s![.., r]));
        nd::Zip::from(&mut r)
            .and(&x_q)
            .and(&mut z_q)
            .for_each(|r_i, &x_iq, z_iq| {
                *r_i ^= x_iq & *z_iq;
                *z_iq ^= x_iq;
            });
    }

    pub(crate) fn apply_x(&mut self, q: usize) {
        let (zq, r) = (self.z_col(q), self.r_col());
        let (z_q, mut r) = self.tab.multi_slice_mut((s![.., zq], s![.., r]));
        r ^= &z_q;
    }

    pub(crate) fn apply_z(&mut self, q: usize) {
        let (xq, r) = (self.x_col(q), self.r_col());
        let (x_q, mut r) = self.tab.multi_slice_mut((s![.., xq], s![.., r]));
        r ^= &x_q;
    }

    /// Left-multiply row `target` by row `source`, in place.
    ///
    /// Fails if the two rows anticommute, which can only happen on a corrupted
    /// tableau (or when called on a destabilizer and its own stabilizer).
    pub(crate) fn row_sum(&mut self, target: usize, source: usize) -> Result<()> {
        debug_assert_ne!(target, source);
        let r = self.r_col();
        let residue
            = product_residue(self.n, self.tab.row(target), self.tab.row(source));
        let bit = phase_bit(residue, RowRef::Row(target), source)?;
        let (mut t, src)
            = self.tab.multi_slice_mut((s![target, ..r], s![source, ..r]));
        t ^= &src;
        self.tab[[target, r]] = bit;
        Ok(())
    }

    /// Like [`Self::row_sum`], but accumulating into a scratch row that is not
    /// part of the tableau.
    pub(crate) fn row_sum_into(&self, scratch: &mut nd::Array1<u8>, source: usize)
        -> Result<()>
    {
        let r = self.r_col();
        let residue
            = product_residue(self.n, scratch.view(), self.tab.row(source));
        let bit = phase_bit(residue, RowRef::Scratch, source)?;
        let mut t = scratch.slice_mut(s![..r]);
        t ^= &self.tab.slice(s![source, ..r]);
        scratch[r] = bit;
        Ok(())
    }

    /// A row of zeros (the identity with sign +1) shaped like a tableau row.
    pub(crate) fn scratch_row(&self) -> nd::Array1<u8> {
        nd::Array1::zeros(2 * self.n + 1)
    }

    // set row `dst` equal to row `src`
    pub(crate) fn row_copy(&mut self, src: usize, dst: usize) {
        if src == dst { return; }
        let (from, mut to)
            = self.tab.multi_slice_mut((s![src, ..], s![dst, ..]));
        to.assign(&from);
    }

    // set row `row` to +Z on qubit `q`
    pub(crate) fn row_set_z(&mut self, row: usize, q: usize) {
        let zq = self.z_col(q);
        self.tab.row_mut(row).fill(0);
        self.tab[[row, zq]] = 1;
    }

    pub(crate) fn set_r(&mut self, row: usize, bit: u8) {
        let r = self.r_col();
        self.tab[[row, r]] = bit;
    }

    /// Return `true` if rows `a` and `b` commute as Pauli operators.
    pub fn commutes(&self, a: usize, b: usize) -> bool {
        let n = self.n;
        let ra = self.tab.row(a);
        let rb = self.tab.row(b);
        (0..n)
            .map(|j| (ra[j] & rb[n + j]) ^ (ra[n + j] & rb[j]))
            .fold(0, |acc, b| acc ^ b)
            == 0
    }

    /// Return `true` if the tableau encodes a pure stabilizer state: no row is
    /// the identity, all stabilizers (and all destabilizers) commute with each
    /// other, and destabilizer `i` anticommutes with stabilizer `i` only.
    pub fn is_valid(&self) -> bool {
        let n = self.n;
        let r = self.r_col();
        let no_identity
            = self.tab.outer_iter()
            .all(|row| row.slice(s![..r]).iter().any(|&b| b != 0));
        no_identity
            && (0..2 * n).all(|a| {
                (a + 1..2 * n).all(|b| {
                    let paired = a < n && b == a + n;
                    self.commutes(a, b) != paired
                })
            })
    }

    /// Read off the Pauli on qubit `q` in row `row`.
    pub fn pauli(&self, row: usize, q: usize) -> Pauli {
        match (self.x(row, q), self.z(row, q)) {
            (0, 0) => Pauli::I,
            (1, 0) => Pauli::X,
            (1, 1) => Pauli::Y,
            _ => Pauli::Z,
        }
    }

    /// Convert row `row` to a signed Pauli string.
    pub fn row_pauli(&self, row: usize) -> NPauli {
        NPauli {
            negative: self.r(row) == 1,
            ops: (0..self.n).map(|q| self.pauli(row, q)).collect(),
        }
    }

    /// Return the destabilizer generators as signed Pauli strings.
    pub fn destabilizers(&self) -> Vec<NPauli> {
        (0..self.n).map(|i| self.row_pauli(i)).collect()
    }

    /// Return the stabilizer generators as signed Pauli strings.
    pub fn stabilizers(&self) -> Vec<NPauli> {
        (self.n..2 * self.n).map(|i| self.row_pauli(i)).collect()
    }
}

/// Prints one `destabilizer | stabilizer` pair per line. The `#` flag prints
/// identities as `.`.
impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for k in 0..self.n {
            fmt::Display::fmt(&self.row_pauli(k), f)?;
            write!(f, " | ")?;
            fmt::Display::fmt(&self.row_pauli(self.n + k), f)?;
            if k < self.n - 1 { writeln!(f)?; }
        }
        Ok(())
    }
}

/// A single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity
    I,
    /// σ<sub>*x*</sub>
    X,
    /// σ<sub>*y*</sub>
    Y,
    /// σ<sub>*z*</sub>
    Z,
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I => write!(f, "{}", if f.alternate() { "." } else { "I" }),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// An *n*-qubit Pauli string with a ±1 sign.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NPauli {
    pub negative: bool,
    pub ops: Vec<Pauli>,
}

impl fmt::Display for NPauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.negative { "-" } else { "+" })?;
        self.ops.iter()
            .try_for_each(|p| fmt::Display::fmt(p, f))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identity_layout() {
        let tab = Tableau::new(2);
        let expected: nd::Array2<u8> = nd::array![
            [1, 0, 0, 0, 0],
            [0, 1, 0, 0, 0],
            [0, 0, 1, 0, 0],
            [0, 0, 0, 1, 0],
        ];
        assert_eq!(tab.as_array(), expected);
        assert!(tab.is_valid());
        assert_eq!(format!("{}", tab), "+XI | +ZI\n+IX | +IZ");
        assert_eq!(format!("{:#}", tab), "+X. | +Z.\n+.X | +.Z");
    }

    #[test]
    fn zero_qubit_tableau_is_empty() {
        let tab = Tableau::new(0);
        assert_eq!(tab.as_array().dim(), (0, 1));
        assert!(tab.stabilizers().is_empty());
        assert_eq!(tab.to_string(), "");
    }

    #[test]
    fn reset_restores_identity() {
        let mut tab = Tableau::new(3);
        tab.apply_h(0);
        tab.apply_cx(0, 2);
        tab.apply_s(1);
        assert_ne!(tab, Tableau::new(3));
        tab.reset();
        assert_eq!(tab, Tableau::new(3));
    }

    #[test]
    fn from_array_rejects_bad_input() {
        let bad_shape: nd::Array2<u8> = nd::Array2::zeros((4, 4));
        assert_eq!(
            Tableau::from_array(2, bad_shape),
            Err(SimError::ShapeMismatch { expected: (4, 5), actual: (4, 4) }),
        );

        let mut bad_entry = identity(2);
        bad_entry[[1, 3]] = 2;
        assert_eq!(
            Tableau::from_array(2, bad_entry),
            Err(SimError::NonBinaryEntry { row: 1, col: 3, value: 2 }),
        );

        assert_eq!(Tableau::from_array(2, identity(2)), Ok(Tableau::new(2)));
    }

    #[test]
    fn g_table() {
        // X * Y = iZ, Y * Z = iX, Z * X = iY
        assert_eq!(g(1, 0, 1, 1), 1);
        assert_eq!(g(1, 1, 0, 1), 1);
        assert_eq!(g(0, 1, 1, 0), 1);
        // and the reverse orders pick up -i
        assert_eq!(g(1, 1, 1, 0), -1);
        assert_eq!(g(0, 1, 1, 1), -1);
        assert_eq!(g(1, 0, 0, 1), -1);
        // identity and equal Paulis contribute nothing
        assert_eq!(g(0, 0, 1, 1), 0);
        assert_eq!(g(1, 0, 1, 0), 0);
        assert_eq!(g(1, 1, 1, 1), 0);
        assert_eq!(g(0, 1, 0, 1), 0);
    }

    #[test]
    fn row_sum_commuting() {
        // destabilizers XX, IX; stabilizers ZZ, -IZ
        let arr = nd::array![
            [1, 1, 0, 0, 0],
            [0, 1, 0, 0, 0],
            [0, 0, 1, 1, 0],
            [0, 0, 0, 1, 1],
        ];
        let mut tab = Tableau::from_array(2, arr).unwrap();
        // ZZ * -IZ = -ZI
        tab.row_sum(2, 3).unwrap();
        assert_eq!(tab.tab.row(2), nd::array![0_u8, 0, 1, 0, 1]);
        // XX * ZZ: (XZ)(XZ) = (-iY)(-iY) = -YY
        let mut scratch: nd::Array1<u8> = nd::array![0, 0, 1, 1, 0];
        tab.row_sum_into(&mut scratch, 0).unwrap();
        assert_eq!(scratch, nd::array![1_u8, 1, 1, 1, 1]);
    }

    #[test]
    fn row_sum_anticommuting_is_fatal() {
        let mut tab = Tableau::new(1);
        // Z * X = iY
        let err = tab.row_sum(1, 0).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err,
            SimError::PhaseResidue {
                target: RowRef::Row(1),
                source_row: 0,
                residue: 3,
            },
        );
        // tableau untouched on failure
        assert_eq!(tab, Tableau::new(1));
    }

    #[test]
    fn commutation() {
        let mut tab = Tableau::new(2);
        assert!(!tab.commutes(0, 2));
        assert!(tab.commutes(0, 3));
        assert!(tab.commutes(2, 3));
        tab.apply_h(0);
        tab.apply_cx(0, 1);
        // stabilizers XX, ZZ
        assert_eq!(tab.row_pauli(2).ops, vec![Pauli::X, Pauli::X]);
        assert_eq!(tab.row_pauli(3).ops, vec![Pauli::Z, Pauli::Z]);
        assert!(tab.commutes(2, 3));
        assert!(tab.is_valid());
    }

    #[test]
    fn invalid_tableau_detected() {
        // two stabilizers Z and X on the same qubit do not commute
        let arr = nd::array![
            [1, 0, 0, 0, 0],
            [0, 1, 0, 0, 0],
            [0, 0, 1, 0, 0],
            [1, 0, 0, 0, 0],
        ];
        let tab = Tableau::from_array(2, arr).unwrap();
        assert!(!tab.is_valid());
    }

    #[test]
    fn signs_render() {
        let mut tab = Tableau::new(1);
        tab.apply_x(0);
        assert_eq!(tab.stabilizers()[0].to_string(), "-Z");
        assert_eq!(tab.destabilizers()[0].to_string(), "+X");
    }
}
