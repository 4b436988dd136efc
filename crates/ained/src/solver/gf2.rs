//! Linear algebra over GF(2).
//!
//! Vectors are packed 64 entries per `u64`; addition is XOR and the dot
//! product is the parity of the AND.
//!
//! # Example
//!
//! ```
//! use ained::solver::gf2::{BitMatrix, BitVector};
//!
//! // x + y = 1, y = 1  →  x = 0, y = 1
//! let a = BitMatrix::from_rows(2, vec![
//!     BitVector::from_bools(&[true, true]),
//!     BitVector::from_bools(&[false, true]),
//! ]);
//! let elim = a.eliminate();
//! assert_eq!(elim.rank(), 2);
//! let x = elim.solve(&BitVector::from_bools(&[true, true])).unwrap();
//! assert!(!x.get(0) && x.get(1));
//! ```

use core::fmt;

const LIMB: usize = 64;

/// A fixed-length vector over GF(2).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    len: usize,
    limbs: Vec<u64>,
}

impl BitVector {
    /// All-zero vector of `len` entries.
    #[must_use]
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            limbs: vec![0; len.div_ceil(LIMB)],
        }
    }

    /// Vector from booleans.
    #[must_use]
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut v = Self::zeros(bits.len());
        for (i, _) in bits.iter().enumerate().filter(|(_, b)| **b) {
            v.set(i, true);
        }
        v
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true for the zero-length vector.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entry `i`; out of range reads as 0.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.limbs[i / LIMB] >> (i % LIMB)) & 1 != 0
    }

    /// Sets entry `i`; out of range is ignored.
    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        if i < self.len {
            let bit = 1u64 << (i % LIMB);
            if value {
                self.limbs[i / LIMB] |= bit;
            } else {
                self.limbs[i / LIMB] &= !bit;
            }
        }
    }

    /// Flips entry `i`; out of range is ignored.
    #[inline]
    pub fn flip(&mut self, i: usize) {
        if i < self.len {
            self.limbs[i / LIMB] ^= 1u64 << (i % LIMB);
        }
    }

    /// `self += other`. Extra entries of a longer `other` are ignored.
    pub fn xor_assign(&mut self, other: &Self) {
        for (a, b) in self.limbs.iter_mut().zip(&other.limbs) {
            *a ^= b;
        }
        self.trim();
    }

    /// Inner product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> bool {
        let ones: u32 = self
            .limbs
            .iter()
            .zip(&other.limbs)
            .map(|(a, b)| (a & b).count_ones())
            .sum();
        ones & 1 == 1
    }

    /// Number of ones (the Hamming weight).
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.limbs.iter().map(|l| l.count_ones() as usize).sum()
    }

    /// Returns true if every entry is 0.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Indices of the ones, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.get(i))
    }

    /// Entries as booleans.
    #[must_use]
    pub fn to_bools(&self) -> Vec<bool> {
        (0..self.len).map(|i| self.get(i)).collect()
    }

    fn trim(&mut self) {
        let tail = self.len % LIMB;
        if tail != 0 {
            if let Some(last) = self.limbs.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        f.write_str("]")
    }
}

/// A dense matrix over GF(2), stored as row vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMatrix {
    cols: usize,
    rows: Vec<BitVector>,
}

impl BitMatrix {
    /// The `n × n` identity.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| {
                let mut r = BitVector::zeros(n);
                r.set(i, true);
                r
            })
            .collect();
        Self { cols: n, rows }
    }

    /// Matrix from rows; each row is truncated or padded to `cols`.
    #[must_use]
    pub fn from_rows(cols: usize, rows: Vec<BitVector>) -> Self {
        let rows = rows
            .into_iter()
            .map(|r| {
                let mut row = BitVector::zeros(cols);
                for i in r.iter_ones() {
                    row.set(i, true);
                }
                row
            })
            .collect();
        Self { cols, rows }
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn num_cols(&self) -> usize {
        self.cols
    }

    /// Row `i`.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> &BitVector {
        &self.rows[i]
    }

    /// Entry `(i, j)`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.rows.get(i).is_some_and(|r| r.get(j))
    }

    /// Sets entry `(i, j)`; out of range is ignored.
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        if let Some(r) = self.rows.get_mut(i) {
            r.set(j, value);
        }
    }

    /// `self · v`.
    #[must_use]
    pub fn mul_vec(&self, v: &BitVector) -> BitVector {
        let mut out = BitVector::zeros(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            out.set(i, row.dot(v));
        }
        out
    }

    /// Gauss-Jordan elimination, tracking the row operations.
    ///
    /// Produces `R = E · A` in reduced row echelon form together with the
    /// invertible `E`.
    #[must_use]
    pub fn eliminate(&self) -> Elimination {
        let n = self.rows.len();
        let mut r = self.rows.clone();
        let mut e = Self::identity(n).rows;
        let mut pivots = Vec::new();

        for col in 0..self.cols {
            let rank = pivots.len();
            let Some(p) = (rank..n).find(|&i| r[i].get(col)) else {
                continue;
            };
            r.swap(rank, p);
            e.swap(rank, p);
            let (pr, pe) = (r[rank].clone(), e[rank].clone());
            for i in 0..n {
                if i != rank && r[i].get(col) {
                    r[i].xor_assign(&pr);
                    e[i].xor_assign(&pe);
                }
            }
            pivots.push(col);
        }

        Elimination {
            reduced: Self {
                cols: self.cols,
                rows: r,
            },
            transform: Self { cols: n, rows: e },
            pivots,
        }
    }
}

/// Result of [`BitMatrix::eliminate`].
#[derive(Clone, Debug)]
pub struct Elimination {
    reduced: BitMatrix,
    transform: BitMatrix,
    pivots: Vec<usize>,
}

impl Elimination {
    /// Rank of the original matrix.
    #[inline]
    #[must_use]
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }

    /// Pivot column of each of the first `rank` rows.
    #[inline]
    #[must_use]
    pub fn pivots(&self) -> &[usize] {
        &self.pivots
    }

    /// Some `x` with `A · x = b`, free variables zero; `None` if the system
    /// is inconsistent.
    #[must_use]
    pub fn solve(&self, b: &BitVector) -> Option<BitVector> {
        let c = self.transform.mul_vec(b);
        if (self.rank()..c.len()).any(|i| c.get(i)) {
            return None;
        }
        let mut x = BitVector::zeros(self.reduced.num_cols());
        for (i, &col) in self.pivots.iter().enumerate() {
            x.set(col, c.get(i));
        }
        Some(x)
    }

    /// A basis of the null space of `A`: one vector per free column.
    #[must_use]
    pub fn null_space(&self) -> Vec<BitVector> {
        let cols = self.reduced.num_cols();
        let mut is_pivot = vec![false; cols];
        for &p in &self.pivots {
            is_pivot[p] = true;
        }
        (0..cols)
            .filter(|&f| !is_pivot[f])
            .map(|f| {
                let mut v = BitVector::zeros(cols);
                v.set(f, true);
                for (i, &p) in self.pivots.iter().enumerate() {
                    if self.reduced.get(i, f) {
                        v.set(p, true);
                    }
                }
                v
            })
            .collect()
    }
}
