//! Distance-decay coefficient kernels.
//!
//! The fabric's stochastic logic reads a 5×5 quadrant of interaction
//! probabilities: entry `(r, c)` is the chance that a toggle at the origin
//! propagates `r` rows and `c` columns away. The origin is implicitly 1.0;
//! the other 24 entries are 8-bit fixed point, packed row-major into six
//! little-endian 32-bit register groups.
//!
//! ```text
//!   c=0   c=1   c=2   c=3   c=4
//!  [1.0]  b0    b1    b2    b3      r=0
//!   b4    b5    b6    b7    b8      r=1
//!   b9    b10   b11   b12   b13     r=2
//!   b14   b15   b16   b17   b18     r=3
//!   b19   b20   b21   b22   b23     r=4
//!
//!  group k = b(4k) | b(4k+1) << 8 | b(4k+2) << 16 | b(4k+3) << 24
//! ```
//!
//! Distances are measured from the edge of the flip cross, so the two cells
//! adjacent to the origin sit at distance 0. The generator only emits a value
//! for `0 < distance <= reach`, which leaves those cells at 0: the cross
//! itself is toggled explicitly by the flip.

use core::fmt;

use crate::error::{AinedError, Result};
use crate::regs::{COEFF_GROUPS, GROUPS_PER_BANK};

/// Kernel edge length.
pub const KERNEL_SIZE: usize = 5;

/// Number of stored (non-origin) entries.
pub const KERNEL_BYTES: usize = KERNEL_SIZE * KERNEL_SIZE - 1;

/// A reach larger than any distance in the quadrant.
pub const UNBOUNDED_REACH: u32 = 999_999;

/// Distance metric measured from the edge of the flip cross.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// `max(0, sqrt(r² + c²) - 1)`.
    Euclidean,
    /// `max(0, r + c - 1)`.
    Manhattan,
}

impl Metric {
    /// Distance of quadrant entry `(r, c)` from the cross.
    #[must_use]
    pub fn distance(self, r: usize, c: usize) -> f64 {
        let (r, c) = (r as f64, c as f64);
        let raw = match self {
            Self::Euclidean => (r * r + c * c).sqrt() - 1.0,
            Self::Manhattan => r + c - 1.0,
        };
        raw.max(0.0)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
        })
    }
}

impl core::str::FromStr for Metric {
    type Err = AinedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "euclidian" => Ok(Self::Euclidean),
            "manhattan" => Ok(Self::Manhattan),
            other => Err(AinedError::Config(format!(
                "unknown metric `{other}` (expected euclidean or manhattan)"
            ))),
        }
    }
}

/// One of the two kernel banks in the register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CoefficientBank {
    /// Groups 0..6.
    High,
    /// Groups 6..12.
    Low,
}

impl CoefficientBank {
    /// Both banks, high first.
    pub const ALL: [Self; 2] = [Self::High, Self::Low];

    /// First coefficient group of this bank.
    #[inline]
    #[must_use]
    pub const fn first_group(self) -> usize {
        match self {
            Self::High => 0,
            Self::Low => GROUPS_PER_BANK,
        }
    }

    /// Coefficient groups of this bank.
    #[must_use]
    pub const fn groups(self) -> core::ops::Range<usize> {
        self.first_group()..self.first_group() + GROUPS_PER_BANK
    }
}

impl fmt::Display for CoefficientBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Low => "low",
        })
    }
}

impl core::str::FromStr for CoefficientBank {
    type Err = AinedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high" | "h" => Ok(Self::High),
            "low" | "l" => Ok(Self::Low),
            other => Err(AinedError::Config(format!(
                "unknown coefficient bank `{other}` (expected high or low)"
            ))),
        }
    }
}

/// A packed 5×5 decay kernel.
///
/// # Example
///
/// ```
/// use ained::{CoefficientKernel, Metric, UNBOUNDED_REACH};
///
/// let kernel = CoefficientKernel::generate(Metric::Manhattan, 0.5, UNBOUNDED_REACH);
/// assert_eq!(kernel.byte_at(1, 0), Some(0));   // adjacent to the cross
/// assert_eq!(kernel.byte_at(1, 1), Some(128)); // 0.5^1
/// assert_eq!(kernel.byte_at(0, 0), None);      // implicit 1.0
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct CoefficientKernel {
    bytes: [u8; KERNEL_BYTES],
}

impl CoefficientKernel {
    /// Computes a kernel: `factor^distance` for `0 < distance <= reach`,
    /// else 0, quantised as `clamp(round(v * 256), 0, 255)`.
    #[must_use]
    pub fn generate(metric: Metric, factor: f32, reach: u32) -> Self {
        let mut bytes = [0u8; KERNEL_BYTES];
        for r in 0..KERNEL_SIZE {
            for c in 0..KERNEL_SIZE {
                let Some(index) = Self::index(r, c) else {
                    continue;
                };
                let distance = metric.distance(r, c);
                let value = if distance > 0.0 && distance <= f64::from(reach) {
                    f64::from(factor).powf(distance)
                } else {
                    0.0
                };
                bytes[index] = quantize(value);
            }
        }
        Self { bytes }
    }

    /// Builds a kernel from its packed bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KERNEL_BYTES]) -> Self {
        Self { bytes }
    }

    /// Unpacks six little-endian register groups.
    #[must_use]
    pub fn from_groups(groups: [u32; GROUPS_PER_BANK]) -> Self {
        let mut bytes = [0u8; KERNEL_BYTES];
        for (chunk, group) in bytes.chunks_exact_mut(4).zip(groups) {
            chunk.copy_from_slice(&group.to_le_bytes());
        }
        Self { bytes }
    }

    /// Packs into six little-endian register groups.
    #[must_use]
    pub fn to_groups(&self) -> [u32; GROUPS_PER_BANK] {
        let mut groups = [0u32; GROUPS_PER_BANK];
        for (group, chunk) in groups.iter_mut().zip(self.bytes.chunks_exact(4)) {
            *group = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        groups
    }

    /// The 24 stored bytes, row-major without the origin.
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &[u8; KERNEL_BYTES] {
        &self.bytes
    }

    /// Stored byte of entry `(r, c)`; `None` for the origin or outside the
    /// quadrant.
    #[must_use]
    pub fn byte_at(&self, r: usize, c: usize) -> Option<u8> {
        Self::index(r, c).map(|i| self.bytes[i])
    }

    /// Probability of entry `(r, c)` as `byte / 255`; the origin is 1.0 and
    /// entries outside the quadrant are 0.
    #[must_use]
    pub fn probability(&self, r: usize, c: usize) -> f32 {
        if (r, c) == (0, 0) {
            return 1.0;
        }
        self.byte_at(r, c).map_or(0.0, |b| f32::from(b) / 255.0)
    }

    /// The quadrant as 25 row-major probabilities.
    #[must_use]
    pub fn matrix(&self) -> [f32; KERNEL_SIZE * KERNEL_SIZE] {
        let mut m = [0.0; KERNEL_SIZE * KERNEL_SIZE];
        m[0] = 1.0;
        for (slot, &b) in m[1..].iter_mut().zip(&self.bytes) {
            *slot = f32::from(b) / 255.0;
        }
        m
    }

    fn index(r: usize, c: usize) -> Option<usize> {
        if r >= KERNEL_SIZE || c >= KERNEL_SIZE || (r, c) == (0, 0) {
            None
        } else {
            Some(r * KERNEL_SIZE + c - 1)
        }
    }
}

/// Prints the quadrant with two decimals, origin first.
impl fmt::Display for CoefficientKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..KERNEL_SIZE {
            f.write_str(" ")?;
            for c in 0..KERNEL_SIZE {
                write!(f, " {:.2}", self.probability(r, c))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn quantize(value: f64) -> u8 {
    (value * 256.0).round().clamp(0.0, 255.0) as u8
}

const _: () = assert!(GROUPS_PER_BANK * 4 == KERNEL_BYTES);
const _: () = assert!(COEFF_GROUPS == 2 * GROUPS_PER_BANK);
