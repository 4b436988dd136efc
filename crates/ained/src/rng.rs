//! Three-component Tausworthe generator (L'Ecuyer's taus88).
//!
//! This is the generator each dipole runs in the fabric. The host uses the
//! same recurrence to simulate dipoles and to draw game boards, so a seed
//! triple read from a device reproduces its stream on the host.

/// taus88 state.
///
/// # Example
///
/// ```
/// use ained::Tausworthe;
///
/// let mut a = Tausworthe::from_seed(42);
/// let mut b = Tausworthe::new(a.seeds());
/// assert_eq!(a.next_u32(), b.next_u32());
/// assert!(a.next_below(25) < 25);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tausworthe {
    s: [u32; 3],
}

/// Smallest legal value of each component. Seeds at or below these
/// degenerate to a short cycle.
const MIN_SEED: [u32; 3] = [1, 7, 15];

impl Tausworthe {
    /// Creates a generator from a raw seed triple. Components at or below
    /// their minimum are pushed past it.
    #[must_use]
    pub const fn new(seeds: [u32; 3]) -> Self {
        let mut s = seeds;
        let mut i = 0;
        while i < 3 {
            if s[i] <= MIN_SEED[i] {
                s[i] = s[i].wrapping_add(MIN_SEED[i] + 1);
                if s[i] <= MIN_SEED[i] {
                    s[i] = MIN_SEED[i] + 1;
                }
            }
            i += 1;
        }
        Self { s }
    }

    /// Expands a single 32-bit seed into a valid triple with the LCG
    /// `x * 69069` (the customary taus88 seeding).
    #[must_use]
    pub const fn from_seed(seed: u32) -> Self {
        let a = seed.wrapping_mul(69069).wrapping_add(1);
        let b = a.wrapping_mul(69069).wrapping_add(1);
        let c = b.wrapping_mul(69069).wrapping_add(1);
        Self::new([a, b, c])
    }

    /// Current state, in the order of the dipole seed registers.
    #[inline]
    #[must_use]
    pub const fn seeds(&self) -> [u32; 3] {
        self.s
    }

    /// Advances the generator and returns the next output.
    pub fn next_u32(&mut self) -> u32 {
        let [s0, s1, s2] = &mut self.s;
        let b = ((*s0 << 13) ^ *s0) >> 19;
        *s0 = ((*s0 & 0xFFFF_FFFE) << 12) ^ b;
        let b = ((*s1 << 2) ^ *s1) >> 25;
        *s1 = ((*s1 & 0xFFFF_FFF8) << 4) ^ b;
        let b = ((*s2 << 3) ^ *s2) >> 11;
        *s2 = ((*s2 & 0xFFFF_FFF0) << 17) ^ b;
        *s0 ^ *s1 ^ *s2
    }

    /// Uniform value in `0..bound`. Returns 0 for `bound == 0`.
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        // Multiply-shift: bias is below 2^-32 * bound.
        let wide = u64::from(self.next_u32()) * bound as u64;
        (wide >> 32) as usize
    }

    /// A fair coin.
    pub fn next_bool(&mut self) -> bool {
        self.next_u32() & 0x8000_0000 != 0
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}
