//! Word algebra shared by every compression kernel
//!
//! The SHA-256 round function is written once against [`Word`] and
//! instantiated over a single `u32`, a portable array of lanes, or a SIMD
//! register (see [`crate::primitives`]). All operations act lane by lane;
//! no carry or bit ever crosses from one lane into another.

/// A 32-bit word, or `LANES` independent 32-bit words processed together.
pub trait Word: Copy {
    /// Number of 32-bit lanes held by one value
    const LANES: usize;

    /// Short backend name used in kernel names and logs
    const NAME: &'static str;

    /// Every lane set to `x`
    fn broadcast(x: u32) -> Self;

    /// Lane `i` as a scalar. `i` must be below `LANES`.
    fn extract_lane(self, i: usize) -> u32;

    /// Lane `i` set to `f(i)`
    fn from_fn<F: FnMut(usize) -> u32>(f: F) -> Self;

    fn and(self, rhs: Self) -> Self;

    fn or(self, rhs: Self) -> Self;

    fn xor(self, rhs: Self) -> Self;

    /// `!self & rhs`
    fn and_not(self, rhs: Self) -> Self;

    /// Addition modulo 2^32 in each lane
    fn add(self, rhs: Self) -> Self;

    /// Logical shift right, `n < 32`
    fn shr(self, n: u32) -> Self;

    /// Rotate right, `0 < n < 32`
    fn rotr(self, n: u32) -> Self;
}

impl Word for u32 {
    const LANES: usize = 1;
    const NAME: &'static str = "scalar";

    #[inline(always)]
    fn broadcast(x: u32) -> Self {
        x
    }

    #[inline(always)]
    fn extract_lane(self, i: usize) -> u32 {
        debug_assert_eq!(i, 0);
        self
    }

    #[inline(always)]
    fn from_fn<F: FnMut(usize) -> u32>(mut f: F) -> Self {
        f(0)
    }

    #[inline(always)]
    fn and(self, rhs: Self) -> Self {
        self & rhs
    }

    #[inline(always)]
    fn or(self, rhs: Self) -> Self {
        self | rhs
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self ^ rhs
    }

    #[inline(always)]
    fn and_not(self, rhs: Self) -> Self {
        !self & rhs
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    #[inline(always)]
    fn shr(self, n: u32) -> Self {
        self >> n
    }

    #[inline(always)]
    fn rotr(self, n: u32) -> Self {
        self.rotate_right(n)
    }
}

/// Portable vector of `N` lanes backed by a plain array.
///
/// Available on every target; the compiler is free to auto-vectorize it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct Lanes<const N: usize>(pub [u32; N]);

impl<const N: usize> Lanes<N> {
    #[inline(always)]
    fn zip(self, rhs: Self, op: impl Fn(u32, u32) -> u32) -> Self {
        Self(core::array::from_fn(|i| op(self.0[i], rhs.0[i])))
    }

    #[inline(always)]
    fn map(self, op: impl Fn(u32) -> u32) -> Self {
        Self(self.0.map(op))
    }
}

impl<const N: usize> Word for Lanes<N> {
    const LANES: usize = N;
    const NAME: &'static str = "portable";

    #[inline(always)]
    fn broadcast(x: u32) -> Self {
        Self([x; N])
    }

    #[inline(always)]
    fn extract_lane(self, i: usize) -> u32 {
        self.0[i]
    }

    #[inline(always)]
    fn from_fn<F: FnMut(usize) -> u32>(f: F) -> Self {
        Self(core::array::from_fn(f))
    }

    #[inline(always)]
    fn and(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a & b)
    }

    #[inline(always)]
    fn or(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a | b)
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a ^ b)
    }

    #[inline(always)]
    fn and_not(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| !a & b)
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, u32::wrapping_add)
    }

    #[inline(always)]
    fn shr(self, n: u32) -> Self {
        self.map(|a| a >> n)
    }

    #[inline(always)]
    fn rotr(self, n: u32) -> Self {
        self.map(|a| (a >> n) | (a << (32 - n)))
    }
}

/// Lane pattern `0, 1, .., LANES - 1`, added to a broadcast batch start.
#[inline(always)]
pub fn lane_offsets<W: Word>() -> W {
    W::from_fn(|i| i as u32)
}

/// Shared conformance checks, run against every backend.
#[cfg(test)]
pub(crate) mod conformance {
    use super::Word;

    pub const SAMPLES: [u32; 10] = [
        0,
        1,
        0x8000_0000,
        0xFFFF_FFFF,
        0x7FFF_FFFF,
        0xDEAD_BEEF,
        0x0123_4567,
        0x89AB_CDEF,
        0x5A5A_A5A5,
        0x6a09_e667,
    ];

    const SENTINEL: u32 = 0xC3C3_3C3C;

    pub fn check_broadcast_extract<W: Word>() {
        for &x in &SAMPLES {
            let v = W::broadcast(x);
            for i in 0..W::LANES {
                assert_eq!(v.extract_lane(i), x, "{} lane {} of broadcast({:#x})", W::NAME, i, x);
            }
        }
    }

    pub fn check_rotate<W: Word>() {
        for &a in &SAMPLES {
            let v = W::broadcast(a);
            for n in 1..32 {
                let r = v.rotr(n);
                for i in 0..W::LANES {
                    assert_eq!(
                        r.extract_lane(i),
                        a.rotate_right(n),
                        "{} rotr({:#x}, {}) lane {}",
                        W::NAME,
                        a,
                        n,
                        i
                    );
                }
            }
        }
    }

    pub fn check_shift<W: Word>() {
        for &a in &SAMPLES {
            for n in 0..32 {
                let r = W::broadcast(a).shr(n);
                for i in 0..W::LANES {
                    assert_eq!(r.extract_lane(i), a >> n);
                }
            }
        }
    }

    /// Every lane but `probe` holds the sentinel; only `probe` varies.
    fn probe_vector<W: Word>(probe: usize, value: u32) -> W {
        W::from_fn(|i| if i == probe { value } else { SENTINEL })
    }

    pub fn check_lane_independence<W: Word>() {
        let ops: [(&str, fn(W, W) -> W, fn(u32, u32) -> u32); 5] = [
            ("add", W::add, u32::wrapping_add),
            ("xor", W::xor, |a, b| a ^ b),
            ("and", W::and, |a, b| a & b),
            ("or", W::or, |a, b| a | b),
            ("and_not", W::and_not, |a, b| !a & b),
        ];

        for probe in 0..W::LANES {
            for &a in &SAMPLES {
                for &b in &SAMPLES {
                    let x = probe_vector::<W>(probe, a);
                    let y = probe_vector::<W>(probe, b);
                    for (name, vector_op, scalar_op) in &ops {
                        let out = vector_op(x, y);
                        for i in 0..W::LANES {
                            let expected = if i == probe {
                                scalar_op(a, b)
                            } else {
                                scalar_op(SENTINEL, SENTINEL)
                            };
                            assert_eq!(
                                out.extract_lane(i),
                                expected,
                                "{} {} leaked into lane {} (probe {})",
                                W::NAME,
                                name,
                                i,
                                probe
                            );
                        }
                    }
                }
            }
        }
    }

    pub fn check_all<W: Word>() {
        check_broadcast_extract::<W>();
        check_rotate::<W>();
        check_shift::<W>();
        check_lane_independence::<W>();
    }
}
