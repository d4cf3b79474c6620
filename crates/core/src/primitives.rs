//! Register-backed word backends
//!
//! Each type implements [`Word`] over one SIMD register of 32-bit lanes.
//! Shifts take a runtime count (`_mm_srl_epi32`, `vshlq_u32`) so rotations
//! follow `(a >> n) | (a << (32 - n))` for any `n` in `1..32`.
//!
//! SSE2 and NEON are part of the x86_64 and aarch64 baselines, so their
//! types are public. AVX2 is not: [`Avx2x8`] stays crate-private and is only
//! touched inside the runtime-detected AVX2 kernel.

#[cfg(target_arch = "x86_64")]
pub use x86::Sse2x4;

#[cfg(target_arch = "x86_64")]
pub(crate) use x86::Avx2x8;

#[cfg(target_arch = "aarch64")]
pub use arm::Neon4;

#[cfg(target_arch = "x86_64")]
mod x86 {
    use crate::word::Word;
    use core::arch::x86_64::{
        __m128i, __m256i, _mm_add_epi32, _mm_and_si128, _mm_andnot_si128, _mm_cvtsi32_si128,
        _mm_loadu_si128, _mm_or_si128, _mm_set1_epi32, _mm_sll_epi32, _mm_srl_epi32,
        _mm_storeu_si128, _mm_xor_si128, _mm256_add_epi32, _mm256_and_si256,
        _mm256_andnot_si256, _mm256_loadu_si256, _mm256_or_si256, _mm256_set1_epi32,
        _mm256_sll_epi32, _mm256_srl_epi32, _mm256_storeu_si256, _mm256_xor_si256,
    };

    /// Four lanes in an SSE2 register
    #[derive(Clone, Copy, Debug)]
    #[repr(transparent)]
    pub struct Sse2x4(__m128i);

    impl Sse2x4 {
        #[inline(always)]
        pub fn to_array(self) -> [u32; 4] {
            let mut out = [0u32; 4];
            // SAFETY: SSE2 is always present on x86_64; unaligned store of 16 bytes into `out`.
            unsafe { _mm_storeu_si128(out.as_mut_ptr() as *mut __m128i, self.0) };
            out
        }

        #[inline(always)]
        pub fn from_array(lanes: [u32; 4]) -> Self {
            // SAFETY: SSE2 baseline; unaligned load of 16 bytes from `lanes`.
            Self(unsafe { _mm_loadu_si128(lanes.as_ptr() as *const __m128i) })
        }
    }

    impl Word for Sse2x4 {
        const LANES: usize = 4;
        const NAME: &'static str = "sse2";

        #[inline(always)]
        fn broadcast(x: u32) -> Self {
            // SAFETY: SSE2 baseline (applies to every intrinsic in this impl).
            Self(unsafe { _mm_set1_epi32(x as i32) })
        }

        #[inline(always)]
        fn extract_lane(self, i: usize) -> u32 {
            self.to_array()[i]
        }

        #[inline(always)]
        fn from_fn<F: FnMut(usize) -> u32>(f: F) -> Self {
            Self::from_array(core::array::from_fn(f))
        }

        #[inline(always)]
        fn and(self, rhs: Self) -> Self {
            Self(unsafe { _mm_and_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn or(self, rhs: Self) -> Self {
            Self(unsafe { _mm_or_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn xor(self, rhs: Self) -> Self {
            Self(unsafe { _mm_xor_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn and_not(self, rhs: Self) -> Self {
            Self(unsafe { _mm_andnot_si128(self.0, rhs.0) })
        }

        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self(unsafe { _mm_add_epi32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn shr(self, n: u32) -> Self {
            Self(unsafe { _mm_srl_epi32(self.0, _mm_cvtsi32_si128(n as i32)) })
        }

        #[inline(always)]
        fn rotr(self, n: u32) -> Self {
            unsafe {
                let right = _mm_srl_epi32(self.0, _mm_cvtsi32_si128(n as i32));
                let left = _mm_sll_epi32(self.0, _mm_cvtsi32_si128((32 - n) as i32));
                Self(_mm_or_si128(right, left))
            }
        }
    }

    /// Eight lanes in an AVX2 register.
    ///
    /// Only created inside functions compiled with `target_feature = "avx2"`
    /// after runtime detection succeeded.
    #[derive(Clone, Copy, Debug)]
    #[repr(transparent)]
    pub(crate) struct Avx2x8(__m256i);

    impl Avx2x8 {
        #[inline(always)]
        pub(crate) fn from_array(lanes: [u32; 8]) -> Self {
            // SAFETY: caller runs under a detected AVX2 token; 32-byte unaligned load.
            Self(unsafe { _mm256_loadu_si256(lanes.as_ptr() as *const __m256i) })
        }

        #[inline(always)]
        pub(crate) fn to_array(self) -> [u32; 8] {
            let mut out = [0u32; 8];
            unsafe { _mm256_storeu_si256(out.as_mut_ptr() as *mut __m256i, self.0) };
            out
        }
    }

    impl Word for Avx2x8 {
        const LANES: usize = 8;
        const NAME: &'static str = "avx2";

        #[inline(always)]
        fn broadcast(x: u32) -> Self {
            Self(unsafe { _mm256_set1_epi32(x as i32) })
        }

        #[inline(always)]
        fn extract_lane(self, i: usize) -> u32 {
            self.to_array()[i]
        }

        #[inline(always)]
        fn from_fn<F: FnMut(usize) -> u32>(f: F) -> Self {
            Self::from_array(core::array::from_fn(f))
        }

        #[inline(always)]
        fn and(self, rhs: Self) -> Self {
            Self(unsafe { _mm256_and_si256(self.0, rhs.0) })
        }

        #[inline(always)]
        fn or(self, rhs: Self) -> Self {
            Self(unsafe { _mm256_or_si256(self.0, rhs.0) })
        }

        #[inline(always)]
        fn xor(self, rhs: Self) -> Self {
            Self(unsafe { _mm256_xor_si256(self.0, rhs.0) })
        }

        #[inline(always)]
        fn and_not(self, rhs: Self) -> Self {
            Self(unsafe { _mm256_andnot_si256(self.0, rhs.0) })
        }

        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self(unsafe { _mm256_add_epi32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn shr(self, n: u32) -> Self {
            Self(unsafe { _mm256_srl_epi32(self.0, _mm_cvtsi32_si128(n as i32)) })
        }

        #[inline(always)]
        fn rotr(self, n: u32) -> Self {
            unsafe {
                let right = _mm256_srl_epi32(self.0, _mm_cvtsi32_si128(n as i32));
                let left = _mm256_sll_epi32(self.0, _mm_cvtsi32_si128((32 - n) as i32));
                Self(_mm256_or_si256(right, left))
            }
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod arm {
    use crate::word::Word;
    use core::arch::aarch64::{
        uint32x4_t, vaddq_u32, vandq_u32, vbicq_u32, vdupq_n_s32, vdupq_n_u32, veorq_u32,
        vld1q_u32, vorrq_u32, vshlq_u32, vst1q_u32,
    };

    /// Four lanes in a NEON register
    #[derive(Clone, Copy, Debug)]
    #[repr(transparent)]
    pub struct Neon4(uint32x4_t);

    impl Neon4 {
        #[inline(always)]
        pub fn to_array(self) -> [u32; 4] {
            let mut out = [0u32; 4];
            // SAFETY: NEON is always present on aarch64.
            unsafe { vst1q_u32(out.as_mut_ptr(), self.0) };
            out
        }

        #[inline(always)]
        pub fn from_array(lanes: [u32; 4]) -> Self {
            Self(unsafe { vld1q_u32(lanes.as_ptr()) })
        }
    }

    impl Word for Neon4 {
        const LANES: usize = 4;
        const NAME: &'static str = "neon";

        #[inline(always)]
        fn broadcast(x: u32) -> Self {
            Self(unsafe { vdupq_n_u32(x) })
        }

        #[inline(always)]
        fn extract_lane(self, i: usize) -> u32 {
            self.to_array()[i]
        }

        #[inline(always)]
        fn from_fn<F: FnMut(usize) -> u32>(f: F) -> Self {
            Self::from_array(core::array::from_fn(f))
        }

        #[inline(always)]
        fn and(self, rhs: Self) -> Self {
            Self(unsafe { vandq_u32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn or(self, rhs: Self) -> Self {
            Self(unsafe { vorrq_u32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn xor(self, rhs: Self) -> Self {
            Self(unsafe { veorq_u32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn and_not(self, rhs: Self) -> Self {
            // BIC computes `a & !b`, so the operands swap.
            Self(unsafe { vbicq_u32(rhs.0, self.0) })
        }

        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self(unsafe { vaddq_u32(self.0, rhs.0) })
        }

        #[inline(always)]
        fn shr(self, n: u32) -> Self {
            // USHL by a negative count shifts right.
            Self(unsafe { vshlq_u32(self.0, vdupq_n_s32(-(n as i32))) })
        }

        #[inline(always)]
        fn rotr(self, n: u32) -> Self {
            unsafe {
                let right = vshlq_u32(self.0, vdupq_n_s32(-(n as i32)));
                let left = vshlq_u32(self.0, vdupq_n_s32((32 - n) as i32));
                Self(vorrq_u32(right, left))
            }
        }
    }
}
