//! Compression kernels
//!
//! A kernel runs the SHA-256d compression for every lane of a batch and
//! reports the nonce of the lowest passing lane. Kernels are pure: same
//! inputs, same answer, no state carried between calls.
//!
//! The round function below is written once over [`Word`]; the scalar
//! reference and every vector kernel are instantiations of it, so they agree
//! on which nonce wins by construction.

use core::array;
use core::marker::PhantomData;

use crate::params::{BLOCK_WORDS, EARLY_ROUNDS, K, NONCE_WORD, ROUNDS, SCHEDULE_WORDS, STATE_WORDS};
use crate::word::Word;
use crate::work::ShareTarget;

/// Contract between the hash engine and a compression routine.
pub trait Kernel {
    /// Lane layout the engine keeps its scratch buffers in
    type Word: Word;

    /// Human-readable kernel name (for logs and benchmarks)
    fn name(&self) -> &'static str;

    /// Compress one batch and check it against `target`.
    ///
    /// - `schedule[0..16]`: data block, lane nonces already in word 3
    /// - `schedule[16..32]`: secondary buffer; words 16..24 are placeholders
    /// - `midstate`: state after the blocks preceding the data block
    /// - `init`: initial hash value of the second application
    ///
    /// Only lanes `0..lane_count` are eligible. Returns the nonce of the
    /// lowest eligible lane that passes.
    fn try_batch(
        &self,
        schedule: &[Self::Word; SCHEDULE_WORDS],
        midstate: &[Self::Word; STATE_WORDS],
        init: &[u32; STATE_WORDS],
        target: ShareTarget,
        lane_count: usize,
    ) -> Option<u32>;
}

/// Reference kernel: the generic round function over any [`Word`] backend.
pub struct PortableKernel<W> {
    _word: PhantomData<fn() -> W>,
}

/// Portable reference, one nonce per call
pub type ScalarKernel = PortableKernel<u32>;

impl<W: Word> PortableKernel<W> {
    pub const fn new() -> Self {
        Self { _word: PhantomData }
    }
}

impl<W: Word> Default for PortableKernel<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Clone for PortableKernel<W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for PortableKernel<W> {}

impl<W: Word> core::fmt::Debug for PortableKernel<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PortableKernel")
            .field("word", &W::NAME)
            .field("lanes", &W::LANES)
            .finish()
    }
}

impl<W: Word> Kernel for PortableKernel<W> {
    type Word = W;

    fn name(&self) -> &'static str {
        W::NAME
    }

    #[inline(always)]
    fn try_batch(
        &self,
        schedule: &[W; SCHEDULE_WORDS],
        midstate: &[W; STATE_WORDS],
        init: &[u32; STATE_WORDS],
        target: ShareTarget,
        lane_count: usize,
    ) -> Option<u32> {
        search_batch(schedule, midstate, init, target, lane_count)
    }
}

#[cfg(target_arch = "x86_64")]
pub use x86::{Avx2Kernel, Sse2Kernel};

#[cfg(target_arch = "aarch64")]
pub use arm::NeonKernel;

#[cfg(target_arch = "x86_64")]
mod x86 {
    use super::*;
    use crate::primitives::{Avx2x8, Sse2x4};
    use crate::word::Lanes;

    cpufeatures::new!(cpuid_avx2, "avx2");

    /// Four-lane SSE2 kernel (x86_64 baseline)
    pub type Sse2Kernel = PortableKernel<Sse2x4>;

    /// Eight-lane AVX2 kernel.
    ///
    /// The engine keeps its scratch in portable [`Lanes<8>`]; each batch is
    /// loaded into AVX2 registers inside a `target_feature` function. The
    /// only constructor is [`Avx2Kernel::detect`].
    #[derive(Clone, Copy, Debug)]
    pub struct Avx2Kernel {
        _token: cpuid_avx2::InitToken,
    }

    impl Avx2Kernel {
        /// Returns the kernel if the running CPU supports AVX2.
        pub fn detect() -> Option<Self> {
            let (token, available) = cpuid_avx2::init_get();
            available.then_some(Self { _token: token })
        }
    }

    impl Kernel for Avx2Kernel {
        type Word = Lanes<8>;

        fn name(&self) -> &'static str {
            <Avx2x8 as Word>::NAME
        }

        fn try_batch(
            &self,
            schedule: &[Lanes<8>; SCHEDULE_WORDS],
            midstate: &[Lanes<8>; STATE_WORDS],
            init: &[u32; STATE_WORDS],
            target: ShareTarget,
            lane_count: usize,
        ) -> Option<u32> {
            // SAFETY: `self` only exists after cpuid reported AVX2.
            unsafe { try_batch_avx2(schedule, midstate, init, target, lane_count) }
        }
    }

    #[target_feature(enable = "avx2")]
    unsafe fn try_batch_avx2(
        schedule: &[Lanes<8>; SCHEDULE_WORDS],
        midstate: &[Lanes<8>; STATE_WORDS],
        init: &[u32; STATE_WORDS],
        target: ShareTarget,
        lane_count: usize,
    ) -> Option<u32> {
        let schedule: [Avx2x8; SCHEDULE_WORDS] =
            array::from_fn(|i| Avx2x8::from_array(schedule[i].0));
        let midstate: [Avx2x8; STATE_WORDS] = array::from_fn(|i| Avx2x8::from_array(midstate[i].0));
        search_batch(&schedule, &midstate, init, target, lane_count)
    }
}

#[cfg(target_arch = "aarch64")]
mod arm {
    use super::*;
    use crate::primitives::Neon4;

    /// Four-lane NEON kernel (aarch64 baseline)
    pub type NeonKernel = PortableKernel<Neon4>;
}

/// Shared batch body: first compression from the midstate, second
/// compression from `init` up to word 7, then the per-lane target check.
#[inline(always)]
fn search_batch<W: Word>(
    schedule: &[W; SCHEDULE_WORDS],
    midstate: &[W; STATE_WORDS],
    init: &[u32; STATE_WORDS],
    target: ShareTarget,
    lane_count: usize,
) -> Option<u32> {
    let data: [W; BLOCK_WORDS] = array::from_fn(|i| schedule[i]);
    let digest = compress(midstate, &data);

    let second: [W; BLOCK_WORDS] = array::from_fn(|i| {
        if i < STATE_WORDS {
            digest[i]
        } else {
            schedule[BLOCK_WORDS + i]
        }
    });
    let init = init.map(W::broadcast);
    let h7 = final_word7(&init, &second);

    (0..lane_count.min(W::LANES))
        .find(|&lane| target.accepts(h7.extract_lane(lane)))
        .map(|lane| schedule[NONCE_WORD].extract_lane(lane))
}

/// Full SHA-256 compression of one block into `state`.
#[inline(always)]
pub fn compress<W: Word>(state: &[W; STATE_WORDS], block: &[W; BLOCK_WORDS]) -> [W; STATE_WORDS] {
    let w = expand::<W, ROUNDS>(block);
    let out = rounds(state, &w);
    array::from_fn(|i| state[i].add(out[i]))
}

/// Word 7 of the finished compression.
///
/// After round 60 the `e` register has three shifts left before it lands in
/// `h`, so the last three rounds are skipped.
#[inline(always)]
pub fn final_word7<W: Word>(state: &[W; STATE_WORDS], block: &[W; BLOCK_WORDS]) -> W {
    let w = expand::<W, EARLY_ROUNDS>(block);
    let out = rounds(state, &w);
    state[7].add(out[4])
}

/// Message schedule `w[0..N]`
#[inline(always)]
fn expand<W: Word, const N: usize>(block: &[W; BLOCK_WORDS]) -> [W; N] {
    let mut w = [W::broadcast(0); N];
    w[..BLOCK_WORDS].copy_from_slice(block);
    for t in BLOCK_WORDS..N {
        w[t] = small_sigma1(w[t - 2])
            .add(w[t - 7])
            .add(small_sigma0(w[t - 15]))
            .add(w[t - 16]);
    }
    w
}

/// Runs `w.len()` rounds and returns the working registers.
#[inline(always)]
fn rounds<W: Word, const N: usize>(state: &[W; STATE_WORDS], w: &[W; N]) -> [W; STATE_WORDS] {
    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for t in 0..N {
        let t1 = h
            .add(big_sigma1(e))
            .add(ch(e, f, g))
            .add(W::broadcast(K[t]))
            .add(w[t]);
        let t2 = big_sigma0(a).add(maj(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.add(t2);
    }
    [a, b, c, d, e, f, g, h]
}

#[inline(always)]
fn ch<W: Word>(e: W, f: W, g: W) -> W {
    e.and(f).xor(e.and_not(g))
}

#[inline(always)]
fn maj<W: Word>(a: W, b: W, c: W) -> W {
    a.and(b).or(c.and(a.or(b)))
}

#[inline(always)]
fn big_sigma0<W: Word>(x: W) -> W {
    x.rotr(2).xor(x.rotr(13)).xor(x.rotr(22))
}

#[inline(always)]
fn big_sigma1<W: Word>(x: W) -> W {
    x.rotr(6).xor(x.rotr(11)).xor(x.rotr(25))
}

#[inline(always)]
fn small_sigma0<W: Word>(x: W) -> W {
    x.rotr(7).xor(x.rotr(18)).xor(x.shr(3))
}

#[inline(always)]
fn small_sigma1<W: Word>(x: W) -> W {
    x.rotr(17).xor(x.rotr(19)).xor(x.shr(10))
}
