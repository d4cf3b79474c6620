//! Hash engine: per-lane scratch state and the nonce iteration
//!
//! The engine owns the replicated midstate and schedule for one work unit
//! and walks a nonce range in batches of `LANES`, handing each batch to its
//! [`Kernel`]. It never allocates, blocks or yields; a caller that wants to
//! stop early bounds the range passed to [`HashEngine::scan`] and checks its
//! own stop condition between calls.

use log::debug;

use crate::error::EngineError;
use crate::kernel::Kernel;
use crate::params::{BLOCK_WORDS, IV, NONCE_SPACE, NONCE_WORD, SCHEDULE_WORDS, STATE_WORDS};
use crate::word::{Word, lane_offsets};
use crate::work::{ShareTarget, Work, read_words};

/// Half-open nonce range `[start, end)` with `end <= 2^32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceRange {
    start: u32,
    end: u64,
}

impl NonceRange {
    pub fn new(start: u32, end: u64) -> Result<Self, EngineError> {
        if end > NONCE_SPACE || u64::from(start) > end {
            return Err(EngineError::InvalidRange {
                start: u64::from(start),
                end,
            });
        }
        Ok(Self { start, end })
    }

    /// `[start, 2^32)`
    pub const fn from_start(start: u32) -> Self {
        Self {
            start,
            end: NONCE_SPACE,
        }
    }

    /// The whole nonce space
    pub const fn full() -> Self {
        Self::from_start(0)
    }

    pub const fn start(&self) -> u32 {
        self.start
    }

    pub const fn end(&self) -> u64 {
        self.end
    }

    pub const fn len(&self) -> u64 {
        self.end - self.start as u64
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split into at most `parts` contiguous, disjoint, non-empty chunks
    /// covering the range in order.
    pub fn split(&self, parts: usize) -> Vec<NonceRange> {
        let parts = (parts.max(1) as u64).min(self.len().max(1));
        let chunk = self.len().div_ceil(parts).max(1);
        let mut ranges = Vec::with_capacity(parts as usize);
        let mut start = u64::from(self.start);
        while start < self.end {
            let end = (start + chunk).min(self.end);
            ranges.push(NonceRange {
                start: start as u32,
                end,
            });
            start = end;
        }
        ranges
    }
}

/// Result of a bounded search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Lowest passing nonce in the range; `hashes` counts candidates up to and
    /// including it.
    Found { nonce: u32, hashes: u64 },
    /// No nonce in the range passed.
    Exhausted { hashes: u64 },
}

impl ScanOutcome {
    pub fn nonce(&self) -> Option<u32> {
        match self {
            ScanOutcome::Found { nonce, .. } => Some(*nonce),
            ScanOutcome::Exhausted { .. } => None,
        }
    }

    pub fn hashes(&self) -> u64 {
        match self {
            ScanOutcome::Found { hashes, .. } | ScanOutcome::Exhausted { hashes } => *hashes,
        }
    }
}

/// Working set replicated across all lanes.
#[derive(Clone, Copy)]
struct Scratch<W> {
    midstate: [W; STATE_WORDS],
    /// Data block followed by the secondary buffer; word 3 holds the lane
    /// nonces of the current batch.
    schedule: [W; SCHEDULE_WORDS],
    target: ShareTarget,
}

/// Nonce search engine over one kernel.
///
/// Scalar and vector engines are the same type with a different `K`.
pub struct HashEngine<K: Kernel> {
    kernel: K,
    offsets: K::Word,
    scratch: Option<Scratch<K::Word>>,
}

impl<K: Kernel> HashEngine<K> {
    /// Create an engine with no work prepared.
    pub fn new(kernel: K) -> Self {
        const { assert!(<K::Word as Word>::LANES > 0 && <K::Word as Word>::LANES <= 64) };
        Self {
            kernel,
            offsets: lane_offsets(),
            scratch: None,
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Nonces evaluated per kernel call
    pub fn lanes(&self) -> usize {
        <K::Word as Word>::LANES
    }

    pub fn is_prepared(&self) -> bool {
        self.scratch.is_some()
    }

    /// Load a new working set from raw buffers.
    ///
    /// `midstate` must be 32 bytes, `data` one 64-byte block and `hash1` 64
    /// bytes, all read as big-endian words. On error the previous working set
    /// is kept as it was.
    pub fn prepare_data(
        &mut self,
        midstate: &[u8],
        data: &[u8],
        hash1: &[u8],
        target: ShareTarget,
    ) -> Result<(), EngineError> {
        let midstate = read_words::<STATE_WORDS>("midstate", midstate)?;
        let data = read_words::<BLOCK_WORDS>("data", data)?;
        let hash1 = read_words::<BLOCK_WORDS>("hash1", hash1)?;
        self.load(&midstate, &data, &hash1, target);
        Ok(())
    }

    /// Load a new working set from a typed work unit.
    pub fn prepare_work(&mut self, work: &Work) {
        self.load(&work.midstate, &work.data, &work.hash1, work.target);
    }

    fn load(
        &mut self,
        midstate: &[u32; STATE_WORDS],
        data: &[u32; BLOCK_WORDS],
        hash1: &[u32; BLOCK_WORDS],
        target: ShareTarget,
    ) {
        let mut schedule = [<K::Word as Word>::broadcast(0); SCHEDULE_WORDS];
        for (slot, &word) in schedule.iter_mut().zip(data.iter().chain(hash1)) {
            *slot = <K::Word as Word>::broadcast(word);
        }
        schedule[NONCE_WORD] = self.offsets;

        self.scratch = Some(Scratch {
            midstate: midstate.map(<K::Word as Word>::broadcast),
            schedule,
            target,
        });

        debug!(
            "{} kernel prepared: {} lanes, target ceiling {:#010x}",
            self.kernel.name(),
            self.lanes(),
            target.ceiling()
        );
    }

    /// Search `range` in order and return the lowest passing nonce.
    pub fn scan(&mut self, range: NonceRange) -> Result<ScanOutcome, EngineError> {
        let scratch = self.scratch.as_mut().ok_or(EngineError::NotPrepared)?;
        let lanes = <K::Word as Word>::LANES as u64;

        let mut batch_start = u64::from(range.start);
        let mut hashes = 0u64;

        while batch_start < range.end {
            let lane_count = (range.end - batch_start).min(lanes);
            scratch.schedule[NONCE_WORD] =
                <K::Word as Word>::broadcast(batch_start as u32).add(self.offsets);

            if let Some(nonce) = self.kernel.try_batch(
                &scratch.schedule,
                &scratch.midstate,
                &IV,
                scratch.target,
                lane_count as usize,
            ) {
                let hashes = hashes + (u64::from(nonce) - batch_start) + 1;
                debug!(
                    "{} kernel found nonce {:#010x} after {} hashes",
                    self.kernel.name(),
                    nonce,
                    hashes
                );
                return Ok(ScanOutcome::Found { nonce, hashes });
            }

            hashes += lane_count;
            batch_start += lanes;
        }

        debug!(
            "{} kernel exhausted {:#010x}..{:#x} ({} hashes)",
            self.kernel.name(),
            range.start,
            range.end,
            hashes
        );
        Ok(ScanOutcome::Exhausted { hashes })
    }

    /// Search from `*nonce` to the end of the nonce space.
    ///
    /// On success the winning nonce is written back and `true` returned. On
    /// exhaustion `*nonce` is left untouched and `false` returned.
    pub fn find_nonce(&mut self, nonce: &mut u32) -> Result<bool, EngineError> {
        match self.scan(NonceRange::from_start(*nonce))? {
            ScanOutcome::Found { nonce: found, .. } => {
                *nonce = found;
                Ok(true)
            }
            ScanOutcome::Exhausted { .. } => Ok(false),
        }
    }
}

impl<K: Kernel + Default> Default for HashEngine<K> {
    fn default() -> Self {
        Self::new(K::default())
    }
}
