//! Work units: block headers, prepared buffers and share targets
//!
//! The engine itself only sees three opaque buffers. These helpers build
//! them from an 80-byte block header and verify results with the `sha2`
//! reference implementation.

use sha2::{Digest, Sha256};

use crate::error::EngineError;
use crate::params::{
    BLOCK_SIZE, BLOCK_WORDS, HASH1_PADDING, HASH1_SIZE, HEADER_SIZE, IV, MIDSTATE_SIZE,
    NONCE_WORD, STATE_WORDS,
};

/// Ceiling on the most significant 32 bits of a SHA-256d result.
///
/// The result is read as a little-endian 256-bit integer (Bitcoin
/// convention), so its top word is `h7.swap_bytes()` of the final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShareTarget(u32);

impl ShareTarget {
    /// Top word must be zero (`h7 == 0`)
    pub const DIFFICULTY_ONE: Self = Self(0);

    pub const fn from_ceiling(ceiling: u32) -> Self {
        Self(ceiling)
    }

    pub const fn ceiling(self) -> u32 {
        self.0
    }

    /// At least `bits` leading zero bits in the top word. Values above 32
    /// clamp to 32.
    pub const fn leading_zero_bits(bits: u32) -> Self {
        match bits {
            0 => Self(u32::MAX),
            1..=31 => Self(u32::MAX >> bits),
            _ => Self(0),
        }
    }

    /// Check final state word 7 of the second compression.
    #[inline(always)]
    pub fn accepts(self, h7: u32) -> bool {
        h7.swap_bytes() <= self.0
    }

    /// Check a serialized SHA-256d digest.
    pub fn accepts_hash(self, hash: &[u8; 32]) -> bool {
        u32::from_le_bytes([hash[28], hash[29], hash[30], hash[31]]) <= self.0
    }
}

/// An 80-byte block header. The nonce is message word 3 of the second
/// block, stored big-endian at bytes `76..80`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader([u8; HEADER_SIZE]);

impl BlockHeader {
    pub const fn new(bytes: [u8; HEADER_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, EngineError> {
        let bytes: [u8; HEADER_SIZE] =
            bytes.try_into().map_err(|_| EngineError::InvalidLength {
                buffer: "header",
                expected: HEADER_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, EngineError> {
        let bytes = hex::decode(hex_str.trim())?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.0
    }

    pub fn nonce(&self) -> u32 {
        u32::from_be_bytes([self.0[76], self.0[77], self.0[78], self.0[79]])
    }

    pub fn with_nonce(&self, nonce: u32) -> Self {
        let mut bytes = self.0;
        bytes[76..80].copy_from_slice(&nonce.to_be_bytes());
        Self(bytes)
    }

    /// State after compressing the first 64 bytes
    pub fn midstate(&self) -> [u32; STATE_WORDS] {
        let mut state = IV;
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&self.0[..BLOCK_SIZE]);
        sha2::compress256(&mut state, &[block.into()]);
        state
    }

    /// Padded second block: header bytes 64..80, terminator, bit length.
    pub fn tail_block(&self) -> [u32; BLOCK_WORDS] {
        let mut block = [0u32; BLOCK_WORDS];
        for (word, chunk) in block.iter_mut().zip(self.0[BLOCK_SIZE..].chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        block[4] = 0x8000_0000;
        block[15] = (HEADER_SIZE * 8) as u32;
        block
    }

    /// Reference SHA-256d of the header
    pub fn sha256d(&self) -> [u8; 32] {
        Sha256::digest(Sha256::digest(self.0)).into()
    }

    /// Reference SHA-256d with `nonce` substituted
    pub fn sha256d_with_nonce(&self, nonce: u32) -> [u8; 32] {
        self.with_nonce(nonce).sha256d()
    }

    pub fn meets(&self, nonce: u32, target: ShareTarget) -> bool {
        target.accepts_hash(&self.sha256d_with_nonce(nonce))
    }
}

/// The working set of one search: midstate, data block, secondary buffer
/// and the share target they are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Work {
    pub midstate: [u32; STATE_WORDS],
    pub data: [u32; BLOCK_WORDS],
    pub hash1: [u32; BLOCK_WORDS],
    pub target: ShareTarget,
}

impl Work {
    pub fn from_header(header: &BlockHeader, target: ShareTarget) -> Self {
        Self {
            midstate: header.midstate(),
            data: header.tail_block(),
            hash1: HASH1_PADDING,
            target,
        }
    }

    /// Nonce currently stored in the data block
    pub fn nonce(&self) -> u32 {
        self.data[NONCE_WORD]
    }

    pub fn midstate_bytes(&self) -> [u8; MIDSTATE_SIZE] {
        to_be_bytes(&self.midstate)
    }

    pub fn data_bytes(&self) -> [u8; BLOCK_SIZE] {
        to_be_bytes(&self.data)
    }

    pub fn hash1_bytes(&self) -> [u8; HASH1_SIZE] {
        to_be_bytes(&self.hash1)
    }
}

/// Big-endian words from `bytes`, which must be exactly `4 * N` long.
pub(crate) fn read_words<const N: usize>(
    buffer: &'static str,
    bytes: &[u8],
) -> Result<[u32; N], EngineError> {
    if bytes.len() != N * 4 {
        return Err(EngineError::InvalidLength {
            buffer,
            expected: N * 4,
            actual: bytes.len(),
        });
    }
    let mut words = [0u32; N];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(words)
}

fn to_be_bytes<const N: usize, const B: usize>(words: &[u32; N]) -> [u8; B] {
    debug_assert_eq!(N * 4, B);
    let mut bytes = [0u8; B];
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    bytes
}
