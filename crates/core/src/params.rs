//! SHA-256d search parameters
//!
//! Buffer geometry shared by the engine, the kernels and the work helpers.

/// Words in a SHA-256 state (midstate, IV, digest)
pub const STATE_WORDS: usize = 8;

/// Words in one SHA-256 message block
pub const BLOCK_WORDS: usize = 16;

/// Block size in bytes
pub const BLOCK_SIZE: usize = 64;

/// Midstate size in bytes
pub const MIDSTATE_SIZE: usize = STATE_WORDS * 4;

/// Secondary (`hash1`) buffer size in bytes
pub const HASH1_SIZE: usize = BLOCK_SIZE;

/// Kernel schedule layout: data block followed by the `hash1` block
pub const SCHEDULE_WORDS: usize = 2 * BLOCK_WORDS;

/// Index of the nonce inside the data block
pub const NONCE_WORD: usize = 3;

/// Size of the full block header the work helpers accept
pub const HEADER_SIZE: usize = 80;

/// One past the last nonce (`2^32`)
pub const NONCE_SPACE: u64 = 1 << 32;

/// Rounds in one SHA-256 compression
pub const ROUNDS: usize = 64;

/// Rounds needed before final word 7 of the second hash is known
pub const EARLY_ROUNDS: usize = 61;

/// SHA-256 initial hash value
pub const IV: [u32; STATE_WORDS] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// SHA-256 round constants
pub const K: [u32; ROUNDS] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Standard padding of the second hash application.
///
/// Words 0..8 are overwritten per lane by the first digest; the tail encodes
/// the `0x80` terminator and the 256-bit message length.
pub const HASH1_PADDING: [u32; BLOCK_WORDS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0x8000_0000, 0, 0, 0, 0, 0, 0, 0x0000_0100,
];
