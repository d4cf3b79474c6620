//! # Scanhash Core
//!
//! Parallel SHA-256d nonce search with a shared word algebra and
//! interchangeable compression kernels.
//!
//! ## Layout
//!
//! - [`word`]: the lane-wise 32-bit [`Word`] operations every kernel uses
//! - [`primitives`]: SSE2, AVX2 and NEON register backends
//! - [`kernel`]: the SHA-256d batch contract and its implementations
//! - [`engine`]: replicated midstate, nonce injection and the search loop
//! - [`dispatch`]: runtime kernel selection behind an object-safe scanner
//!
//! ## Buffers
//!
//! Work arrives as three big-endian buffers:
//!
//! ```text
//! midstate  32 bytes   state after the header's first 64 bytes
//! data      64 bytes   second block; nonce is word 3 (bytes 12..16)
//! hash1     64 bytes   words 8..16 hold the padding of a 32-byte message
//! ```
//!
//! A nonce passes when the top 32 bits of the SHA-256d result, read as a
//! little-endian 256-bit integer, are at most the [`ShareTarget`] ceiling.
//!
//! ## Example
//!
//! ```rust
//! use scanhash_core::{BlockHeader, HashEngine, ScalarKernel, ShareTarget, Work};
//!
//! let header = BlockHeader::new([0u8; 80]);
//! let work = Work::from_header(&header, ShareTarget::leading_zero_bits(4));
//!
//! let mut engine = HashEngine::new(ScalarKernel::new());
//! engine.prepare_work(&work);
//!
//! let mut nonce = 0;
//! if engine.find_nonce(&mut nonce).unwrap() {
//!     assert!(header.meets(nonce, work.target));
//! }
//! ```

pub mod dispatch;
pub mod engine;
mod error;
pub mod kernel;
mod params;
pub mod primitives;
pub mod word;
mod work;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use dispatch::{KernelKind, NonceScanner, best_scanner, new_scanner};
pub use engine::{HashEngine, NonceRange, ScanOutcome};
pub use error::EngineError;
pub use kernel::{Kernel, PortableKernel, ScalarKernel};
pub use params::*;
pub use word::{Lanes, Word};
pub use work::{BlockHeader, ShareTarget, Work};

#[cfg(target_arch = "x86_64")]
pub use kernel::{Avx2Kernel, Sse2Kernel};

#[cfg(target_arch = "aarch64")]
pub use kernel::NeonKernel;

#[cfg(test)]
mod tests;
