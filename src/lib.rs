//! Scanhash Miner Library
//!
//! Multi-threaded SHA-256d nonce search on top of `scanhash-core`.
//!
//! # Overview
//!
//! The core engine is single-threaded and never blocks. This crate splits
//! the nonce space across worker threads, each owning its own engine, and
//! stops every worker once one of them reports a passing nonce.
//!
//! # Example
//!
//! ```rust
//! use scanhash::engine::{BlockHeader, KernelKind, NonceRange, ShareTarget, Work};
//! use scanhash::search::{search, SearchOptions};
//!
//! let header = BlockHeader::new([1u8; 80]);
//! let work = Work::from_header(&header, ShareTarget::leading_zero_bits(6));
//!
//! let options = SearchOptions {
//!     kind: KernelKind::Scalar,
//!     threads: 2,
//!     chunk_size: 256,
//!     report_interval: None,
//! };
//! let report = search(&work, NonceRange::new(0, 1 << 16).unwrap(), &options).unwrap();
//!
//! if let Some(nonce) = report.nonce {
//!     assert!(header.meets(nonce, work.target));
//! }
//! ```

// Re-export the search engine
pub use scanhash_core as engine;

pub mod config;
pub mod search;

// Convenience re-exports
pub use engine::{BlockHeader, HashEngine, KernelKind, NonceRange, ShareTarget, Work};
