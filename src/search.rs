//! Multi-threaded nonce search
//!
//! The range is split into one contiguous slice per worker. Each worker owns
//! an engine and walks its slice in bounded chunks, checking a shared stop
//! flag between chunks.

use anyhow::{bail, Result};
use log::info;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::engine::{new_scanner, EngineError, KernelKind, NonceRange, Work};

/// How a search is run
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub kind: KernelKind,
    pub threads: usize,
    /// Nonces per engine call between stop checks
    pub chunk_size: u32,
    /// Log progress at this interval
    pub report_interval: Option<Duration>,
}

/// Result of a search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchReport {
    /// Lowest passing nonce among those found before the workers stopped
    pub nonce: Option<u32>,
    /// Nonces evaluated across all workers
    pub hashes: u64,
    pub elapsed: Duration,
}

impl SearchReport {
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.hashes as f64 / secs
        } else {
            0.0
        }
    }
}

const NOT_FOUND: u64 = u64::MAX;

/// Search `range` for a nonce passing `work.target`.
pub fn search(work: &Work, range: NonceRange, options: &SearchOptions) -> Result<SearchReport> {
    if !options.kind.is_available() {
        bail!("Kernel {} is not supported on this CPU", options.kind);
    }
    if options.chunk_size == 0 {
        bail!("Chunk size must be positive");
    }

    let parts = range.split(options.threads.max(1));
    info!(
        "Searching {:#010x}..{:#x} with {} {} workers",
        range.start(),
        range.end(),
        parts.len(),
        options.kind
    );

    // Shared state for workers
    let total_hashes = Arc::new(AtomicU64::new(0));
    let found = Arc::new(AtomicU64::new(NOT_FOUND));
    let stop = Arc::new(AtomicBool::new(false));

    let start = Instant::now();

    let mut handles = Vec::with_capacity(parts.len());
    for part in parts {
        let work = *work;
        let kind = options.kind;
        let chunk = u64::from(options.chunk_size);
        let total_hashes = Arc::clone(&total_hashes);
        let found = Arc::clone(&found);
        let stop = Arc::clone(&stop);

        let handle = thread::spawn(move || -> Result<(), EngineError> {
            let mut scanner = new_scanner(kind)?;
            scanner.prepare_work(&work);

            let mut next = u64::from(part.start());
            while next < part.end() && !stop.load(Ordering::Relaxed) {
                let end = (next + chunk).min(part.end());
                let outcome = scanner.scan(NonceRange::new(next as u32, end)?)?;
                total_hashes.fetch_add(outcome.hashes(), Ordering::Relaxed);

                if let Some(nonce) = outcome.nonce() {
                    found.fetch_min(u64::from(nonce), Ordering::SeqCst);
                    stop.store(true, Ordering::SeqCst);
                    break;
                }
                next = end;
            }
            Ok(())
        });
        handles.push(handle);
    }

    // Monitor progress while workers run
    if let Some(interval) = options.report_interval {
        let mut last_report = Instant::now();
        while !handles.iter().all(|h| h.is_finished()) {
            thread::sleep(Duration::from_millis(50));
            if last_report.elapsed() >= interval {
                let hashes = total_hashes.load(Ordering::Relaxed);
                let elapsed = start.elapsed().as_secs_f64();
                info!(
                    "Hashrate: {:.0} H/s | Hashes: {} | Time: {:.0}s",
                    hashes as f64 / elapsed,
                    hashes,
                    elapsed
                );
                last_report = Instant::now();
            }
        }
    }

    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => bail!("Search worker panicked"),
        }
    }

    let nonce = match found.load(Ordering::SeqCst) {
        NOT_FOUND => None,
        n => Some(n as u32),
    };

    Ok(SearchReport {
        nonce,
        hashes: total_hashes.load(Ordering::Relaxed),
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BlockHeader, ShareTarget};

    fn options(kind: KernelKind, threads: usize, chunk_size: u32) -> SearchOptions {
        SearchOptions {
            kind,
            threads,
            chunk_size,
            report_interval: None,
        }
    }

    #[test]
    fn test_parallel_search_finds_valid_nonce() {
        let header = BlockHeader::new([3u8; 80]);
        let target = ShareTarget::leading_zero_bits(8);
        let work = Work::from_header(&header, target);
        let range = NonceRange::new(0, 1 << 16).unwrap();

        let report = search(&work, range, &options(KernelKind::Portable4, 4, 512)).unwrap();
        let nonce = report.nonce.expect("8-bit target over 65536 nonces");
        assert!(header.meets(nonce, target));
        assert!(report.hashes > 0);
    }

    #[test]
    fn test_single_worker_returns_lowest() {
        let header = BlockHeader::new([4u8; 80]);
        let target = ShareTarget::leading_zero_bits(7);
        let work = Work::from_header(&header, target);

        let expected = (0u32..1 << 14).find(|&n| header.meets(n, target));
        let report = search(
            &work,
            NonceRange::new(0, 1 << 14).unwrap(),
            &options(KernelKind::Scalar, 1, 100),
        )
        .unwrap();
        assert_eq!(report.nonce, expected);
        if let Some(nonce) = expected {
            assert_eq!(report.hashes, u64::from(nonce) + 1);
        }
    }

    #[test]
    fn test_exhausted_search_covers_range() {
        let work = Work::from_header(&BlockHeader::new([5u8; 80]), ShareTarget::DIFFICULTY_ONE);
        let range = NonceRange::new(1000, 3000).unwrap();

        let report = search(&work, range, &options(KernelKind::Portable8, 3, 128)).unwrap();
        assert_eq!(report.nonce, None);
        assert_eq!(report.hashes, 2000);
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let work = Work::from_header(&BlockHeader::new([0u8; 80]), ShareTarget::DIFFICULTY_ONE);
        assert!(search(&work, NonceRange::full(), &options(KernelKind::Scalar, 1, 0)).is_err());
    }
}
