//! C FFI bindings for host miners
//!
//! A host keeps one handle per worker thread, prepares it with raw buffers
//! and calls `scanhash_scan` on bounded chunks of the range it owns,
//! checking its own stop flag between calls. `scanhash_find_nonce` runs to
//! the end of the nonce space in one call.

use core::slice;

use crate::dispatch::{KernelKind, NonceScanner, best_scanner, new_scanner};
use crate::engine::{NonceRange, ScanOutcome};
use crate::error::EngineError;
use crate::params::{BLOCK_SIZE, HASH1_SIZE, MIDSTATE_SIZE};
use crate::work::ShareTarget;

/// Opaque engine handle for FFI
pub struct ScanHandle {
    inner: Box<dyn NonceScanner>,
}

/// Status codes returned by the FFI functions
pub const SCANHASH_OK: i32 = 0;
pub const SCANHASH_FOUND: i32 = 1;
pub const SCANHASH_ERR_NULL: i32 = -1;
pub const SCANHASH_ERR_LENGTH: i32 = -2;
pub const SCANHASH_ERR_NOT_PREPARED: i32 = -3;
pub const SCANHASH_ERR_OTHER: i32 = -4;
pub const SCANHASH_ERR_RANGE: i32 = -5;

fn status(err: &EngineError) -> i32 {
    match err {
        EngineError::InvalidLength { .. } => SCANHASH_ERR_LENGTH,
        EngineError::NotPrepared => SCANHASH_ERR_NOT_PREPARED,
        EngineError::InvalidRange { .. } => SCANHASH_ERR_RANGE,
        _ => SCANHASH_ERR_OTHER,
    }
}

/// Create a new engine.
///
/// `kernel` indexes `KernelKind::ALL` plus one; 0 picks the best kernel for
/// this CPU. Returns null if the kernel is unknown or unsupported. Free the
/// handle with `scanhash_free`.
#[unsafe(no_mangle)]
pub extern "C" fn scanhash_new(kernel: u32) -> *mut ScanHandle {
    let inner = match kernel {
        0 => best_scanner(),
        n => match KernelKind::ALL.get(n as usize - 1).map(|&kind| new_scanner(kind)) {
            Some(Ok(scanner)) => scanner,
            _ => return core::ptr::null_mut(),
        },
    };
    Box::into_raw(Box::new(ScanHandle { inner }))
}

/// Free an engine handle.
///
/// # Safety
///
/// `handle` must be null or a pointer returned by `scanhash_new` that has not
/// been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn scanhash_free(handle: *mut ScanHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle);
        }
    }
}

/// Load a work unit into the engine.
/// - midstate: 32 bytes
/// - data: 64 bytes, nonce at bytes 12..16
/// - hash1: 64 bytes
/// - target: ceiling on the top 32 bits of the result
///
/// Returns `SCANHASH_OK` or a negative status. On error the previous work
/// unit stays loaded.
///
/// # Safety
///
/// `handle` must come from `scanhash_new`. The buffers must be valid for
/// reads of their stated sizes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn scanhash_prepare(
    handle: *mut ScanHandle,
    midstate: *const u8,
    data: *const u8,
    hash1: *const u8,
    target: u32,
) -> i32 {
    if handle.is_null() || midstate.is_null() || data.is_null() || hash1.is_null() {
        return SCANHASH_ERR_NULL;
    }

    unsafe {
        let handle = &mut *handle;
        let midstate = slice::from_raw_parts(midstate, MIDSTATE_SIZE);
        let data = slice::from_raw_parts(data, BLOCK_SIZE);
        let hash1 = slice::from_raw_parts(hash1, HASH1_SIZE);

        match handle
            .inner
            .prepare_data(midstate, data, hash1, ShareTarget::from_ceiling(target))
        {
            Ok(()) => SCANHASH_OK,
            Err(err) => status(&err),
        }
    }
}

/// Search from `*nonce` to the end of the nonce space.
///
/// Returns `SCANHASH_FOUND` with the winning nonce written to `*nonce`,
/// `SCANHASH_OK` if nothing passed (`*nonce` unchanged), or a negative
/// status.
///
/// # Safety
///
/// `handle` must come from `scanhash_new`; `nonce` must be valid for reads
/// and writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn scanhash_find_nonce(handle: *mut ScanHandle, nonce: *mut u32) -> i32 {
    if handle.is_null() || nonce.is_null() {
        return SCANHASH_ERR_NULL;
    }

    unsafe {
        let handle = &mut *handle;
        match handle.inner.find_nonce(&mut *nonce) {
            Ok(true) => SCANHASH_FOUND,
            Ok(false) => SCANHASH_OK,
            Err(err) => status(&err),
        }
    }
}

/// Search the half-open range `[start, end)` with `end <= 2^32`.
///
/// Returns `SCANHASH_FOUND` with the lowest passing nonce written to
/// `*nonce_out`, `SCANHASH_OK` if nothing in the range passed, or a negative
/// status. `*hashes_out` receives the number of nonces evaluated on both
/// success paths. `hashes_out` may be null.
///
/// # Safety
///
/// `handle` must come from `scanhash_new`; `nonce_out` must be valid for
/// writes and `hashes_out` null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn scanhash_scan(
    handle: *mut ScanHandle,
    start: u32,
    end: u64,
    nonce_out: *mut u32,
    hashes_out: *mut u64,
) -> i32 {
    if handle.is_null() || nonce_out.is_null() {
        return SCANHASH_ERR_NULL;
    }

    let range = match NonceRange::new(start, end) {
        Ok(range) => range,
        Err(err) => return status(&err),
    };

    unsafe {
        let handle = &mut *handle;
        let outcome = match handle.inner.scan(range) {
            Ok(outcome) => outcome,
            Err(err) => return status(&err),
        };

        if !hashes_out.is_null() {
            *hashes_out = outcome.hashes();
        }
        match outcome {
            ScanOutcome::Found { nonce, .. } => {
                *nonce_out = nonce;
                SCANHASH_FOUND
            }
            ScanOutcome::Exhausted { .. } => SCANHASH_OK,
        }
    }
}

/// Nonces evaluated per kernel call, 0 for a null handle.
///
/// # Safety
///
/// `handle` must be null or come from `scanhash_new`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn scanhash_lanes(handle: *const ScanHandle) -> u32 {
    if handle.is_null() {
        return 0;
    }
    unsafe { (*handle).inner.lanes() as u32 }
}
