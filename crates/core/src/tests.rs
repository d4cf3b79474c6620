//! Tests for the nonce search engine against the `sha2` reference

use crate::{
    BlockHeader, EngineError, HashEngine, KernelKind, Lanes, NonceRange, NonceScanner,
    PortableKernel, ScalarKernel, ScanOutcome, ShareTarget, Work, new_scanner,
};

/// Bitcoin genesis block header
const GENESIS_HEX: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

fn sample_header(seed: u8) -> BlockHeader {
    let mut bytes = [0u8; 80];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = (i as u8).wrapping_mul(31).wrapping_add(seed);
    }
    BlockHeader::new(bytes)
}

/// Lowest nonce in `[start, end)` that passes, by brute force.
fn reference_first(header: &BlockHeader, target: ShareTarget, start: u32, end: u64) -> Option<u32> {
    (u64::from(start)..end)
        .map(|n| n as u32)
        .find(|&n| header.meets(n, target))
}

fn reference_outcome(
    header: &BlockHeader,
    target: ShareTarget,
    start: u32,
    end: u64,
) -> ScanOutcome {
    match reference_first(header, target, start, end) {
        Some(nonce) => ScanOutcome::Found {
            nonce,
            hashes: u64::from(nonce - start) + 1,
        },
        None => ScanOutcome::Exhausted {
            hashes: end - u64::from(start),
        },
    }
}

fn scanners() -> Vec<Box<dyn NonceScanner>> {
    KernelKind::available()
        .into_iter()
        .map(|kind| new_scanner(kind).unwrap())
        .collect()
}

#[test]
fn test_genesis_nonce_found() {
    let header = BlockHeader::from_hex(GENESIS_HEX).unwrap();
    let winner = header.nonce();
    let work = Work::from_header(&header.with_nonce(0), ShareTarget::DIFFICULTY_ONE);

    for mut scanner in scanners() {
        scanner.prepare_work(&work);
        let range = NonceRange::new(winner - 1000, u64::from(winner) + 1000).unwrap();
        assert_eq!(
            scanner.scan(range).unwrap(),
            ScanOutcome::Found {
                nonce: winner,
                hashes: 1001
            },
            "{}",
            scanner.kernel_name()
        );

        let mut nonce = winner - 37;
        assert_eq!(scanner.find_nonce(&mut nonce), Ok(true));
        assert_eq!(nonce, winner);
    }
}

#[test]
fn test_first_passing_nonce_matches_reference() {
    let header = sample_header(0x17);
    let target = ShareTarget::leading_zero_bits(8);
    let expected = reference_outcome(&header, target, 0, 4096);

    let mut engine = HashEngine::new(ScalarKernel::new());
    engine.prepare_work(&Work::from_header(&header, target));
    assert_eq!(engine.scan(NonceRange::new(0, 4096).unwrap()).unwrap(), expected);

    // Nothing passes between the winner and the next reference hit.
    if let ScanOutcome::Found { nonce, .. } = expected {
        let next = reference_first(&header, target, nonce + 1, 1 << 16)
            .map_or(1 << 16, u64::from);
        let gap = NonceRange::new(nonce + 1, next).unwrap();
        assert_eq!(
            engine.scan(gap).unwrap(),
            ScanOutcome::Exhausted { hashes: gap.len() }
        );
    }
}

#[test]
fn test_all_kernels_agree_with_reference() {
    let target = ShareTarget::leading_zero_bits(6);
    // Unaligned starts and ends that cut through a batch.
    let ranges = [(0u32, 300u64), (5, 211), (1001, 1003), (77, 77)];

    for seed in [1u8, 2, 3] {
        let header = sample_header(seed);
        let work = Work::from_header(&header, target);

        for &(start, end) in &ranges {
            let expected = reference_outcome(&header, target, start, end);
            for mut scanner in scanners() {
                scanner.prepare_work(&work);
                let range = NonceRange::new(start, end).unwrap();
                assert_eq!(
                    scanner.scan(range).unwrap(),
                    expected,
                    "{} seed {} range {}..{}",
                    scanner.kernel_name(),
                    seed,
                    start,
                    end
                );
            }
        }
    }
}

#[test]
fn test_wide_portable_kernel_agrees() {
    let header = sample_header(9);
    let target = ShareTarget::leading_zero_bits(7);
    let expected = reference_outcome(&header, target, 3, 700);

    let mut engine = HashEngine::new(PortableKernel::<Lanes<16>>::new());
    engine.prepare_work(&Work::from_header(&header, target));
    assert_eq!(engine.scan(NonceRange::new(3, 700).unwrap()).unwrap(), expected);
}

#[test]
fn test_search_is_deterministic() {
    let work = Work::from_header(&sample_header(42), ShareTarget::leading_zero_bits(8));
    let range = NonceRange::new(100, 5000).unwrap();

    let mut engine = HashEngine::new(PortableKernel::<Lanes<4>>::new());
    engine.prepare_work(&work);
    let first = engine.scan(range).unwrap();
    let second = engine.scan(range).unwrap();
    assert_eq!(first, second);

    let mut fresh = HashEngine::new(PortableKernel::<Lanes<4>>::new());
    fresh.prepare_work(&work);
    assert_eq!(fresh.scan(range).unwrap(), first);
}

#[test]
fn test_prepare_data_matches_prepare_work() {
    let work = Work::from_header(&sample_header(5), ShareTarget::leading_zero_bits(7));
    let range = NonceRange::new(0, 2000).unwrap();

    let mut typed = HashEngine::new(PortableKernel::<Lanes<8>>::new());
    typed.prepare_work(&work);

    let mut raw = HashEngine::new(PortableKernel::<Lanes<8>>::new());
    raw.prepare_data(
        &work.midstate_bytes(),
        &work.data_bytes(),
        &work.hash1_bytes(),
        work.target,
    )
    .unwrap();

    assert_eq!(typed.scan(range).unwrap(), raw.scan(range).unwrap());
}

#[test]
fn test_prepare_replaces_previous_work() {
    let first = Work::from_header(&sample_header(10), ShareTarget::leading_zero_bits(7));
    let second = Work::from_header(&sample_header(11), ShareTarget::leading_zero_bits(7));
    let range = NonceRange::new(0, 3000).unwrap();

    let mut reused = HashEngine::new(ScalarKernel::new());
    reused.prepare_work(&first);
    reused.scan(range).unwrap();
    reused.prepare_work(&second);

    let mut fresh = HashEngine::new(ScalarKernel::new());
    fresh.prepare_work(&second);

    assert_eq!(reused.scan(range).unwrap(), fresh.scan(range).unwrap());
}

#[test]
fn test_failed_prepare_keeps_previous_work() {
    let work = Work::from_header(&sample_header(12), ShareTarget::leading_zero_bits(6));
    let range = NonceRange::new(0, 1000).unwrap();

    let mut engine = HashEngine::new(PortableKernel::<Lanes<4>>::new());
    engine.prepare_work(&work);
    let before = engine.scan(range).unwrap();

    let err = engine.prepare_data(&[0u8; 32], &[0u8; 63], &[0u8; 64], ShareTarget::DIFFICULTY_ONE);
    assert!(matches!(err, Err(EngineError::InvalidLength { buffer: "data", .. })));
    assert_eq!(engine.scan(range).unwrap(), before);
}

#[test]
fn test_end_of_nonce_space() {
    let header = sample_header(13);

    // Everything passes: the first candidate wins, even at the very top.
    let mut engine = HashEngine::new(PortableKernel::<Lanes<8>>::new());
    engine.prepare_work(&Work::from_header(&header, ShareTarget::from_ceiling(u32::MAX)));
    let mut nonce = u32::MAX;
    assert_eq!(engine.find_nonce(&mut nonce), Ok(true));
    assert_eq!(nonce, u32::MAX);

    // Top five nonces under a target none of them meets.
    let target = ShareTarget::leading_zero_bits(32);
    let start = u32::MAX - 4;
    assert_eq!(reference_first(&header, target, start, 1 << 32), None);

    for mut scanner in scanners() {
        scanner.prepare_work(&Work::from_header(&header, target));
        let mut nonce = start;
        assert_eq!(scanner.find_nonce(&mut nonce), Ok(false), "{}", scanner.kernel_name());
        assert_eq!(nonce, start);
        assert_eq!(
            scanner.scan(NonceRange::from_start(start)).unwrap(),
            ScanOutcome::Exhausted { hashes: 5 }
        );
    }
}

#[test]
fn test_found_nonce_verifies() {
    let header = sample_header(77);
    let target = ShareTarget::leading_zero_bits(10);

    let mut engine = HashEngine::new(ScalarKernel::new());
    engine.prepare_work(&Work::from_header(&header, target));

    let mut nonce = 0;
    assert_eq!(engine.find_nonce(&mut nonce), Ok(true));
    assert!(header.meets(nonce, target));
    assert!(target.accepts_hash(&header.sha256d_with_nonce(nonce)));
}
