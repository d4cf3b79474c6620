//! Kernel selection at runtime
//!
//! [`HashEngine`] is generic over its kernel. Callers that pick a kernel
//! from the command line or from the host CPU go through [`KernelKind`] and
//! the object-safe [`NonceScanner`] instead.

use core::fmt;
use core::str::FromStr;

use log::info;

use crate::engine::{HashEngine, NonceRange, ScanOutcome};
use crate::error::EngineError;
use crate::kernel::{Kernel, PortableKernel, ScalarKernel};
use crate::word::Lanes;
use crate::work::{ShareTarget, Work};

/// Kernels this crate can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// One nonce per call, plain `u32` arithmetic
    Scalar,
    /// Four portable lanes
    Portable4,
    /// Eight portable lanes
    Portable8,
    /// Four SSE2 lanes (x86_64)
    Sse2,
    /// Eight AVX2 lanes (x86_64, runtime detected)
    Avx2,
    /// Four NEON lanes (aarch64)
    Neon,
}

impl KernelKind {
    pub const ALL: [KernelKind; 6] = [
        KernelKind::Scalar,
        KernelKind::Portable4,
        KernelKind::Portable8,
        KernelKind::Sse2,
        KernelKind::Avx2,
        KernelKind::Neon,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            KernelKind::Scalar => "scalar",
            KernelKind::Portable4 => "portable4",
            KernelKind::Portable8 => "portable8",
            KernelKind::Sse2 => "sse2",
            KernelKind::Avx2 => "avx2",
            KernelKind::Neon => "neon",
        }
    }

    pub const fn lanes(self) -> usize {
        match self {
            KernelKind::Scalar => 1,
            KernelKind::Portable4 | KernelKind::Sse2 | KernelKind::Neon => 4,
            KernelKind::Portable8 | KernelKind::Avx2 => 8,
        }
    }

    /// Whether this kernel can run on the current machine.
    pub fn is_available(self) -> bool {
        match self {
            KernelKind::Scalar | KernelKind::Portable4 | KernelKind::Portable8 => true,
            KernelKind::Sse2 => cfg!(target_arch = "x86_64"),
            KernelKind::Neon => cfg!(target_arch = "aarch64"),
            #[cfg(target_arch = "x86_64")]
            KernelKind::Avx2 => crate::kernel::Avx2Kernel::detect().is_some(),
            #[cfg(not(target_arch = "x86_64"))]
            KernelKind::Avx2 => false,
        }
    }

    /// Kernels usable on this machine, in declaration order.
    pub fn available() -> Vec<KernelKind> {
        Self::ALL.into_iter().filter(|kind| kind.is_available()).collect()
    }

    /// Widest kernel the current CPU supports.
    pub fn best() -> KernelKind {
        [KernelKind::Avx2, KernelKind::Sse2, KernelKind::Neon]
            .into_iter()
            .find(|kind| kind.is_available())
            .unwrap_or(KernelKind::Portable8)
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or(EngineError::UnknownKernel(s))
    }
}

/// Object-safe view of a [`HashEngine`], independent of its kernel type.
pub trait NonceScanner: Send {
    fn kernel_name(&self) -> &'static str;

    fn lanes(&self) -> usize;

    fn prepare_data(
        &mut self,
        midstate: &[u8],
        data: &[u8],
        hash1: &[u8],
        target: ShareTarget,
    ) -> Result<(), EngineError>;

    fn prepare_work(&mut self, work: &Work);

    fn scan(&mut self, range: NonceRange) -> Result<ScanOutcome, EngineError>;

    fn find_nonce(&mut self, nonce: &mut u32) -> Result<bool, EngineError>;
}

impl<K> NonceScanner for HashEngine<K>
where
    K: Kernel + Send,
    K::Word: Send,
{
    fn kernel_name(&self) -> &'static str {
        self.kernel().name()
    }

    fn lanes(&self) -> usize {
        HashEngine::lanes(self)
    }

    fn prepare_data(
        &mut self,
        midstate: &[u8],
        data: &[u8],
        hash1: &[u8],
        target: ShareTarget,
    ) -> Result<(), EngineError> {
        HashEngine::prepare_data(self, midstate, data, hash1, target)
    }

    fn prepare_work(&mut self, work: &Work) {
        HashEngine::prepare_work(self, work)
    }

    fn scan(&mut self, range: NonceRange) -> Result<ScanOutcome, EngineError> {
        HashEngine::scan(self, range)
    }

    fn find_nonce(&mut self, nonce: &mut u32) -> Result<bool, EngineError> {
        HashEngine::find_nonce(self, nonce)
    }
}

/// Build an engine for `kind`.
pub fn new_scanner(kind: KernelKind) -> Result<Box<dyn NonceScanner>, EngineError> {
    let scanner: Box<dyn NonceScanner> = match kind {
        KernelKind::Scalar => Box::new(HashEngine::new(ScalarKernel::new())),
        KernelKind::Portable4 => Box::new(HashEngine::new(PortableKernel::<Lanes<4>>::new())),
        KernelKind::Portable8 => Box::new(HashEngine::new(PortableKernel::<Lanes<8>>::new())),
        #[cfg(target_arch = "x86_64")]
        KernelKind::Sse2 => Box::new(HashEngine::new(crate::kernel::Sse2Kernel::new())),
        #[cfg(target_arch = "x86_64")]
        KernelKind::Avx2 => match crate::kernel::Avx2Kernel::detect() {
            Some(kernel) => Box::new(HashEngine::new(kernel)),
            None => return Err(EngineError::Unsupported(kind.name())),
        },
        #[cfg(target_arch = "aarch64")]
        KernelKind::Neon => Box::new(HashEngine::new(crate::kernel::NeonKernel::new())),
        #[allow(unreachable_patterns)]
        _ => return Err(EngineError::Unsupported(kind.name())),
    };
    info!("Using {} kernel ({} lanes)", kind, kind.lanes());
    Ok(scanner)
}

/// Engine over [`KernelKind::best`].
pub fn best_scanner() -> Box<dyn NonceScanner> {
    let kind = KernelKind::best();
    match new_scanner(kind) {
        Ok(scanner) => scanner,
        Err(_) => Box::new(HashEngine::new(PortableKernel::<Lanes<8>>::new())),
    }
}
