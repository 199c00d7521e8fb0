//! One-time initialization of the cryptographic primitive layer.
//!
//! The suites are pure functions and work without calling [`initialize`].
//! A host that wants to fail fast at startup (no entropy, a broken build of a
//! primitive) calls it once; concurrent and repeated calls are safe and all
//! observe the same [`Provider`].

use std::sync::{Mutex, OnceLock, PoisonError};

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::pae::PreAuthEncoded;
use crate::core::version::Version;

static PROVIDER: OnceLock<Provider> = OnceLock::new();

/// Held while the self check runs, so first callers run it once between them.
static INIT_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
static SELF_CHECK_RUNS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

/// `PAE(["Paragon"])`
const PAE_KNOWN_ANSWER: [u8; 23] = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x50, 0x61, 0x72, 0x61, 0x67, 0x6f, 0x6e,
];

/// Description of the primitive layer registered for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    suites: Vec<Version>,
}

impl Provider {
    fn detect() -> Self {
        let suites = Version::ALL
            .into_iter()
            .filter(|version| suite_enabled(*version))
            .collect();
        Self { suites }
    }

    /// Versions whose suites are compiled into this build.
    #[must_use]
    pub fn suites(&self) -> &[Version] {
        &self.suites
    }

    /// Whether the suite for `version` is available.
    #[must_use]
    pub fn supports(&self, version: Version) -> bool {
        self.suites.contains(&version)
    }
}

const fn suite_enabled(version: Version) -> bool {
    match version {
        Version::V1 => cfg!(feature = "v1"),
        Version::V2 => cfg!(feature = "v2"),
        Version::V3 => cfg!(feature = "v3"),
        Version::V4 => cfg!(feature = "v4"),
    }
}

/// Registers the primitive provider for this process.
///
/// Runs a PAE known-answer check and an entropy probe until one call
/// succeeds; later calls return the registered provider immediately.
/// Concurrent first callers wait for a single check instead of each
/// running their own.
///
/// # Errors
///
/// Returns `PasetoError::CryptoError` if a self check fails. Nothing is
/// registered in that case and a later call retries.
pub fn initialize() -> PasetoResult<&'static Provider> {
    if let Some(provider) = PROVIDER.get() {
        return Ok(provider);
    }

    let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(provider) = PROVIDER.get() {
        return Ok(provider);
    }

    self_check()?;

    let provider = PROVIDER.get_or_init(|| {
        let provider = Provider::detect();
        tracing::debug!(suites = ?provider.suites, "registered PASETO primitive provider");
        provider
    });
    Ok(provider)
}

/// Whether [`initialize`] has completed successfully in this process.
#[must_use]
pub fn is_initialized() -> bool {
    PROVIDER.get().is_some()
}

/// Fills an array from the OS entropy source.
pub(crate) fn random_bytes<const N: usize>() -> PasetoResult<[u8; N]> {
    use rand_core::{OsRng, TryRngCore};

    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| PasetoError::CryptoError)?;
    Ok(bytes)
}

fn self_check() -> PasetoResult<()> {
    #[cfg(test)]
    SELF_CHECK_RUNS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    if PreAuthEncoded::encode(&[b"Paragon".as_slice()]).as_bytes() != PAE_KNOWN_ANSWER {
        tracing::debug!("PAE known-answer check failed");
        return Err(PasetoError::CryptoError);
    }

    let probe = random_bytes::<32>()?;
    if probe.iter().all(|b| *b == 0) {
        tracing::debug!("entropy probe returned all zeros");
        return Err(PasetoError::CryptoError);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() -> PasetoResult<()> {
        let first = initialize()?;
        let second = initialize()?;
        assert!(std::ptr::eq(first, second));
        assert!(is_initialized());
        Ok(())
    }

    #[test]
    fn test_initialize_concurrently() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| initialize().map(|p| p as *const Provider as usize)))
            .collect();

        let addresses: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked").expect("initialize failed"))
            .collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_self_check_runs_once() {
        let barrier = std::sync::Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let barrier = std::sync::Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    initialize().map(|_| ())
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked").expect("initialize failed");
        }
        assert!(initialize().is_ok());
        assert_eq!(SELF_CHECK_RUNS.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reports_compiled_suites() -> PasetoResult<()> {
        let provider = initialize()?;
        for version in Version::ALL {
            assert_eq!(provider.supports(version), suite_enabled(version));
        }
        assert!(provider.suites().len() <= 4);
        Ok(())
    }
}
