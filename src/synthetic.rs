/// Deterministic synthetic fallback generation
///
/// When every provider in a chain comes up empty the caller still gets a
/// usable value, synthesized from a pure function of the cache key: the key
/// is hashed to a seed and the seed drives a small deterministic number
/// generator. No I/O, no ambient state - the same key always produces the
/// same placeholder, which is what makes repeated degraded resolves stable
/// for the UI.
use sha2::{Digest, Sha256};

/// Derive the synthesis seed for a cache key (first 8 bytes of SHA-256).
pub fn seed_for_key(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Deterministic value sequence derived from a seed (splitmix64 steps).
pub struct SeedSequence {
    state: u64,
}

impl SeedSequence {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn for_key(key: &str) -> Self {
        Self::new(seed_for_key(key))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Uniform-ish value in `[lo, hi)`; `lo` when the range is empty.
    pub fn next_range(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_u64() % (hi - lo)
    }

    /// Value in `[lo, hi)` with two decimal places of resolution.
    pub fn next_f64(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        let span_cents = ((hi - lo) * 100.0) as u64;
        lo + self.next_range(0, span_cents.max(1)) as f64 / 100.0
    }
}

/// Types that can produce a deterministic placeholder for a cache key.
///
/// `synthesize` must be total and side-effect free. `placeholder` is the
/// last-ditch empty value used if `synthesize` itself turns out to be
/// defective (a programming bug, not an environment condition).
pub trait Synthesize: Sized {
    /// Deterministic placeholder derived from the key.
    fn synthesize(key: &str) -> Self;

    /// Explicitly-empty placeholder, independent of the key.
    fn placeholder() -> Self;
}

/// Build the synthetic value for a key.
///
/// A panic inside `synthesize` indicates a defect in the generator itself:
/// debug builds propagate it loudly, release builds degrade to the empty
/// placeholder so a view still renders.
pub fn synthesize_or_placeholder<T: Synthesize>(key: &str) -> T {
    if cfg!(debug_assertions) {
        return T::synthesize(key);
    }

    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| T::synthesize(key))) {
        Ok(value) => value,
        Err(_) => {
            crate::logger::error(
                crate::logger::LogTag::Chain,
                &format!("synthetic generator panicked for key {}, serving empty placeholder", key),
            );
            T::placeholder()
        }
    }
}

/// Short human-readable handle derived from an entity id, used in
/// synthesized display names ("Contractor ACME-001").
pub fn display_handle(id: &str) -> String {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        "UNKNOWN".to_string()
    } else {
        trimmed.to_uppercase()
    }
}
