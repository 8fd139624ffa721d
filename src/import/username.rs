//! Username resolution: derive a unique handle from a seed value.

use crate::error::{StoreError, StoreResult};
use crate::store::AccountStore;

/// Upper bound on suffix probes. Unreachable on the success path; it
/// only turns a misbehaving oracle into a row-local failure instead of
/// an unbounded loop.
pub const MAX_USERNAME_PROBES: u32 = 1_000_000;

/// Derive a globally unique handle from a seed (typically the row's name
/// or email value).
///
/// The candidate is the lowercased seed. If taken, an increasing integer
/// suffix (1, 2, 3, ...) is appended and re-probed until the oracle
/// reports a free handle. Deterministic for a fixed oracle state, and
/// never returns a handle the oracle considers taken at call time.
pub fn resolve_username(store: &dyn AccountStore, seed: &str) -> StoreResult<String> {
    let base = seed.to_lowercase();

    if !store.username_exists(&base)? {
        return Ok(base);
    }

    for suffix in 1..=MAX_USERNAME_PROBES {
        let candidate = format!("{base}{suffix}");
        if !store.username_exists(&candidate)? {
            return Ok(candidate);
        }
    }

    Err(StoreError::UsernameExhausted {
        seed: base,
        attempts: MAX_USERNAME_PROBES,
    })
}
