//! Seed resolution and scoped use of a shared random generator.
//!
//! Every evaluation in this crate draws from its own [`StdRng`] seeded from the
//! configuration, so nothing outside the evaluation observes its draws. Hosts that keep a
//! single process-wide generator (the way many engines expose one) can wrap it in
//! [`AmbientRng`] and use [`AmbientRng::scope`]: the scope reseeds the generator for the
//! duration of one evaluation and puts the previous state back when it is dropped, including
//! during unwinding.
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

const IDENTITY_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derives a non-zero seed from an owner identity.
pub fn seed_for_identity(identity: u64) -> u64 {
    mix_u64(identity ^ IDENTITY_SALT).max(1)
}

/// Returns `seed` unless it is the `0` sentinel, in which case the seed is derived from
/// `identity`.
pub fn resolve_seed(seed: u64, identity: u64) -> u64 {
    if seed == 0 {
        seed_for_identity(identity)
    } else {
        seed
    }
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

/// A generator shared by unrelated random consumers.
#[derive(Debug, Clone)]
pub struct AmbientRng {
    rng: StdRng,
}

impl AmbientRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reseeds the shared generator with `seed` until the returned scope is dropped.
    pub fn scope(&mut self, seed: u64) -> RngScope<'_> {
        let saved = std::mem::replace(&mut self.rng, StdRng::seed_from_u64(seed));
        RngScope {
            ambient: self,
            saved,
        }
    }
}

impl RngCore for AmbientRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }
}

/// Exclusive, reseeded access to an [`AmbientRng`]. Restores the prior state on drop.
pub struct RngScope<'a> {
    ambient: &'a mut AmbientRng,
    saved: StdRng,
}

impl RngCore for RngScope<'_> {
    fn next_u32(&mut self) -> u32 {
        self.ambient.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.ambient.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.ambient.rng.fill_bytes(dest);
    }
}

impl Drop for RngScope<'_> {
    fn drop(&mut self) {
        std::mem::swap(&mut self.ambient.rng, &mut self.saved);
    }
}
