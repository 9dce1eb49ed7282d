//! Noise seed derivation.
//!
//! A seed binds every spoofed value to the browsing context that
//! observes it. Derivation is keyed hashing, never raw identity
//! arithmetic: context ids are small sequential integers and must not
//! map onto guessable noise streams.
//!
//! # Session salt
//!
//! Each deriver carries a salt mixed into every seed. A fresh salt per
//! browser session makes spoofed fingerprints unlinkable across
//! sessions while staying stable within one; a persisted salt pins a
//! stable spoofed identity to a stored profile.

use blake3::Hasher;

use crate::context::ContextId;

/// Domain separator for seed derivation.
/// Ensures the hash context is distinct from other uses.
const SEED_DOMAIN: &[u8] = b"fingerprint-shield-seed-v1";

/// Hashed in place of an id for null-context operations.
const NULL_CONTEXT_TAG: [u8; 8] = [0xff; 8];

/// A 32-bit seed fixing one deterministic noise stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseSeed(u32);

impl NoiseSeed {
    /// Wraps a raw seed value.
    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw 32-bit value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Derives per-context noise seeds.
#[derive(Debug, Clone)]
pub struct SeedDeriver {
    salt: [u8; 16],
}

impl SeedDeriver {
    /// Creates a deriver with an explicit session salt.
    pub fn new(salt: [u8; 16]) -> Self {
        Self { salt }
    }

    /// Derives a seed from a context identity alone.
    pub fn derive(&self, ctx: Option<ContextId>) -> NoiseSeed {
        self.derive_with(ctx, &[])
    }

    /// Derives a seed from a context identity plus extra bytes,
    /// typically a sample of the buffer being protected so that
    /// identical content re-noises identically.
    pub fn derive_with(&self, ctx: Option<ContextId>, extra: &[u8]) -> NoiseSeed {
        let mut hasher = Hasher::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(&self.salt);
        match ctx {
            Some(id) => {
                hasher.update(&id.as_u64().to_le_bytes());
            }
            None => {
                hasher.update(&NULL_CONTEXT_TAG);
            }
        }
        hasher.update(extra);

        let digest = hasher.finalize();
        let mut word = [0u8; 4];
        word.copy_from_slice(&digest.as_bytes()[..4]);

        NoiseSeed(u32::from_le_bytes(word))
    }
}
