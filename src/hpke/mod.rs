//! # HPKE sealing (RFC 9180, base mode)
//!
//! Single-shot hybrid encryption to a recipient public key: a KEM
//! encapsulation, the RFC 9180 key schedule, and one AEAD seal. The
//! sender context is consumed by [`SenderContext::seal`], so a context can
//! never seal twice -- a second message needs a fresh setup.
//!
//! ## Usage
//!
//! ```
//!     use actd::hpke::{generate_keypair, AeadId, KdfId, KemId, RecipientContext, SenderContext, Suite};
//!
//!     let suite = Suite::new(KemId::X25519HkdfSha256, KdfId::HkdfSha256, AeadId::Aes128Gcm);
//!     let (recipient_public, recipient_secret) = generate_keypair();
//!
//!     let sender = SenderContext::setup(suite, &recipient_public, b"session info").unwrap();
//!     let wire = sender.seal(b"aad", b"attack at dawn").unwrap();
//!
//!     // wire is encapsulated_key || ciphertext
//!     let (enc, ciphertext) = wire.split_at(suite.encapsulated_key_len());
//!     let recipient = RecipientContext::setup(suite, recipient_secret.as_ref(), enc, b"session info").unwrap();
//!     let plaintext = recipient.open(b"aad", ciphertext).unwrap();
//!     assert_eq!(plaintext, b"attack at dawn");
//! ```

use thiserror::Error;

pub mod context;
pub mod suite;
mod util;

pub use context::{generate_keypair, RecipientContext, SenderContext};
pub use suite::{AeadId, KdfId, KemId, Suite};

/// HPKE failures. Setup problems (algorithms, key material) are distinct
/// from seal/open problems so a caller can tell a misconfigured context
/// from a failed AEAD operation.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HpkeError {
    /// An algorithm identifier names no supported algorithm
    #[error("unsupported algorithm identifier {0:#06x}")]
    UnsupportedAlgorithm(u16),

    /// A public or secret key had the wrong length for the KEM
    #[error("key must be {expected} bytes, got {got}")]
    KeyLength { expected: usize, got: usize },

    /// A keypair derivation seed had the wrong length
    #[error("keypair seed must be {expected} bytes, got {got}")]
    SeedLength { expected: usize, got: usize },

    /// The Diffie-Hellman result was not contributory (all-zero shared
    /// secret, low-order peer point)
    #[error("peer public key is not contributory")]
    NonContributoryKey,

    /// The key schedule could not be derived
    #[error("key schedule failure")]
    KeySchedule,

    /// The AEAD refused to seal
    #[error("sealing failed")]
    Seal,

    /// The AEAD rejected the ciphertext
    #[error("opening failed")]
    Open,
}
