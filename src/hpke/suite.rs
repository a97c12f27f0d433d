//! Algorithm identifiers and the cipher suite they form.
//!
//! The identifiers are the IANA-registered HPKE code points. Descriptors
//! are plain `Copy` values, fixed at process start and shared freely;
//! nothing here is rebuilt per call.

use aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::ChaCha20Poly1305;

use super::HpkeError;

/// Key encapsulation mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KemId {
    /// DHKEM(X25519, HKDF-SHA256)
    X25519HkdfSha256,
}

impl KemId {
    pub const fn id(self) -> u16 {
        0x0020
    }

    pub fn from_id(id: u16) -> Result<Self, HpkeError> {
        match id {
            0x0020 => Ok(Self::X25519HkdfSha256),
            other => Err(HpkeError::UnsupportedAlgorithm(other)),
        }
    }

    /// Length of an encapsulated or public key
    pub const fn key_len(self) -> usize {
        32
    }

    /// Length of a keypair derivation seed
    pub const fn seed_len(self) -> usize {
        32
    }
}

/// Key derivation functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfId {
    HkdfSha256,
}

impl KdfId {
    pub const fn id(self) -> u16 {
        0x0001
    }

    pub fn from_id(id: u16) -> Result<Self, HpkeError> {
        match id {
            0x0001 => Ok(Self::HkdfSha256),
            other => Err(HpkeError::UnsupportedAlgorithm(other)),
        }
    }
}

/// Authenticated ciphers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadId {
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl AeadId {
    pub const fn id(self) -> u16 {
        match self {
            Self::Aes128Gcm => 0x0001,
            Self::Aes256Gcm => 0x0002,
            Self::ChaCha20Poly1305 => 0x0003,
        }
    }

    pub fn from_id(id: u16) -> Result<Self, HpkeError> {
        match id {
            0x0001 => Ok(Self::Aes128Gcm),
            0x0002 => Ok(Self::Aes256Gcm),
            0x0003 => Ok(Self::ChaCha20Poly1305),
            other => Err(HpkeError::UnsupportedAlgorithm(other)),
        }
    }

    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm | Self::ChaCha20Poly1305 => 32,
        }
    }

    pub const fn nonce_len(self) -> usize {
        12
    }

    /// Fixed ciphertext overhead, the authentication tag
    pub const fn tag_len(self) -> usize {
        16
    }
}

/// A KEM/KDF/AEAD combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suite {
    kem: KemId,
    kdf: KdfId,
    aead: AeadId,
}

impl Suite {
    pub fn new(kem: KemId, kdf: KdfId, aead: AeadId) -> Self {
        Self { kem, kdf, aead }
    }

    /// Resolve raw algorithm identifiers, failing on any unknown one
    pub fn from_ids(kem: u16, kdf: u16, aead: u16) -> Result<Self, HpkeError> {
        Ok(Self {
            kem: KemId::from_id(kem)?,
            kdf: KdfId::from_id(kdf)?,
            aead: AeadId::from_id(aead)?,
        })
    }

    pub fn kem(&self) -> KemId {
        self.kem
    }

    pub fn aead(&self) -> AeadId {
        self.aead
    }

    pub fn encapsulated_key_len(&self) -> usize {
        self.kem.key_len()
    }

    /// Ciphertext length minus plaintext length
    pub fn ciphertext_overhead(&self) -> usize {
        self.aead.tag_len()
    }

    /// `suite_id` of RFC 9180 section 5.1
    pub(crate) fn suite_id(&self) -> [u8; 10] {
        let mut id = [0u8; 10];
        id[..4].copy_from_slice(b"HPKE");
        id[4..6].copy_from_slice(&self.kem.id().to_be_bytes());
        id[6..8].copy_from_slice(&self.kdf.id().to_be_bytes());
        id[8..].copy_from_slice(&self.aead.id().to_be_bytes());
        id
    }

    /// `suite_id` of the KEM itself, RFC 9180 section 4.1
    pub(crate) fn kem_suite_id(&self) -> [u8; 5] {
        let mut id = [0u8; 5];
        id[..3].copy_from_slice(b"KEM");
        id[3..].copy_from_slice(&self.kem.id().to_be_bytes());
        id
    }
}

pub(crate) fn aead_seal(
    aead: AeadId,
    key: &[u8],
    nonce: &[u8; 12],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, HpkeError> {
    let payload = Payload {
        msg: plaintext,
        aad,
    };
    match aead {
        AeadId::Aes128Gcm => Aes128Gcm::new_from_slice(key)
            .map_err(|_| HpkeError::KeySchedule)?
            .encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            .map_err(|_| HpkeError::Seal),
        AeadId::Aes256Gcm => Aes256Gcm::new_from_slice(key)
            .map_err(|_| HpkeError::KeySchedule)?
            .encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            .map_err(|_| HpkeError::Seal),
        AeadId::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| HpkeError::KeySchedule)?
            .encrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            .map_err(|_| HpkeError::Seal),
    }
}

pub(crate) fn aead_open(
    aead: AeadId,
    key: &[u8],
    nonce: &[u8; 12],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, HpkeError> {
    let payload = Payload {
        msg: ciphertext,
        aad,
    };
    match aead {
        AeadId::Aes128Gcm => Aes128Gcm::new_from_slice(key)
            .map_err(|_| HpkeError::KeySchedule)?
            .decrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            .map_err(|_| HpkeError::Open),
        AeadId::Aes256Gcm => Aes256Gcm::new_from_slice(key)
            .map_err(|_| HpkeError::KeySchedule)?
            .decrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            .map_err(|_| HpkeError::Open),
        AeadId::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| HpkeError::KeySchedule)?
            .decrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            .map_err(|_| HpkeError::Open),
    }
}
