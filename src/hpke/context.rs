//! Sender and recipient contexts for single-shot sealing.
//!
//! State machine per context: setup establishes key and base nonce, then
//! exactly one seal (or open) consumes the context. Contexts own their key
//! material exclusively and zeroize it on drop; they are not shareable
//! between callers.

use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::common::fill_bytes;

use super::suite::{aead_open, aead_seal, Suite};
use super::util::{labeled_extract, labeled_expand};
use super::HpkeError;

const MODE_BASE: u8 = 0x00;

/// Generate a fresh X25519 recipient keypair, public then secret bytes
pub fn generate_keypair() -> ([u8; 32], Zeroizing<[u8; 32]>) {
    let secret = StaticSecret::random_from_rng(rand::thread_rng());
    let public = PublicKey::from(&secret);
    (public.to_bytes(), Zeroizing::new(secret.to_bytes()))
}

fn parse_key(suite: &Suite, bytes: &[u8]) -> Result<[u8; 32], HpkeError> {
    let expected = suite.kem().key_len();
    if bytes.len() != expected {
        return Err(HpkeError::KeyLength {
            expected,
            got: bytes.len(),
        });
    }
    let mut key = [0u8; 32];
    key.copy_from_slice(bytes);
    Ok(key)
}

/// `DeriveKeyPair` of RFC 9180 section 7.1.3
fn derive_keypair(suite: &Suite, seed: &[u8]) -> Result<StaticSecret, HpkeError> {
    let expected = suite.kem().seed_len();
    if seed.len() != expected {
        return Err(HpkeError::SeedLength {
            expected,
            got: seed.len(),
        });
    }

    let kem_id = suite.kem_suite_id();
    let dkp_prk = labeled_extract(&kem_id, b"", b"dkp_prk", seed);
    let sk = Zeroizing::new(labeled_expand(&dkp_prk, &kem_id, b"sk", b"", 32)?);

    let mut sk_bytes = Zeroizing::new([0u8; 32]);
    sk_bytes.copy_from_slice(&sk);
    Ok(StaticSecret::from(*sk_bytes))
}

/// `ExtractAndExpand` over a DH result, RFC 9180 section 4.1
fn kem_shared_secret(
    suite: &Suite,
    dh: &[u8; 32],
    enc: &[u8; 32],
    recipient_public: &[u8; 32],
) -> Result<Zeroizing<[u8; 32]>, HpkeError> {
    let kem_id = suite.kem_suite_id();
    let eae_prk = labeled_extract(&kem_id, b"", b"eae_prk", dh);

    let mut kem_context = [0u8; 64];
    kem_context[..32].copy_from_slice(enc);
    kem_context[32..].copy_from_slice(recipient_public);

    let okm = Zeroizing::new(labeled_expand(
        &eae_prk,
        &kem_id,
        b"shared_secret",
        &kem_context,
        32,
    )?);
    let mut shared = Zeroizing::new([0u8; 32]);
    shared.copy_from_slice(&okm);
    Ok(shared)
}

struct Schedule {
    key: Zeroizing<Vec<u8>>,
    base_nonce: [u8; 12],
}

/// `KeySchedule` for mode_base, RFC 9180 section 5.1
fn key_schedule(suite: &Suite, shared_secret: &[u8; 32], info: &[u8]) -> Result<Schedule, HpkeError> {
    let suite_id = suite.suite_id();

    let psk_id_hash = labeled_extract(&suite_id, b"", b"psk_id_hash", b"");
    let info_hash = labeled_extract(&suite_id, b"", b"info_hash", info);

    let mut context = [0u8; 65];
    context[0] = MODE_BASE;
    context[1..33].copy_from_slice(&psk_id_hash);
    context[33..].copy_from_slice(&info_hash);

    let secret = labeled_extract(&suite_id, shared_secret, b"secret", b"");

    let key = Zeroizing::new(labeled_expand(
        &secret,
        &suite_id,
        b"key",
        &context,
        suite.aead().key_len(),
    )?);
    let nonce = labeled_expand(&secret, &suite_id, b"base_nonce", &context, 12)?;
    let mut base_nonce = [0u8; 12];
    base_nonce.copy_from_slice(&nonce);

    Ok(Schedule { key, base_nonce })
}

/// Established sender side of one HPKE encryption.
///
/// [`seal`](Self::seal) takes the context by value; sealing twice with the
/// same encapsulation is unrepresentable.
pub struct SenderContext {
    suite: Suite,
    enc: [u8; 32],
    schedule: Schedule,
}

impl SenderContext {
    /// Set up with a fresh random encapsulation
    pub fn setup(
        suite: Suite,
        recipient_public_key: &[u8],
        info: &[u8],
    ) -> Result<Self, HpkeError> {
        let mut seed = Zeroizing::new([0u8; 32]);
        fill_bytes(&mut rand::thread_rng(), seed.as_mut());
        Self::setup_with_seed(suite, recipient_public_key, info, seed.as_ref())
    }

    /// Set up with a caller-supplied keypair seed.
    ///
    /// The ephemeral key comes deterministically from the seed, so two
    /// setups with equal seeds produce equal encapsulated keys. Meant for
    /// tests and reproducible encapsulation, not for seed reuse across
    /// messages.
    pub fn setup_with_seed(
        suite: Suite,
        recipient_public_key: &[u8],
        info: &[u8],
        seed: &[u8],
    ) -> Result<Self, HpkeError> {
        let recipient = parse_key(&suite, recipient_public_key)?;
        let ephemeral = derive_keypair(&suite, seed)?;

        let enc = PublicKey::from(&ephemeral).to_bytes();
        let dh = ephemeral.diffie_hellman(&PublicKey::from(recipient));
        if !dh.was_contributory() {
            return Err(HpkeError::NonContributoryKey);
        }

        let shared = kem_shared_secret(&suite, dh.as_bytes(), &enc, &recipient)?;
        let schedule = key_schedule(&suite, &shared, info)?;

        Ok(Self {
            suite,
            enc,
            schedule,
        })
    }

    /// The encapsulated key this context was set up with
    pub fn encapsulated_key(&self) -> &[u8] {
        &self.enc
    }

    /// Seal one plaintext, consuming the context.
    ///
    /// Output is `encapsulated_key || ciphertext`; the ciphertext is the
    /// plaintext length plus the AEAD tag.
    pub fn seal(self, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, HpkeError> {
        // single encapsulation, sequence number is always zero
        let ciphertext = aead_seal(
            self.suite.aead(),
            &self.schedule.key,
            &self.schedule.base_nonce,
            aad,
            plaintext,
        )?;

        let mut out = Vec::with_capacity(self.enc.len() + ciphertext.len());
        out.extend_from_slice(&self.enc);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }
}

/// Established recipient side, mirror of [`SenderContext`]
pub struct RecipientContext {
    suite: Suite,
    schedule: Schedule,
}

impl RecipientContext {
    pub fn setup(
        suite: Suite,
        secret_key: &[u8],
        encapsulated_key: &[u8],
        info: &[u8],
    ) -> Result<Self, HpkeError> {
        let secret = Zeroizing::new(parse_key(&suite, secret_key)?);
        let enc = parse_key(&suite, encapsulated_key)?;

        let secret = StaticSecret::from(*secret);
        let public = PublicKey::from(&secret).to_bytes();

        let dh = secret.diffie_hellman(&PublicKey::from(enc));
        if !dh.was_contributory() {
            return Err(HpkeError::NonContributoryKey);
        }

        let shared = kem_shared_secret(&suite, dh.as_bytes(), &enc, &public)?;
        let schedule = key_schedule(&suite, &shared, info)?;

        Ok(Self { suite, schedule })
    }

    /// Open one ciphertext (without the encapsulated-key prefix),
    /// consuming the context
    pub fn open(self, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, HpkeError> {
        aead_open(
            self.suite.aead(),
            &self.schedule.key,
            &self.schedule.base_nonce,
            aad,
            ciphertext,
        )
    }
}
