use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha512};

/// sample a random scalar, rejecting zero
///
/// Zero is never a usable key or blinding factor (it has no inverse), so
/// resample in the astronomically unlikely case.
pub fn random_nonzero_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> Scalar {
    loop {
        let s = Scalar::random(rng);
        if s != Scalar::ZERO {
            return s;
        }
    }
}

/// hash a message to the curve
///
/// This is the point that gets blinded in a tokens request and signed by
/// the issuer.
pub fn message_point(message: impl AsRef<[u8]>) -> RistrettoPoint {
    let mut hasher = Sha512::new();
    // domain of the oracle, to have separate oracles
    hasher.update(b"actd message point");

    hasher.update(message);

    RistrettoPoint::from_hash(hasher)
}

/// hash a message to the curve, fingerprint oracle
///
/// Kept separate from [`message_point`] so the fingerprint PRF and the
/// token signature never share an oracle.
pub fn fingerprint_point(message: impl AsRef<[u8]>) -> RistrettoPoint {
    let mut hasher = Sha512::new();
    hasher.update(b"actd fingerprint point");

    hasher.update(message);

    RistrettoPoint::from_hash(hasher)
}
