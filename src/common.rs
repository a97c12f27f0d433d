//! Error taxonomy and small helpers shared by the protocols

use rand::{CryptoRng, Rng, RngCore};
use thiserror::Error;

/// Failure categories of the counting-token protocol.
///
/// Every operation is a single synchronous round trip; none of these are
/// retryable. The categories stay distinguishable so a caller can tell
/// "this input is garbage" apart from "this cryptographic assertion is
/// false".
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ActError {
    /// A serialized group element did not decode. Raised before any
    /// protocol math runs on the offending entity.
    #[error("malformed encoding: {0}")]
    Decode(&'static str),

    /// Structurally valid but semantically wrong input, for example a
    /// wrong group identifier or mismatched entity counts.
    #[error("invalid argument: {0}")]
    Parameter(&'static str),

    /// A cryptographic check did not pass.
    #[error("verification failed: {0}")]
    Verification(&'static str),

    /// An underlying primitive could not complete.
    #[error("internal failure: {0}")]
    Internal(&'static str),
}

/// Fill some bytes with random data
pub(crate) fn fill_bytes<R: CryptoRng + RngCore>(rng: &mut R, mut bytes: impl AsMut<[u8]>) {
    bytes.as_mut().iter_mut().for_each(|byte| *byte = rng.gen());
}
