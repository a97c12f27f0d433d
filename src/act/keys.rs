//! # Parameters and key material for the counting-token scheme
//!
//! Usage:
//! ```
//!     use actd::act::keys::{
//!         check_client_parameters, generate_client_parameters, generate_server_parameters,
//!         SchemeParameters,
//!     };
//!
//!     let scheme = SchemeParameters::ristretto255();
//!     let (server_public, server_private) = generate_server_parameters(&scheme).unwrap();
//!     let client = generate_client_parameters(&scheme, &server_public).unwrap();
//!     assert!(check_client_parameters(&scheme, &client.public, &server_public, &server_private));
//! ```

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT, ristretto::RistrettoPoint, scalar::Scalar,
    traits::Identity,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::common::ActError;

use super::util::random_nonzero_scalar;

/// Group identifier of the only supported scheme instantiation
pub const GROUP_RISTRETTO255: u16 = 0x0001;

/// Global protocol configuration.
///
/// Carried by value through every operation and checked before any group
/// arithmetic runs, so a request built for an unknown group fails early
/// instead of producing tokens in the wrong algebra.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeParameters {
    group: u16,
}

impl SchemeParameters {
    /// The ristretto255 instantiation of the scheme
    pub fn ristretto255() -> Self {
        Self {
            group: GROUP_RISTRETTO255,
        }
    }

    pub fn group(&self) -> u16 {
        self.group
    }

    pub(crate) fn check(&self) -> Result<(), ActError> {
        if self.group != GROUP_RISTRETTO255 {
            return Err(ActError::Parameter("unsupported group identifier"));
        }
        Ok(())
    }
}

/// The issuer's signing key
#[derive(Serialize, Deserialize, Clone, Zeroize, ZeroizeOnDrop)]
pub struct ServerPrivateParameters {
    k: Scalar,
}

impl ServerPrivateParameters {
    pub(crate) fn scalar(&self) -> Scalar {
        self.k
    }
}

/// The issuer's public key, `K = k G`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerPublicParameters {
    big_k: RistrettoPoint,
}

impl ServerPublicParameters {
    pub(crate) fn point(&self) -> RistrettoPoint {
        self.big_k
    }
}

/// Generate a fresh issuer key pair
pub fn generate_server_parameters(
    scheme: &SchemeParameters,
) -> Result<(ServerPublicParameters, ServerPrivateParameters), ActError> {
    scheme.check()?;

    let k = random_nonzero_scalar(&mut rand::thread_rng());

    Ok((
        ServerPublicParameters {
            big_k: RistrettoPoint::mul_base(&k),
        },
        ServerPrivateParameters { k },
    ))
}

// {{{ Schnorr proof

/// Proof of knowledge of the client key, bound to one issuer key.
///
/// Binding the challenge to the issuer's public point means parameters
/// generated against issuer A do not check out against issuer B.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchnorrProof {
    e: Scalar,
    s: Scalar,
}

impl SchnorrProof {
    fn challenge(
        server_point: &RistrettoPoint,
        big_x: &RistrettoPoint,
        commitment: &RistrettoPoint,
    ) -> Scalar {
        let mut hasher = Sha512::new();
        // domain of the oracle, to have separate oracles
        hasher.update(b"actd client key proof");

        hasher.update(RISTRETTO_BASEPOINT_POINT.compress().as_bytes());
        hasher.update(server_point.compress().as_bytes());
        hasher.update(big_x.compress().as_bytes());
        hasher.update(commitment.compress().as_bytes());

        Scalar::from_hash(hasher)
    }

    fn create(x: &Scalar, big_x: &RistrettoPoint, server_point: &RistrettoPoint) -> Self {
        let rho = Scalar::random(&mut rand::thread_rng());
        let commitment = RistrettoPoint::mul_base(&rho);

        let e = Self::challenge(server_point, big_x, &commitment);
        let s = rho - e * x;

        Self { e, s }
    }

    fn verify(&self, big_x: &RistrettoPoint, server_point: &RistrettoPoint) -> bool {
        let commitment = RistrettoPoint::mul_base(&self.s) + big_x * self.e;
        let e = Self::challenge(server_point, big_x, &commitment);

        bool::from(e.ct_eq(&self.e))
    }
}

// }}}

/// The client's secret fingerprint key
#[derive(Serialize, Deserialize, Clone, Zeroize, ZeroizeOnDrop)]
pub struct ClientPrivateParameters {
    x: Scalar,
}

impl ClientPrivateParameters {
    pub(crate) fn scalar(&self) -> Scalar {
        self.x
    }
}

/// The client's public key `X = x G` with its proof of knowledge
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientPublicParameters {
    big_x: RistrettoPoint,
    proof: SchnorrProof,
}

impl ClientPublicParameters {
    pub fn key_point(&self) -> RistrettoPoint {
        self.big_x
    }

    /// Check that these parameters were generated against the given issuer
    pub(crate) fn matches_issuer(&self, server_point: &RistrettoPoint) -> bool {
        self.proof.verify(&self.big_x, server_point)
    }
}

/// Per-session client key material, public and private half together
#[derive(Serialize, Deserialize, Clone)]
pub struct ClientParameters {
    pub public: ClientPublicParameters,
    pub private: ClientPrivateParameters,
}

/// Generate fresh client parameters against one issuer.
///
/// Pure function of its inputs apart from the key randomness; safe to call
/// repeatedly, each call gives an independent session.
pub fn generate_client_parameters(
    scheme: &SchemeParameters,
    server_public: &ServerPublicParameters,
) -> Result<ClientParameters, ActError> {
    scheme.check()?;

    if server_public.point() == RistrettoPoint::identity() {
        return Err(ActError::Parameter("server public key is the identity"));
    }

    let x = random_nonzero_scalar(&mut rand::thread_rng());
    let big_x = RistrettoPoint::mul_base(&x);
    let proof = SchnorrProof::create(&x, &big_x, &server_public.point());

    Ok(ClientParameters {
        public: ClientPublicParameters { big_x, proof },
        private: ClientPrivateParameters { x },
    })
}

/// Issuer-side validation of client parameters.
///
/// Any structural or cryptographic inconsistency signals invalid, it never
/// panics. Call this before issuing tokens for a new client.
pub fn check_client_parameters(
    scheme: &SchemeParameters,
    client_public: &ClientPublicParameters,
    server_public: &ServerPublicParameters,
    server_private: &ServerPrivateParameters,
) -> bool {
    if scheme.check().is_err() {
        return false;
    }

    // the issuer key pair itself must be consistent
    if RistrettoPoint::mul_base(&server_private.scalar()) != server_public.point() {
        return false;
    }

    if client_public.key_point() == RistrettoPoint::identity() {
        return false;
    }

    client_public
        .proof
        .verify(&client_public.key_point(), &server_public.point())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_parameters_check_out() {
        let scheme = SchemeParameters::ristretto255();
        let (server_public, server_private) = generate_server_parameters(&scheme).unwrap();
        let client = generate_client_parameters(&scheme, &server_public).unwrap();

        assert!(check_client_parameters(
            &scheme,
            &client.public,
            &server_public,
            &server_private,
        ));
    }

    #[test]
    fn client_parameters_bound_to_issuer() {
        let scheme = SchemeParameters::ristretto255();
        let (server_public, _) = generate_server_parameters(&scheme).unwrap();
        let (other_public, other_private) = generate_server_parameters(&scheme).unwrap();

        let client = generate_client_parameters(&scheme, &server_public).unwrap();

        // proof was created against the first issuer
        assert!(!check_client_parameters(
            &scheme,
            &client.public,
            &other_public,
            &other_private,
        ));
    }

    #[test]
    fn unknown_group_is_rejected() {
        let scheme: SchemeParameters = serde_json::from_str(r#"{"group":9}"#).unwrap();
        assert!(matches!(
            generate_server_parameters(&scheme),
            Err(ActError::Parameter(_))
        ));
    }

    #[test]
    fn mismatched_server_keys_fail_check() {
        let scheme = SchemeParameters::ristretto255();
        let (server_public, _) = generate_server_parameters(&scheme).unwrap();
        let (_, wrong_private) = generate_server_parameters(&scheme).unwrap();
        let client = generate_client_parameters(&scheme, &server_public).unwrap();

        assert!(!check_client_parameters(
            &scheme,
            &client.public,
            &server_public,
            &wrong_private,
        ));
    }
}
