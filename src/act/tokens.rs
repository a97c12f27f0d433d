//! Token request, issuance, verification and recovery.
//!
//! Every protocol step is a pure function of its inputs producing new
//! entities; nothing is mutated in place and nothing is cached between
//! calls. The client-held [`TokensRequestPrivateState`] is only valid
//! together with the exact request, message set and client parameters it
//! was generated from.

use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
};
use rand::{prelude::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::common::ActError;

use super::keys::{
    ClientParameters, ClientPublicParameters, SchemeParameters, ServerPrivateParameters,
    ServerPublicParameters,
};
use super::util::{fingerprint_point, message_point, random_nonzero_scalar};

// {{{ DleqProof

/// Chaum-Pedersen proof that `signed = k blinded` under the issuer key
/// `K = k G`.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct DleqProof {
    c: Scalar,
    z: Scalar,
}

impl DleqProof {
    fn hash_data(
        public_key: &RistrettoPoint,
        blinded: &RistrettoPoint,
        signed: &RistrettoPoint,
        a: &RistrettoPoint,
        b: &RistrettoPoint,
    ) -> Scalar {
        let mut hasher = Sha512::new();

        // domain of the oracle, to have separate oracles
        hasher.update(b"actd issuance proof");

        hasher.update(RISTRETTO_BASEPOINT_POINT.compress().as_bytes());
        hasher.update(public_key.compress().as_bytes());
        hasher.update(blinded.compress().as_bytes());
        hasher.update(signed.compress().as_bytes());
        hasher.update(a.compress().as_bytes());
        hasher.update(b.compress().as_bytes());

        Scalar::from_hash(hasher)
    }

    fn create(blinded: RistrettoPoint, signed: RistrettoPoint, k: Scalar) -> Self {
        let r = Scalar::random(&mut rand::thread_rng());
        let a = RistrettoPoint::mul_base(&r);
        let b = blinded * r;

        let c = DleqProof::hash_data(&RistrettoPoint::mul_base(&k), &blinded, &signed, &a, &b);

        let z = r - k * c;

        Self { c, z }
    }

    fn verify(
        &self,
        blinded: RistrettoPoint,
        signed: RistrettoPoint,
        public_key: RistrettoPoint,
    ) -> bool {
        let a = RistrettoPoint::mul_base(&self.z) + public_key * self.c;
        let b = blinded * self.z + signed * self.c;
        let c = DleqProof::hash_data(&public_key, &blinded, &signed, &a, &b);

        c == self.c
    }
}

/// Batched form covering a whole response with one proof.
///
/// A random linear combination of the pairs is proven instead of each pair
/// separately; the combination weights come from an rng seeded by hashing
/// every point, so neither side can choose them.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct DleqProofBatched {
    proof: DleqProof,
}

impl DleqProofBatched {
    fn hash_data(
        blinded: &[RistrettoPoint],
        signed: &[RistrettoPoint],
        public_key: &RistrettoPoint,
    ) -> StdRng {
        let mut hasher = Sha256::new();
        hasher.update(b"actd issuance proof batch");
        hasher.update(RISTRETTO_BASEPOINT_POINT.compress().as_bytes());
        hasher.update(public_key.compress().as_bytes());
        blinded.iter().for_each(|point| {
            hasher.update(point.compress().as_bytes());
        });
        signed.iter().for_each(|point| {
            hasher.update(point.compress().as_bytes());
        });

        // seedable deterministic rng
        StdRng::from_seed(hasher.finalize().into())
    }

    fn random_linear_combination(
        blinded: &[RistrettoPoint],
        signed: &[RistrettoPoint],
        public_key: &RistrettoPoint,
    ) -> (RistrettoPoint, RistrettoPoint) {
        let mut weights = Self::hash_data(blinded, signed, public_key);

        blinded
            .iter()
            .zip(signed.iter())
            .map(|(b, s)| {
                let c = Scalar::random(&mut weights);
                (b * c, s * c)
            })
            .fold(
                (RistrettoPoint::identity(), RistrettoPoint::identity()),
                |(bsum, ssum), (b, s)| (bsum + b, ssum + s),
            )
    }

    fn create(blinded: &[RistrettoPoint], signed: &[RistrettoPoint], k: Scalar) -> Self {
        let public_key = RistrettoPoint::mul_base(&k);
        let (m, z) = Self::random_linear_combination(blinded, signed, &public_key);

        Self {
            proof: DleqProof::create(m, z, k),
        }
    }

    fn verify(
        &self,
        blinded: &[RistrettoPoint],
        signed: &[RistrettoPoint],
        public_key: &RistrettoPoint,
    ) -> bool {
        let (m, z) = Self::random_linear_combination(blinded, signed, public_key);
        self.proof.verify(m, z, *public_key)
    }
}

// }}}

// {{{ Entities

/// Deterministic binding value tying a message to its token.
///
/// Computed as the client's PRF over the message, so the issuer can track
/// per-fingerprint counts without ever seeing the message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint([u8; 32]);

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Blinded tokens request, safe to hand to the issuer
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokensRequest {
    blinded: Vec<CompressedRistretto>,
}

impl TokensRequest {
    pub fn len(&self) -> usize {
        self.blinded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blinded.is_empty()
    }
}

/// Client-held secret blinding state, tied 1:1 to one [`TokensRequest`].
///
/// Never reconstructable from the request alone; the caller persists it and
/// supplies it unchanged to verification and recovery.
#[derive(Serialize, Deserialize, Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokensRequestPrivateState {
    blinding: Vec<Scalar>,
    binding: [u8; 32],
}

/// Everything [`generate_tokens_request`] hands back to the caller
#[derive(Serialize, Deserialize, Clone)]
pub struct GeneratedTokensRequest {
    pub fingerprints: Vec<Fingerprint>,
    pub request: TokensRequest,
    pub private_state: TokensRequestPrivateState,
}

/// The issuer's blind-signed response to a [`TokensRequest`]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokensResponse {
    signed: Vec<CompressedRistretto>,
    proof: DleqProofBatched,
}

/// Final unblinded token for one message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Token {
    fingerprint: Fingerprint,
    point: CompressedRistretto,
}

impl Token {
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Issuer-side authenticity check of a recovered token.
    ///
    /// Valid exactly when the token point is the issuer signature on this
    /// message, `W = k H(m)`.
    pub fn verify(
        &self,
        message: impl AsRef<[u8]>,
        server_private: &ServerPrivateParameters,
    ) -> bool {
        match self.point.decompress() {
            Some(point) => point == message_point(message) * server_private.scalar(),
            None => false,
        }
    }
}

/// Ordered set of recovered tokens, one per requested message
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokensSet {
    tokens: Vec<Token>,
}

impl TokensSet {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

// }}}

// {{{ Request generation

/// Digest binding a private state to one request, message set and
/// parameter pair. Mixing state across sessions trips this before any
/// proof is even looked at.
fn binding_digest<M: AsRef<[u8]>>(
    scheme: &SchemeParameters,
    client_public: &ClientPublicParameters,
    server_public: &ServerPublicParameters,
    blinded: &[CompressedRistretto],
    messages: &[M],
) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(b"actd request binding");
    hasher.update(scheme.group().to_le_bytes());
    hasher.update(server_public.point().compress().as_bytes());
    hasher.update(client_public.key_point().compress().as_bytes());

    hasher.update((blinded.len() as u64).to_le_bytes());
    blinded.iter().for_each(|point| {
        hasher.update(point.as_bytes());
    });
    messages.iter().for_each(|message| {
        let message = message.as_ref();
        hasher.update((message.len() as u64).to_le_bytes());
        hasher.update(message);
    });

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize()[..32]);
    digest
}

/// Generate a blinded tokens request for an ordered message set.
///
/// Returns per-message fingerprints (same count and order as the input),
/// the request for the issuer, and the private state the caller must keep
/// for verification and recovery.
///
/// An empty message set is rejected; issuing zero tokens is always a
/// caller bug.
pub fn generate_tokens_request<M: AsRef<[u8]>>(
    messages: &[M],
    scheme: &SchemeParameters,
    client: &ClientParameters,
    server_public: &ServerPublicParameters,
) -> Result<GeneratedTokensRequest, ActError> {
    scheme.check()?;

    if messages.is_empty() {
        return Err(ActError::Parameter("empty message set"));
    }

    if !client.public.matches_issuer(&server_public.point()) {
        return Err(ActError::Parameter(
            "client parameters do not match this issuer",
        ));
    }

    let x = client.private.scalar();
    let mut rng = rand::thread_rng();

    let fingerprints = messages
        .iter()
        .map(|m| Fingerprint((fingerprint_point(m) * x).compress().to_bytes()))
        .collect();

    let blinding: Vec<Scalar> = messages
        .iter()
        .map(|_| random_nonzero_scalar(&mut rng))
        .collect();

    let blinded: Vec<CompressedRistretto> = messages
        .iter()
        .zip(blinding.iter())
        .map(|(m, r)| (message_point(m) * r).compress())
        .collect();

    let binding = binding_digest(scheme, &client.public, server_public, &blinded, messages);

    Ok(GeneratedTokensRequest {
        fingerprints,
        request: TokensRequest { blinded },
        private_state: TokensRequestPrivateState { blinding, binding },
    })
}

// }}}

// {{{ Issuance

/// Blind-sign a tokens request.
///
/// Deliberately takes neither the original messages nor the client's
/// private state; the issuer signs blinded points only.
pub fn generate_tokens_response(
    request: &TokensRequest,
    scheme: &SchemeParameters,
    client_public: &ClientPublicParameters,
    server_public: &ServerPublicParameters,
    server_private: &ServerPrivateParameters,
) -> Result<TokensResponse, ActError> {
    scheme.check()?;

    if request.is_empty() {
        return Err(ActError::Parameter("empty tokens request"));
    }

    let k = server_private.scalar();
    if RistrettoPoint::mul_base(&k) != server_public.point() {
        return Err(ActError::Parameter("server key pair mismatch"));
    }

    if !client_public.matches_issuer(&server_public.point()) {
        return Err(ActError::Parameter(
            "client parameters do not match this issuer",
        ));
    }

    let blinded = decompress_points(&request.blinded, "tokens request point")?;

    let signed: Vec<RistrettoPoint> = blinded.iter().map(|point| point * k).collect();
    let proof = DleqProofBatched::create(&blinded, &signed, k);

    Ok(TokensResponse {
        signed: signed.iter().map(|point| point.compress()).collect(),
        proof,
    })
}

// }}}

// {{{ Verification and recovery

fn decompress_points(
    points: &[CompressedRistretto],
    what: &'static str,
) -> Result<Vec<RistrettoPoint>, ActError> {
    let decoded = points
        .iter()
        .map(|point| point.decompress())
        .collect::<Option<Vec<_>>>()
        .ok_or(ActError::Decode(what))?;

    if decoded.iter().any(|point| *point == RistrettoPoint::identity()) {
        return Err(ActError::Parameter("identity point"));
    }

    Ok(decoded)
}

/// Shared validation behind verification and recovery. On success returns
/// the decoded response points, already checked against request, private
/// state, messages and issuer proof.
fn checked_response_points<M: AsRef<[u8]>>(
    messages: &[M],
    request: &TokensRequest,
    private_state: &TokensRequestPrivateState,
    response: &TokensResponse,
    scheme: &SchemeParameters,
    client: &ClientParameters,
    server_public: &ServerPublicParameters,
) -> Result<Vec<RistrettoPoint>, ActError> {
    scheme.check()?;

    if messages.is_empty() {
        return Err(ActError::Parameter("empty message set"));
    }

    let n = messages.len();
    if request.blinded.len() != n
        || private_state.blinding.len() != n
        || response.signed.len() != n
    {
        return Err(ActError::Parameter("entity counts do not agree"));
    }

    let binding = binding_digest(scheme, &client.public, server_public, &request.blinded, messages);
    if binding != private_state.binding {
        error!("tokens request private state does not match this request");
        return Err(ActError::Verification(
            "private state does not belong to this request",
        ));
    }

    // the blinding factors must reproduce the request exactly, in order
    let reproduced = messages
        .iter()
        .zip(private_state.blinding.iter())
        .map(|(m, r)| (message_point(m) * r).compress())
        .collect::<Vec<_>>();
    if reproduced != request.blinded {
        error!("blinding state does not reproduce the tokens request");
        return Err(ActError::Verification(
            "private state does not reproduce the request",
        ));
    }

    let blinded = decompress_points(&request.blinded, "tokens request point")?;
    let signed = decompress_points(&response.signed, "tokens response point")?;

    if !response
        .proof
        .verify(&blinded, &signed, &server_public.point())
    {
        error!("issuance proof rejected");
        return Err(ActError::Verification("issuance proof rejected"));
    }

    Ok(signed)
}

/// Check that a response is a valid blind signature over exactly this
/// request, private state and message set.
///
/// Pure and idempotent; recovery re-runs the same checks on its own.
pub fn verify_tokens_response<M: AsRef<[u8]>>(
    messages: &[M],
    request: &TokensRequest,
    private_state: &TokensRequestPrivateState,
    response: &TokensResponse,
    scheme: &SchemeParameters,
    client: &ClientParameters,
    server_public: &ServerPublicParameters,
) -> Result<(), ActError> {
    checked_response_points(
        messages,
        request,
        private_state,
        response,
        scheme,
        client,
        server_public,
    )
    .map(|_| ())
}

/// Unblind a verified response into the final tokens.
///
/// All-or-nothing over the message set: any failed check returns an error
/// and no tokens. Order follows the input messages.
pub fn recover_tokens<M: AsRef<[u8]>>(
    messages: &[M],
    request: &TokensRequest,
    private_state: &TokensRequestPrivateState,
    response: &TokensResponse,
    scheme: &SchemeParameters,
    client: &ClientParameters,
    server_public: &ServerPublicParameters,
) -> Result<TokensSet, ActError> {
    let signed = checked_response_points(
        messages,
        request,
        private_state,
        response,
        scheme,
        client,
        server_public,
    )?;

    let x = client.private.scalar();

    let tokens = messages
        .iter()
        .zip(private_state.blinding.iter())
        .zip(signed.iter())
        .map(|((m, r), w)| Token {
            fingerprint: Fingerprint((fingerprint_point(m) * x).compress().to_bytes()),
            point: (w * r.invert()).compress(),
        })
        .collect();

    Ok(TokensSet { tokens })
}

// }}}

// {{{ tests

#[cfg(test)]
mod tests {
    use super::super::keys::{
        generate_client_parameters, generate_server_parameters, SchemeParameters,
    };
    use super::*;

    struct Session {
        scheme: SchemeParameters,
        server_public: super::super::keys::ServerPublicParameters,
        server_private: super::super::keys::ServerPrivateParameters,
        client: ClientParameters,
    }

    fn session() -> Session {
        let scheme = SchemeParameters::ristretto255();
        let (server_public, server_private) = generate_server_parameters(&scheme).unwrap();
        let client = generate_client_parameters(&scheme, &server_public).unwrap();
        Session {
            scheme,
            server_public,
            server_private,
            client,
        }
    }

    fn issue(s: &Session, messages: &[&[u8]]) -> (GeneratedTokensRequest, TokensResponse) {
        let generated =
            generate_tokens_request(messages, &s.scheme, &s.client, &s.server_public).unwrap();
        let response = generate_tokens_response(
            &generated.request,
            &s.scheme,
            &s.client.public,
            &s.server_public,
            &s.server_private,
        )
        .unwrap();
        (generated, response)
    }

    #[test]
    fn round_trip() {
        let s = session();
        let messages: &[&[u8]] = &[b"first", b"second", b"third"];
        let (generated, response) = issue(&s, messages);

        assert_eq!(generated.fingerprints.len(), messages.len());

        verify_tokens_response(
            messages,
            &generated.request,
            &generated.private_state,
            &response,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap();

        let tokens = recover_tokens(
            messages,
            &generated.request,
            &generated.private_state,
            &response,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap();

        assert_eq!(tokens.len(), messages.len());
        for (token, (message, fingerprint)) in tokens
            .tokens()
            .iter()
            .zip(messages.iter().zip(generated.fingerprints.iter()))
        {
            // order preserved: fingerprint of the token matches its message
            assert_eq!(token.fingerprint(), fingerprint);
            assert!(token.verify(message, &s.server_private));
        }
    }

    #[test]
    fn fingerprints_are_deterministic_per_client() {
        let s = session();
        let messages: &[&[u8]] = &[b"a message"];

        let first =
            generate_tokens_request(messages, &s.scheme, &s.client, &s.server_public).unwrap();
        let second =
            generate_tokens_request(messages, &s.scheme, &s.client, &s.server_public).unwrap();

        // same PRF key, same message
        assert_eq!(first.fingerprints, second.fingerprints);
        // but the blinded requests are unlinkable
        assert_ne!(first.request.blinded, second.request.blinded);
    }

    #[test]
    fn empty_message_set_is_rejected() {
        let s = session();
        let messages: &[&[u8]] = &[];
        let err = generate_tokens_request(messages, &s.scheme, &s.client, &s.server_public)
            .err()
            .unwrap();
        assert_eq!(err, ActError::Parameter("empty message set"));
    }

    #[test]
    fn duplicate_messages_each_get_a_token() {
        let s = session();
        let messages: &[&[u8]] = &[b"same", b"same"];
        let (generated, response) = issue(&s, messages);

        let tokens = recover_tokens(
            messages,
            &generated.request,
            &generated.private_state,
            &response,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.tokens()[0].fingerprint(), tokens.tokens()[1].fingerprint());
        assert!(tokens.tokens().iter().all(|t| t.verify(b"same", &s.server_private)));
    }

    #[test]
    fn cross_session_state_is_rejected() {
        let s = session();
        let messages: &[&[u8]] = &[b"one", b"two"];
        let (generated_a, _response_a) = issue(&s, messages);
        let (generated_b, response_b) = issue(&s, messages);

        // state from session a with request/response from session b
        let err = verify_tokens_response(
            messages,
            &generated_b.request,
            &generated_a.private_state,
            &response_b,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap_err();
        assert!(matches!(err, ActError::Verification(_)));

        let err = recover_tokens(
            messages,
            &generated_b.request,
            &generated_a.private_state,
            &response_b,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap_err();
        assert!(matches!(err, ActError::Verification(_)));
    }

    #[test]
    fn response_for_another_request_is_rejected() {
        let s = session();
        let messages: &[&[u8]] = &[b"one", b"two"];
        let (generated_a, _) = issue(&s, messages);
        let (_, response_b) = issue(&s, messages);

        let err = verify_tokens_response(
            messages,
            &generated_a.request,
            &generated_a.private_state,
            &response_b,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap_err();
        assert!(matches!(err, ActError::Verification(_)));
    }

    #[test]
    fn message_order_is_significant() {
        let s = session();
        let messages: &[&[u8]] = &[b"one", b"two"];
        let (generated, response) = issue(&s, messages);

        let reversed: &[&[u8]] = &[b"two", b"one"];
        let err = verify_tokens_response(
            reversed,
            &generated.request,
            &generated.private_state,
            &response,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap_err();
        assert!(matches!(err, ActError::Verification(_)));
    }

    #[test]
    fn tampered_response_is_rejected() {
        let s = session();
        let messages: &[&[u8]] = &[b"one", b"two"];
        let (generated, mut response) = issue(&s, messages);

        // swap one signed point for some other valid group element
        response.signed[0] =
            RistrettoPoint::mul_base(&Scalar::from(42u64)).compress();

        let err = verify_tokens_response(
            messages,
            &generated.request,
            &generated.private_state,
            &response,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap_err();
        assert_eq!(err, ActError::Verification("issuance proof rejected"));
    }

    #[test]
    fn truncated_response_is_rejected() {
        let s = session();
        let messages: &[&[u8]] = &[b"one", b"two"];
        let (generated, mut response) = issue(&s, messages);
        response.signed.pop();

        let err = verify_tokens_response(
            messages,
            &generated.request,
            &generated.private_state,
            &response,
            &s.scheme,
            &s.client,
            &s.server_public,
        )
        .unwrap_err();
        assert_eq!(err, ActError::Parameter("entity counts do not agree"));
    }

    #[test]
    fn foreign_client_parameters_are_rejected_at_issuance() {
        let s = session();
        let other = session();
        let messages: &[&[u8]] = &[b"one"];
        let generated =
            generate_tokens_request(messages, &s.scheme, &s.client, &s.server_public).unwrap();

        // client registered with a different issuer
        let err = generate_tokens_response(
            &generated.request,
            &s.scheme,
            &other.client.public,
            &s.server_public,
            &s.server_private,
        )
        .unwrap_err();
        assert!(matches!(err, ActError::Parameter(_)));
    }
}

// }}}
