//! # Anonymous counting tokens
//!
//! A client obtains issuer-signed tokens bound to specific messages
//! without the issuer learning which token belongs to which message, while
//! deterministic fingerprints still let the issuer count issuances per
//! message. The crate also carries the HPKE (RFC 9180) single-shot
//! sealing primitive used to transport protocol payloads.
//!
//! ## Token issuance
//!
//! ```
//!     use actd::act::keys::{
//!         generate_client_parameters, generate_server_parameters, SchemeParameters,
//!     };
//!     use actd::act::tokens::{
//!         generate_tokens_request, generate_tokens_response, recover_tokens,
//!     };
//!
//!     let scheme = SchemeParameters::ristretto255();
//!     let (server_public, server_private) = generate_server_parameters(&scheme).unwrap();
//!     let client = generate_client_parameters(&scheme, &server_public).unwrap();
//!
//!     let messages: &[&[u8]] = &[b"first message", b"second message"];
//!     let generated = generate_tokens_request(messages, &scheme, &client, &server_public).unwrap();
//!
//!     // The issuer sees only the blinded request and the client's public half
//!     let response = generate_tokens_response(
//!         &generated.request,
//!         &scheme,
//!         &client.public,
//!         &server_public,
//!         &server_private,
//!     )
//!     .unwrap();
//!
//!     let tokens = recover_tokens(
//!         messages,
//!         &generated.request,
//!         &generated.private_state,
//!         &response,
//!         &scheme,
//!         &client,
//!         &server_public,
//!     )
//!     .unwrap();
//!
//!     assert_eq!(tokens.len(), messages.len());
//!     assert!(tokens.tokens()[1].verify(b"second message", &server_private));
//! ```
//!
//! ## Sealing a payload with HPKE
//!
//! ```
//!     use actd::hpke::{generate_keypair, AeadId, KdfId, KemId, SenderContext, Suite};
//!
//!     let suite = Suite::new(KemId::X25519HkdfSha256, KdfId::HkdfSha256, AeadId::Aes256Gcm);
//!     let (recipient_public, _recipient_secret) = generate_keypair();
//!
//!     let sender = SenderContext::setup(suite, &recipient_public, b"request info").unwrap();
//!     let wire = sender.seal(b"associated data", b"payload").unwrap();
//!     assert_eq!(
//!         wire.len(),
//!         suite.encapsulated_key_len() + b"payload".len() + suite.ciphertext_overhead()
//!     );
//! ```

pub mod act;
pub mod hpke;

pub(crate) mod common;

pub use common::ActError;
pub use hpke::HpkeError;
