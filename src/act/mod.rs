//! # Anonymous counting tokens
//!
//! Blind-token protocol: a client obtains issuer-signed tokens bound to
//! specific messages without the issuer learning which token belongs to
//! which message at issuance time. Deterministic per-client fingerprints
//! let the issuer count how often a message has been tokenized without
//! seeing it.
//!
//! ## Usage
//!
//! ```
//!     use actd::act::keys::{
//!         check_client_parameters, generate_client_parameters, generate_server_parameters,
//!         SchemeParameters,
//!     };
//!     use actd::act::tokens::{
//!         generate_tokens_request, generate_tokens_response, recover_tokens,
//!         verify_tokens_response,
//!     };
//!
//!     let scheme = SchemeParameters::ristretto255();
//!
//!     // Issuer setup, long lived
//!     let (server_public, server_private) = generate_server_parameters(&scheme).unwrap();
//!
//!     // Client session setup
//!     let client = generate_client_parameters(&scheme, &server_public).unwrap();
//!
//!     // Issuer validates the client parameters once before serving it
//!     assert!(check_client_parameters(&scheme, &client.public, &server_public, &server_private));
//!
//!     // Client blinds its messages
//!     let messages: &[&[u8]] = &[b"join group 1", b"join group 2"];
//!     let generated = generate_tokens_request(messages, &scheme, &client, &server_public).unwrap();
//!
//!     // Issuer blind-signs, seeing neither messages nor private state
//!     let response = generate_tokens_response(
//!         &generated.request,
//!         &scheme,
//!         &client.public,
//!         &server_public,
//!         &server_private,
//!     )
//!     .unwrap();
//!
//!     // Client checks the response, then unblinds its tokens
//!     verify_tokens_response(
//!         messages,
//!         &generated.request,
//!         &generated.private_state,
//!         &response,
//!         &scheme,
//!         &client,
//!         &server_public,
//!     )
//!     .unwrap();
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
//!     assert!(tokens.tokens()[0].verify(b"join group 1", &server_private));
//! ```

pub mod keys;
pub mod tokens;
mod util;
