//! End-to-end issuance across a serialization boundary, the way the
//! entities actually travel between client and issuer.

use actd::act::keys::{
    generate_client_parameters, generate_server_parameters, SchemeParameters,
};
use actd::act::tokens::{
    generate_tokens_request, generate_tokens_response, recover_tokens, verify_tokens_response,
    TokensRequest, TokensResponse,
};

const MESSAGES: &[&[u8]] = &[b"alpha", b"beta", b"gamma"];

#[test]
fn issuance_survives_serialization() {
    let scheme = SchemeParameters::ristretto255();
    let (server_public, server_private) = generate_server_parameters(&scheme).unwrap();
    let client = generate_client_parameters(&scheme, &server_public).unwrap();

    let generated =
        generate_tokens_request(MESSAGES, &scheme, &client, &server_public).unwrap();

    // client -> issuer
    let request_wire = serde_json::to_vec(&generated.request).unwrap();
    let request: TokensRequest = serde_json::from_slice(&request_wire).unwrap();

    let response = generate_tokens_response(
        &request,
        &scheme,
        &client.public,
        &server_public,
        &server_private,
    )
    .unwrap();

    // issuer -> client
    let response_wire = serde_json::to_vec(&response).unwrap();
    let response: TokensResponse = serde_json::from_slice(&response_wire).unwrap();

    let tokens = recover_tokens(
        MESSAGES,
        &generated.request,
        &generated.private_state,
        &response,
        &scheme,
        &client,
        &server_public,
    )
    .unwrap();

    assert_eq!(tokens.len(), MESSAGES.len());
    for (token, message) in tokens.tokens().iter().zip(MESSAGES) {
        assert!(token.verify(message, &server_private));
    }
}

#[test]
fn every_flipped_response_byte_is_detected() {
    let scheme = SchemeParameters::ristretto255();
    let (server_public, server_private) = generate_server_parameters(&scheme).unwrap();
    let client = generate_client_parameters(&scheme, &server_public).unwrap();

    let generated =
        generate_tokens_request(MESSAGES, &scheme, &client, &server_public).unwrap();
    let response = generate_tokens_response(
        &generated.request,
        &scheme,
        &client.public,
        &server_public,
        &server_private,
    )
    .unwrap();

    // flip one encoded byte of each signed point in turn
    let value = serde_json::to_value(&response).unwrap();
    for point in 0..MESSAGES.len() {
        for byte in [0usize, 13, 31] {
            let mut tampered = value.clone();
            let original = tampered["signed"][point][byte].as_u64().unwrap();
            tampered["signed"][point][byte] = serde_json::Value::from((original as u8 ^ 0x40) as u64);

            // either the encoding no longer decodes, or verification fails;
            // a tampered response must never yield tokens
            if let Ok(tampered) = serde_json::from_value::<TokensResponse>(tampered) {
                let result = verify_tokens_response(
                    MESSAGES,
                    &generated.request,
                    &generated.private_state,
                    &tampered,
                    &scheme,
                    &client,
                    &server_public,
                );
                assert!(result.is_err(), "tampered point {point} byte {byte} passed");

                let recovered = recover_tokens(
                    MESSAGES,
                    &generated.request,
                    &generated.private_state,
                    &tampered,
                    &scheme,
                    &client,
                    &server_public,
                );
                assert!(recovered.is_err());
            }
        }
    }
}
