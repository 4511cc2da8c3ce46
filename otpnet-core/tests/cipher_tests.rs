#![allow(missing_docs)]
use otpnet_core::frame::{self, HEADER_LEN, Request};
use otpnet_core::keygen::generate_key;
use otpnet_core::{Direction, Error, Origin, alphabet, cipher};
use proptest::prelude::*;
use proptest::{collection, sample};

#[test]
fn test_encryption_decryption_roundtrip() {
    let plaintext = b"HELLO WORLD";
    let key = generate_key(plaintext.len()).unwrap();

    let ciphertext = cipher::transform(plaintext, key.as_bytes(), Direction::Encode).unwrap();
    let decrypted_plaintext =
        cipher::transform(&ciphertext, key.as_bytes(), Direction::Decode).unwrap();

    assert_eq!(ciphertext.len(), 11);
    assert_eq!(plaintext, &decrypted_plaintext[..]);
}

fn symbols(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<u8>> {
    collection::vec(sample::select(&alphabet::SYMBOLS[..]), len)
}

proptest! {
    #[test]
    fn test_roundtrip_with_any_text_and_longer_key(
        text in symbols(0..256),
        key in symbols(256..512),
    ) {
        let ciphertext = cipher::transform(&text, &key, Direction::Encode).unwrap();
        prop_assert_eq!(ciphertext.len(), text.len());
        let plaintext = cipher::transform(&ciphertext, &key, Direction::Decode).unwrap();
        prop_assert_eq!(plaintext, text);
    }
}

#[test]
fn test_message_exchange_simulation() {
    // 1. Simulate the client reading its text and key
    let original_content = b"THE RED GOOSE FLIES AT MIDNIGHT";
    let key = generate_key(40).unwrap();

    // 2. Simulate the client framing the request
    let message = frame::encode_message(Origin::Encode, original_content, key.as_bytes()).unwrap();
    assert_eq!(message.len(), HEADER_LEN + original_content.len() + 40);

    // 3. Simulate the daemon parsing the header and splitting the payload
    let header = frame::decode_header(&message[..HEADER_LEN]).unwrap();
    assert_eq!(header.origin(), Origin::Encode);
    assert_eq!(header.text_len(), 31);
    assert_eq!(header.key_len(), 40);
    let request = Request::split(&header, message[HEADER_LEN..].to_vec()).unwrap();

    // 4. Simulate the daemon encoding and responding
    let response = cipher::transform(&request.text, &request.key, Direction::Encode).unwrap();
    assert_eq!(response.len() as u64, header.text_len());

    // 5. Decode and verify
    let decrypted = cipher::transform(&response, key.as_bytes(), Direction::Decode).unwrap();
    assert_eq!(original_content, &decrypted[..]);
}

#[test]
fn test_invalid_input_never_produces_a_message() {
    let key = generate_key(16).unwrap();
    for bad in [&b"lowercase"[..], &b"TAB\tHERE"[..], &b"NEWLINE\n"[..], &b"DIGIT 1"[..]] {
        let result = frame::encode_message(Origin::Encode, bad, key.as_bytes());
        assert!(matches!(result, Err(Error::InvalidCharset { .. })), "{bad:?}");
    }
    let result = frame::encode_message(Origin::Decode, b"TOO LONG FOR KEY", b"SHORT");
    assert!(matches!(result, Err(Error::KeyTooShort { .. })));
}
