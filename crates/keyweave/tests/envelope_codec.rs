//! Envelope encryption end to end.

use serde_json::json;

use keyweave::core::{Algorithm, BlockKey, Bytes32, KeyMaterial};
use keyweave::crypto::{CryptoError, FileDescriptor, FilePayload};
use keyweave::sharing::SharingConfig;
use keyweave::{Envelope, KeyweaveError};
use keyweave_testkit::{init_tracing, multi_party_fixtures};

#[tokio::test]
async fn test_shared_reader_decrypts_and_outsider_fails() {
    init_tracing();
    let (fixture, parties) =
        multi_party_fixtures(&["alice", "bob", "carol"], SharingConfig::default()).await;
    let (alice, bob, carol) = (&parties[0], &parties[1], &parties[2]);

    let key = KeyMaterial::generate();
    alice.share_with(&fixture, alice, "balance", 100, &key).await;
    alice.share_with(&fixture, bob, "balance", 100, &key).await;

    let envelope = Envelope::private(json!(42)).with_public(json!({"owner": "alice"}));
    let sealed = alice
        .codec
        .encrypt(&envelope, fixture.contract, &alice.account, "balance", 100, None)
        .await
        .unwrap();

    assert!(sealed.is_encrypted());
    assert_eq!(sealed.public, envelope.public);
    let info = sealed.crypto_info.as_ref().unwrap();
    assert_eq!(info.algorithm, Algorithm::Content);
    assert_eq!(info.originator, "alice");
    assert_eq!(info.block, Some(100));
    assert_eq!(info.key_length, Some(256));

    let opened = bob
        .codec
        .decrypt(&sealed, fixture.contract, &bob.account, "balance")
        .await
        .unwrap();
    assert_eq!(opened, json!(42));

    let found = carol
        .sharing
        .get_key(fixture.contract, &carol.account, "balance", 100)
        .await
        .unwrap();
    assert_eq!(found, None);
    let err = carol
        .codec
        .decrypt(&sealed, fixture.contract, &carol.account, "balance")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        KeyweaveError::NoContentKey { block: BlockKey::Block(100), .. }
    ));
}

#[tokio::test]
async fn test_decrypt_uses_key_of_encryption_block() {
    let (fixture, parties) = multi_party_fixtures(&["alice", "bob"], SharingConfig::default()).await;
    let (alice, bob) = (&parties[0], &parties[1]);

    let old = KeyMaterial::generate();
    alice.share_with(&fixture, alice, "balance", 10, &old).await;
    alice.share_with(&fixture, bob, "balance", 10, &old).await;

    let sealed = alice
        .codec
        .encrypt(&Envelope::private("early"), fixture.contract, &alice.account, "balance", 20, None)
        .await
        .unwrap();

    // Rotating later must not break older envelopes.
    let new = KeyMaterial::generate();
    alice.share_with(&fixture, bob, "balance", 50, &new).await;

    let opened = bob
        .codec
        .decrypt(&sealed, fixture.contract, &bob.account, "balance")
        .await
        .unwrap();
    assert_eq!(opened, json!("early"));
}

#[tokio::test]
async fn test_encrypt_without_key_fails() {
    let (fixture, parties) = multi_party_fixtures(&["alice"], SharingConfig::default()).await;
    let alice = &parties[0];

    let err = alice
        .codec
        .encrypt(&Envelope::private(1), fixture.contract, &alice.account, "balance", 5, None)
        .await
        .unwrap_err();
    assert!(matches!(err, KeyweaveError::NoContentKey { .. }));
}

#[tokio::test]
async fn test_plain_envelopes_pass_through() {
    let (fixture, parties) = multi_party_fixtures(&["alice"], SharingConfig::default()).await;
    let alice = &parties[0];

    let plain = Envelope::private(json!({"a": [1, 2]}));
    let opened = alice
        .codec
        .decrypt(&plain, fixture.contract, &alice.account, "any")
        .await
        .unwrap();
    assert_eq!(opened, json!({"a": [1, 2]}));

    let public_only = Envelope::default().with_public(json!("hello"));
    let sealed = alice
        .codec
        .encrypt(&public_only, fixture.contract, &alice.account, "any", 1, None)
        .await
        .unwrap();
    assert_eq!(sealed, public_only);
    let opened = alice
        .codec
        .decrypt(&public_only, fixture.contract, &alice.account, "any")
        .await
        .unwrap();
    assert_eq!(opened, serde_json::Value::Null);
}

#[tokio::test]
async fn test_unencrypted_algorithm_needs_no_key() {
    let (fixture, parties) = multi_party_fixtures(&["alice", "bob"], SharingConfig::default()).await;
    let (alice, bob) = (&parties[0], &parties[1]);

    let sealed = alice
        .codec
        .encrypt(
            &Envelope::private(json!({"open": true})),
            fixture.contract,
            &alice.account,
            "public",
            1,
            Some(Algorithm::Unencrypted),
        )
        .await
        .unwrap();
    let info = sealed.crypto_info.as_ref().unwrap();
    assert_eq!(info.algorithm, Algorithm::Unencrypted);
    assert_eq!(info.key_length, None);

    let opened = bob
        .codec
        .decrypt_envelope(&sealed, fixture.contract, &bob.account, "public")
        .await
        .unwrap();
    assert_eq!(opened.private, Some(json!({"open": true})));
    assert!(!opened.is_encrypted());
}

#[tokio::test]
async fn test_aead_envelope_with_wrong_key_fails() {
    let (fixture, parties) = multi_party_fixtures(&["alice", "bob"], SharingConfig::default()).await;
    let (alice, bob) = (&parties[0], &parties[1]);

    alice
        .share_with(&fixture, alice, "secret", 1, &KeyMaterial::generate())
        .await;
    alice
        .share_with(&fixture, bob, "secret", 1, &KeyMaterial::generate())
        .await;

    let sealed = alice
        .codec
        .encrypt(
            &Envelope::private("x"),
            fixture.contract,
            &alice.account,
            "secret",
            1,
            Some(Algorithm::Aead),
        )
        .await
        .unwrap();

    let err = bob
        .codec
        .decrypt(&sealed, fixture.contract, &bob.account, "secret")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        KeyweaveError::Crypto(CryptoError::DecryptionFailed(_))
    ));
}

#[tokio::test]
async fn test_blob_envelope_round_trip() {
    let (fixture, parties) = multi_party_fixtures(&["alice", "bob"], SharingConfig::default()).await;
    let (alice, bob) = (&parties[0], &parties[1]);

    let key = KeyMaterial::generate();
    alice.share_with(&fixture, alice, "docs", 1, &key).await;
    alice.share_with(&fixture, bob, "docs", 1, &key).await;

    let files = FilePayload::Multiple(vec![
        FileDescriptor::new("a.txt", "text/plain", b"first".to_vec()),
        FileDescriptor::new("b.bin", "application/octet-stream", vec![0, 1, 2, 3]),
    ]);
    let envelope = Envelope::private(serde_json::to_value(&files).unwrap());

    let uploads = fixture.blobs.upload_count();
    let sealed = alice
        .codec
        .encrypt(&envelope, fixture.contract, &alice.account, "docs", 1, Some(Algorithm::Blob))
        .await
        .unwrap();
    assert_eq!(fixture.blobs.upload_count(), uploads + 2);

    let opened = bob
        .codec
        .decrypt(&sealed, fixture.contract, &bob.account, "docs")
        .await
        .unwrap();
    let back: FilePayload = serde_json::from_value(opened).unwrap();
    assert_eq!(back, files);

    // Blob envelopes carry files, nothing else.
    let err = alice
        .codec
        .encrypt(
            &Envelope::private("not files"),
            fixture.contract,
            &alice.account,
            "docs",
            1,
            Some(Algorithm::Blob),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, KeyweaveError::InvalidEnvelope(_)));
}

#[tokio::test]
async fn test_hash_encryption_across_partners() {
    let (fixture, parties) = multi_party_fixtures(&["alice", "bob"], SharingConfig::default()).await;
    let (alice, bob) = (&parties[0], &parties[1]);

    let hash = Bytes32::from_bytes([0x5A; 32]);
    let err = alice
        .codec
        .encrypt_hash(&hash, fixture.contract, &alice.account)
        .await
        .unwrap_err();
    assert!(matches!(err, KeyweaveError::NoHashKey { .. }));

    alice
        .sharing
        .ensure_hash_key(fixture.contract, &alice.account, &alice.account, None)
        .await
        .unwrap();
    alice
        .share_with(&fixture, bob, "balance", 1, &KeyMaterial::generate())
        .await;

    let encrypted = alice
        .codec
        .encrypt_hash(&hash, fixture.contract, &alice.account)
        .await
        .unwrap();
    assert_ne!(encrypted, hash);

    // Deterministic under one key, and bob holds the same key.
    let again = bob
        .codec
        .encrypt_hash(&hash, fixture.contract, &bob.account)
        .await
        .unwrap();
    assert_eq!(again, encrypted);

    let decrypted = bob
        .codec
        .decrypt_hash(&encrypted, fixture.contract, &bob.account)
        .await
        .unwrap();
    assert_eq!(decrypted, hash);
}

#[tokio::test]
async fn test_generate_content_key_per_algorithm() {
    let (_fixture, parties) = multi_party_fixtures(&["alice"], SharingConfig::default()).await;
    let codec = &parties[0].codec;

    let a = codec.generate_content_key(None).unwrap();
    let b = codec.generate_content_key(Some(Algorithm::Aead)).unwrap();
    assert_ne!(a, b);
}
