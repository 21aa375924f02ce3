//! AES-GCM crypto service tests

use docvault_domain::error::Error;
use docvault_domain::ports::{CryptoProvider, SealedBytes};
use docvault_infrastructure::constants::{AES_GCM_KEY_SIZE, AES_GCM_NONCE_SIZE};
use docvault_infrastructure::crypto::CryptoService;

fn service() -> CryptoService {
    CryptoService::new(CryptoService::generate_master_key()).unwrap()
}

#[test]
fn test_round_trip() {
    let crypto = service();
    let sealed = crypto.encrypt(b"123-45-6789").unwrap();
    assert_eq!(sealed.nonce.len(), AES_GCM_NONCE_SIZE);
    assert_ne!(sealed.ciphertext, b"123-45-6789");
    assert_eq!(crypto.decrypt(&sealed).unwrap(), b"123-45-6789");
}

#[test]
fn test_fresh_nonce_per_call() {
    let crypto = service();
    let a = crypto.encrypt(b"same").unwrap();
    let b = crypto.encrypt(b"same").unwrap();
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn test_wrong_key_fails() {
    let sealed = service().encrypt(b"secret").unwrap();
    let err = service().decrypt(&sealed).unwrap_err();
    assert!(matches!(err, Error::Crypto { .. }));
}

#[test]
fn test_tampered_ciphertext_fails() {
    let crypto = service();
    let mut sealed = crypto.encrypt(b"secret").unwrap();
    sealed.ciphertext[0] ^= 0xff;
    assert!(crypto.decrypt(&sealed).is_err());

    let short_nonce = SealedBytes::new(vec![0; 4], sealed.ciphertext.clone());
    assert!(crypto.decrypt(&short_nonce).is_err());
}

#[test]
fn test_key_validation() {
    assert_eq!(CryptoService::generate_master_key().len(), AES_GCM_KEY_SIZE);
    assert!(CryptoService::new(vec![0; 16]).is_err());

    let hex_key = CryptoService::generate_master_key_hex();
    assert_eq!(hex_key.len(), AES_GCM_KEY_SIZE * 2);
    assert!(CryptoService::from_hex(&hex_key).is_ok());
    assert!(matches!(
        CryptoService::from_hex("zz"),
        Err(Error::Configuration { .. })
    ));
}

#[test]
fn test_provider_port() {
    let crypto: Box<dyn CryptoProvider> = Box::new(service());
    assert_eq!(crypto.provider_name(), "aes-256-gcm");
    let sealed = crypto.encrypt(b"via port").unwrap();
    assert_eq!(crypto.decrypt(&sealed).unwrap(), b"via port");
}
