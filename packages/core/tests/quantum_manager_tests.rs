//! QuantumManager: default hybrid suite, shared secrets and randomness

use satox_quantum::crypto::suites::ClassicSuiteProvider;
use satox_quantum::{Config, QuantumError, QuantumManager};

fn manager() -> QuantumManager {
    let manager: QuantumManager = QuantumManager::new();
    manager.initialize().unwrap();
    manager
}

#[test]
fn test_encrypt_decrypt_sign_verify() {
    let manager = manager();
    let pair = manager.generate_key_pair().unwrap();

    let ciphertext = manager.encrypt(&pair.public_key, b"quantum-safe").unwrap();
    assert_eq!(manager.decrypt(&pair.private_key, &ciphertext).unwrap(), b"quantum-safe");

    let signature = manager.sign(&pair.private_key, b"block 42").unwrap();
    assert!(manager.verify(&pair.public_key, b"block 42", &signature).unwrap());
    assert!(!manager.verify(&pair.public_key, b"block 43", &signature).unwrap());

    let other = manager.generate_key_pair().unwrap();
    assert!(!manager.verify(&other.public_key, b"block 42", &signature).unwrap());
}

#[test]
fn test_private_key_is_not_a_public_key() {
    let manager = manager();
    let pair = manager.generate_key_pair().unwrap();

    assert!(matches!(
        manager.encrypt(&pair.private_key, b"m"),
        Err(QuantumError::InvalidArgument(_))
    ));
    assert!(matches!(
        manager.sign(&pair.public_key, b"m"),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_shared_secret_agreement() {
    let manager = manager();
    let bob = manager.generate_key_pair().unwrap();

    let alice_side = manager.establish_shared_secret(&bob.public_key).unwrap();
    let bob_side = manager
        .derive_shared_secret(&bob.private_key, &alice_side.kem_ciphertext)
        .unwrap();

    assert_eq!(alice_side.secret.len(), 32);
    assert_eq!(alice_side.secret, bob_side);

    let again = manager.establish_shared_secret(&bob.public_key).unwrap();
    assert_ne!(again.secret, alice_side.secret);
}

#[test]
fn test_validate_key_pair() {
    let manager = manager();
    let alice = manager.generate_key_pair().unwrap();
    let bob = manager.generate_key_pair().unwrap();

    assert!(manager.validate_key_pair(&alice.public_key, &alice.private_key).unwrap());
    assert!(!manager.validate_key_pair(&alice.public_key, &bob.private_key).unwrap());
    assert!(!manager.validate_key_pair(&bob.private_key, &bob.public_key).unwrap());

    let classic = QuantumManager::<ClassicSuiteProvider>::new();
    classic.initialize().unwrap();
    let foreign = classic.generate_key_pair().unwrap();
    assert!(!manager.validate_key_pair(&foreign.public_key, &foreign.private_key).unwrap());

    assert!(matches!(
        manager.validate_key_pair(&[], &alice.private_key),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_compute_and_verify_hash() {
    let manager = manager();

    let hash = manager.compute_hash(b"abc").unwrap();
    assert_eq!(
        hex::encode(&hash),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(
        hex::encode(manager.compute_hash(b"").unwrap()),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );

    assert!(manager.verify_hash(b"abc", &hash).unwrap());
    assert!(!manager.verify_hash(b"abd", &hash).unwrap());
    assert!(!manager.verify_hash(b"abc", &hash[..16]).unwrap());
    assert!(matches!(
        manager.verify_hash(b"abc", &[]),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_random_number_in_range() {
    let manager = manager();

    for _ in 0..1000 {
        let value = manager.generate_random_number(0, 100).unwrap();
        assert!((0..=100).contains(&value));
    }
    assert_eq!(manager.generate_random_number(7, 7).unwrap(), 7);
    assert!(manager.generate_random_number(i64::MIN, i64::MAX).is_ok());

    assert!(matches!(
        manager.generate_random_number(10, 5),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_random_bytes() {
    let manager = manager();

    let first = manager.generate_random_bytes(32).unwrap();
    let second = manager.generate_random_bytes(32).unwrap();
    assert_eq!(first.len(), 32);
    assert_ne!(first, second);

    assert!(matches!(
        manager.generate_random_bytes(0),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_random_bytes_limit_from_config() {
    let config = Config {
        max_random_bytes: 64,
        ..Config::default()
    };
    let manager = QuantumManager::<ClassicSuiteProvider>::with_config(config);
    manager.initialize().unwrap();

    assert_eq!(manager.generate_random_bytes(64).unwrap().len(), 64);
    assert!(matches!(
        manager.generate_random_bytes(65),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_introspection() {
    let manager = manager();

    assert_eq!(manager.get_version().unwrap(), "1.0.0");
    assert_eq!(
        manager.get_algorithm().unwrap(),
        "X25519+Kyber768/Ed25519+Dilithium3"
    );

    let algorithms = manager.get_available_algorithms().unwrap();
    assert!(algorithms.contains(&"CRYSTALS-Kyber".to_string()));
    assert!(algorithms.contains(&"Hybrid-X25519-Kyber768".to_string()));
}

#[test]
fn test_lifecycle() {
    let manager: QuantumManager = QuantumManager::new();
    assert!(!manager.is_initialized());
    assert!(matches!(manager.generate_key_pair(), Err(QuantumError::NotInitialized)));
    assert!(matches!(
        manager.generate_random_number(0, 1),
        Err(QuantumError::NotInitialized)
    ));
    assert!(manager.compute_hash(b"data").unwrap_err().is_lifecycle());
    assert!(manager.verify_hash(b"data", &[]).unwrap_err().is_lifecycle());
    assert!(manager.validate_key_pair(&[], &[]).unwrap_err().is_lifecycle());

    manager.initialize().unwrap();
    assert!(manager.is_initialized());
    assert!(matches!(manager.initialize(), Err(QuantumError::AlreadyInitialized)));

    manager.shutdown().unwrap();
    manager.shutdown().unwrap();
    assert!(matches!(manager.get_version(), Err(QuantumError::NotInitialized)));
    assert!(matches!(manager.generate_random_bytes(8), Err(QuantumError::NotInitialized)));
    assert!(matches!(manager.initialize(), Err(QuantumError::AlreadyShutdown)));
}

#[test]
fn test_shutdown_without_initialize() {
    let manager: QuantumManager = QuantumManager::new();
    manager.shutdown().unwrap();
    assert!(matches!(manager.initialize(), Err(QuantumError::AlreadyShutdown)));
}
