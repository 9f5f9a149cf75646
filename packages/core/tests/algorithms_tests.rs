//! PostQuantumAlgorithms: catalog, lifecycle and per-algorithm crypto

use satox_quantum::{AlgorithmInfo, AlgorithmRegistry, PostQuantumAlgorithms, QuantumError};
use satox_quantum::crypto::scheme::SuiteScheme;
use satox_quantum::crypto::suites::ClassicSuiteProvider;
use satox_quantum::Config;
use std::collections::HashSet;
use std::sync::Arc;

fn algorithms() -> PostQuantumAlgorithms {
    let algorithms = PostQuantumAlgorithms::new();
    algorithms.initialize().unwrap();
    algorithms
}

#[test]
fn test_catalog_fixture() {
    let algorithms = algorithms();

    let kyber = algorithms.get_algorithm_info("CRYSTALS-Kyber").unwrap();
    assert_eq!(kyber.security_level, 256);
    assert_eq!(kyber.key_size, 32);
    assert!(kyber.is_recommended);

    let ntru = algorithms.get_algorithm_info("NTRU").unwrap();
    assert!(!ntru.is_recommended);

    let available = algorithms.get_available_algorithms().unwrap();
    assert!(available.contains(&"CRYSTALS-Kyber".to_string()));
    assert!(available.contains(&"NTRU".to_string()));
    assert_eq!(available, algorithms.get_available_algorithms().unwrap());

    let recommended = algorithms.get_recommended_algorithms().unwrap();
    assert!(recommended.iter().all(|name| algorithms.is_algorithm_recommended(name).unwrap()));
    assert!(!recommended.contains(&"NTRU".to_string()));
}

#[test]
fn test_predicates_and_accessors_for_unknown_names() {
    let algorithms = algorithms();

    assert!(!algorithms.is_algorithm_available("RSA-2048").unwrap());
    assert!(!algorithms.is_algorithm_recommended("RSA-2048").unwrap());
    assert!(matches!(
        algorithms.get_algorithm_info("RSA-2048"),
        Err(QuantumError::UnknownAlgorithm(_))
    ));
    assert!(algorithms.get_algorithm_security_level("RSA-2048").is_err());
    assert!(algorithms.get_algorithm_key_size("RSA-2048").is_err());
    assert!(algorithms.get_algorithm_signature_size("RSA-2048").is_err());

    assert_eq!(algorithms.get_algorithm_security_level("NTRU").unwrap(), 128);
    assert_eq!(algorithms.get_algorithm_key_size("NTRU").unwrap(), 32);
}

/// decrypt(sk, encrypt(pk, m)) == m for every algorithm, including empty m
#[test]
fn test_roundtrip_every_algorithm() {
    let algorithms = algorithms();
    let messages: [&[u8]; 3] = [b"", b"x", &[0xA5; 4096]];

    for name in algorithms.get_available_algorithms().unwrap() {
        let pair = algorithms.generate_key_pair(&name).unwrap();
        for message in messages {
            let ciphertext = algorithms.encrypt(&name, &pair.public_key, message).unwrap();
            assert_ne!(ciphertext.as_slice(), message, "{}", name);

            let plaintext = algorithms.decrypt(&name, &pair.private_key, &ciphertext).unwrap();
            assert_eq!(plaintext.as_slice(), message, "{}", name);
        }
    }
}

/// Encryption is randomized: two ciphertexts of one message differ
#[test]
fn test_encryption_is_randomized() {
    let algorithms = algorithms();
    let pair = algorithms.generate_key_pair("CRYSTALS-Dilithium").unwrap();

    let first = algorithms.encrypt("CRYSTALS-Dilithium", &pair.public_key, b"same").unwrap();
    let second = algorithms.encrypt("CRYSTALS-Dilithium", &pair.public_key, b"same").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_signature_soundness_every_algorithm() {
    let algorithms = algorithms();

    for name in algorithms.get_available_algorithms().unwrap() {
        let pair = algorithms.generate_key_pair(&name).unwrap();
        let signature = algorithms.sign(&name, &pair.private_key, b"transfer 10 SATOX").unwrap();

        assert_eq!(
            signature.len() as u32,
            algorithms.get_algorithm_signature_size(&name).unwrap(),
            "{}",
            name
        );
        assert!(algorithms
            .verify(&name, &pair.public_key, b"transfer 10 SATOX", &signature)
            .unwrap());
        assert!(!algorithms
            .verify(&name, &pair.public_key, b"transfer 99 SATOX", &signature)
            .unwrap());
    }
}

#[test]
fn test_verify_false_for_corrupted_signature_error_for_bad_input() {
    let algorithms = algorithms();
    let name = "Hybrid-X25519-Kyber768";
    let pair = algorithms.generate_key_pair(name).unwrap();
    let mut signature = algorithms.sign(name, &pair.private_key, b"data").unwrap();
    signature[10] ^= 0x40;

    assert!(!algorithms.verify(name, &pair.public_key, b"data", &signature).unwrap());
    assert!(!algorithms.verify(name, &pair.public_key, b"data", &[1, 2, 3]).unwrap());

    assert!(matches!(
        algorithms.verify(name, &[], b"data", &signature),
        Err(QuantumError::InvalidArgument(_))
    ));
    assert!(matches!(
        algorithms.verify(name, &pair.public_key, b"", &signature),
        Err(QuantumError::InvalidArgument(_))
    ));
    assert!(matches!(
        algorithms.sign(name, &pair.private_key, b""),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_key_of_other_algorithm_rejected() {
    let algorithms = algorithms();
    let kyber_pair = algorithms.generate_key_pair("CRYSTALS-Kyber").unwrap();

    assert!(matches!(
        algorithms.encrypt("NTRU", &kyber_pair.public_key, b"m"),
        Err(QuantumError::InvalidArgument(_))
    ));
}

#[test]
fn test_key_uniqueness() {
    let algorithms = algorithms();
    let mut seen = HashSet::new();

    for _ in 0..1000 {
        let pair = algorithms.generate_key_pair("NTRU").unwrap();
        assert!(seen.insert(pair.public_key.clone()), "duplicate public key");
    }
    for name in algorithms.get_available_algorithms().unwrap() {
        for _ in 0..20 {
            let pair = algorithms.generate_key_pair(&name).unwrap();
            assert!(seen.insert(pair.public_key.clone()), "duplicate public key");
        }
    }
}

#[test]
fn test_lifecycle_gating() {
    let algorithms = PostQuantumAlgorithms::new();

    assert!(algorithms.get_available_algorithms().unwrap_err().is_lifecycle());
    assert!(algorithms.generate_key_pair("NTRU").unwrap_err().is_lifecycle());
    assert!(algorithms.is_algorithm_available("NTRU").unwrap_err().is_lifecycle());
    assert!(algorithms.get_default_algorithm().unwrap_err().is_lifecycle());
    assert!(algorithms.get_version().unwrap_err().is_lifecycle());

    algorithms.initialize().unwrap();
    assert!(matches!(algorithms.initialize(), Err(QuantumError::AlreadyInitialized)));

    algorithms.shutdown().unwrap();
    algorithms.shutdown().unwrap();
    assert!(matches!(
        algorithms.generate_key_pair("NTRU"),
        Err(QuantumError::NotInitialized)
    ));
    assert!(matches!(algorithms.initialize(), Err(QuantumError::AlreadyShutdown)));
}

#[test]
fn test_default_algorithm_is_informational() {
    let algorithms = algorithms();
    algorithms.set_default_algorithm("Hybrid-X25519-Kyber768").unwrap();

    assert!(matches!(
        algorithms.set_default_algorithm("Rainbow"),
        Err(QuantumError::UnknownAlgorithm(_))
    ));
    assert!(matches!(
        algorithms.generate_key_pair(""),
        Err(QuantumError::InvalidArgument(_))
    ));
    assert_eq!(
        algorithms.get_default_algorithm().unwrap(),
        "Hybrid-X25519-Kyber768"
    );
}

#[test]
fn test_custom_registry() {
    let mut registry = AlgorithmRegistry::builtin();
    registry
        .register(
            AlgorithmInfo::new("X25519-Ed25519", 128, 32, 64, false, "classical baseline"),
            Arc::new(SuiteScheme::<ClassicSuiteProvider>::new()),
        )
        .unwrap();

    let algorithms = PostQuantumAlgorithms::with_registry(registry, Config::default());
    algorithms.initialize().unwrap();

    let names = algorithms.get_available_algorithms().unwrap();
    assert_eq!(names.last().map(String::as_str), Some("X25519-Ed25519"));

    let pair = algorithms.generate_key_pair("X25519-Ed25519").unwrap();
    let signature = algorithms.sign("X25519-Ed25519", &pair.private_key, b"m").unwrap();
    assert_eq!(signature.len(), 64);
}
