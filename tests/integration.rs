use mldsa65::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa65::{Component, Error, Ph, PrivateKey, PublicKey, Signature, KG};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_core::RngCore;

// cargo flamegraph --test integration

// $ cargo test --release -- --nocapture --ignored
#[ignore]
#[test]
fn forever() {
    let mut msg = [0u8; 32];
    let mut i = 0u64;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    loop {
        rng.fill_bytes(&mut msg);
        let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign_with_rng(&mut rng, &msg, &[]).unwrap();
        assert!(pk.verify(&msg, &sig, &[]));
        if i % 10000 == 0 {
            println!("So far i: {i}");
        };
        i += 1;
    }
}


#[test]
fn test_rounds() {
    let mut msg = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(456);
    for i in 0..64 {
        msg[0] = i as u8;
        let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign_with_rng(&mut rng, &msg, &[]).unwrap();
        assert!(pk.verify(&msg, &sig, &[]));
    }
}


#[test]
fn test_random_messages_and_contexts() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
    let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
    for _i in 0..32 {
        let msg_len = rng.gen_range(0..2048);
        let ctx_len = rng.gen_range(0..=255);
        let mut msg = vec![0u8; msg_len];
        let mut ctx = vec![0u8; ctx_len];
        rng.fill_bytes(&mut msg);
        rng.fill_bytes(&mut ctx);
        let sig = sk.try_sign_with_rng(&mut rng, &msg, &ctx).unwrap();
        assert!(pk.verify(&msg, &sig, &ctx));
        assert!(!pk.verify(&msg, &sig, &[ctx.as_slice(), &[0]].concat()));
    }
}


#[test]
fn test_no_verif() {
    let msg = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
    let sig = sk.try_sign_with_rng(&mut rng, &msg, &[]).unwrap();

    // Bad messages
    for i in 0..8 {
        let mut msg_bad = msg;
        msg_bad[i] ^= 0x08;
        assert!(!pk.verify(&msg_bad, &sig, &[]));
    }

    // Bad secret key; bytes past the 128-byte header land in s1, which must remain in range
    for i in 0..8 {
        let mut sk_bad = sk.clone().into_bytes();
        sk_bad[128 + i * 10] ^= 0x01;
        if let Ok(sk_bad) = PrivateKey::try_from_bytes(&sk_bad[..]) {
            let sig = sk_bad.try_sign_with_rng(&mut rng, &msg, &[]).unwrap();
            assert!(!pk.verify(&msg, &sig, &[]));
        }
    }

    // Bad public key
    for i in 0..8 {
        let mut pk_bad = pk.clone().into_bytes();
        pk_bad[i * 10] ^= 0x08;
        let pk_bad = PublicKey::try_from_bytes(&pk_bad).unwrap();
        assert!(!pk_bad.verify(&msg, &sig, &[]));
    }

    // Bad signature, one flip in each of the c_tilde, z and hint regions
    for i in [0, 10, 47, 48, 1000, 3247, 3300, 3308] {
        let mut sig_bad = sig.clone().into_bytes();
        sig_bad[i] ^= 0x08;
        let sig_bad = Signature::try_from_bytes(&sig_bad).unwrap();
        assert!(!pk.verify(&msg, &sig_bad, &[]));
    }
}


#[test]
fn test_signature_bit_flips() {
    let msg = b"bit flips";
    let (pk, sk) = KG::keygen_from_seed(&[4u8; 32]);
    let sig = sk.try_sign_deterministic(msg, &[]).unwrap().into_bytes();
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(321);
    for _i in 0..300 {
        let bit = rng.gen_range(0..mldsa65::SIG_LEN * 8);
        let mut sig_bad = sig;
        sig_bad[bit / 8] ^= 1u8 << (bit % 8);
        let sig_bad = Signature::try_from_bytes(&sig_bad).unwrap();
        assert!(!pk.verify(msg, &sig_bad, &[]), "bit {bit} flip accepted");
    }
}


// $ cargo test --release -- --ignored every_signature_bit_flip
#[ignore]
#[test]
fn every_signature_bit_flip() {
    let msg = b"bit flips";
    let (pk, sk) = KG::keygen_from_seed(&[4u8; 32]);
    let sig = sk.try_sign_deterministic(msg, &[]).unwrap().into_bytes();
    let pk_bytes = pk.into_bytes();
    for bit in 0..mldsa65::SIG_LEN * 8 {
        let mut sig_bad = sig;
        sig_bad[bit / 8] ^= 1u8 << (bit % 8);
        assert!(!mldsa65::verify_encoded(&pk_bytes, msg, &sig_bad), "bit {bit}");
    }
}


#[test]
fn test_wrong_key() {
    let msg = b"some message";
    let (pk1, sk1) = KG::keygen_from_seed(&[1u8; 32]);
    let (pk2, _sk2) = KG::keygen_from_seed(&[2u8; 32]);
    let sig = sk1.try_sign_deterministic(msg, &[]).unwrap();
    assert!(pk1.verify(msg, &sig, &[]));
    assert!(!pk2.verify(msg, &sig, &[]));
}


#[test]
fn test_deterministic_and_hedged() {
    let msg = b"test message";
    let (pk, sk) = mldsa65::generate_keypair(&[0u8; 32]).unwrap();

    let sig1 = mldsa65::sign(&sk, msg, None).unwrap();
    let sig2 = sk.try_sign_deterministic(msg, &[]).unwrap();
    assert_eq!(sig1, sig2);

    let rnd = [7u8; 32];
    let sig3 = mldsa65::sign(&sk, msg, Some(&rnd)).unwrap();
    assert_eq!(sig3, sk.try_sign_with_seed(&rnd, msg, &[]).unwrap());
    assert_ne!(sig1, sig3);

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(99);
    let sig4 = sk.try_sign_with_rng(&mut rng, msg, &[]).unwrap();
    let sig5 = sk.try_sign_with_rng(&mut rng, msg, &[]).unwrap();
    assert_ne!(sig4, sig5);

    for sig in [&sig1, &sig3, &sig4, &sig5] {
        assert!(mldsa65::verify(&pk, msg, sig));
    }
}


#[test]
fn test_hash_variants() {
    let msg = b"pre-hashed message";
    let (pk, sk) = KG::keygen_from_seed(&[5u8; 32]);
    let phs = [Ph::SHA256, Ph::SHA512, Ph::SHAKE128, Ph::SHAKE256];
    for (i, ph) in phs.iter().enumerate() {
        let sig = sk.try_hash_sign_with_seed(&[0u8; 32], msg, b"ctx", ph).unwrap();
        assert!(pk.hash_verify(msg, &sig, b"ctx", ph));
        assert!(!pk.hash_verify(msg, &sig, b"ctX", ph));
        assert!(!pk.verify(msg, &sig, b"ctx"));
        let other = &phs[(i + 1) % phs.len()];
        assert!(!pk.hash_verify(msg, &sig, b"ctx", other));
    }
}


#[test]
fn test_context_limits() {
    let msg = b"m";
    let (pk, sk) = KG::keygen_from_seed(&[6u8; 32]);
    let sig = sk.try_sign_deterministic(msg, &[0xAA; 255]).unwrap();
    assert!(pk.verify(msg, &sig, &[0xAA; 255]));
    assert_eq!(
        sk.try_sign_deterministic(msg, &[0xAA; 256]),
        Err(Error::ContextTooLong { len: 256 })
    );
    assert_eq!(
        sk.try_hash_sign_with_seed(&[0u8; 32], msg, &[0u8; 300], &Ph::SHA256),
        Err(Error::ContextTooLong { len: 300 })
    );
    assert!(!pk.verify(msg, &sig, &[0xAA; 256]));
}


#[test]
fn test_wrong_lengths() {
    let (pk, sk) = KG::keygen_from_seed(&[8u8; 32]);
    let pk_bytes = pk.into_bytes();
    let sk_bytes = sk.into_bytes();

    assert_eq!(
        PublicKey::try_from_bytes(&pk_bytes[..mldsa65::PK_LEN - 1]),
        Err(Error::MalformedEncoding {
            component: Component::PublicKey,
            expected: mldsa65::PK_LEN,
            actual: mldsa65::PK_LEN - 1
        })
    );
    assert_eq!(
        PrivateKey::try_from_bytes(&[sk_bytes.as_slice(), &[0]].concat()).err(),
        Some(Error::MalformedEncoding {
            component: Component::SecretKey,
            expected: mldsa65::SK_LEN,
            actual: mldsa65::SK_LEN + 1
        })
    );
    assert_eq!(
        Signature::try_from_bytes(&[]),
        Err(Error::MalformedEncoding {
            component: Component::Signature,
            expected: mldsa65::SIG_LEN,
            actual: 0
        })
    );
    assert_eq!(
        mldsa65::generate_keypair(&[0u8; 16]).err(),
        Some(Error::InvalidSeedLength { expected: 32, actual: 16 })
    );
}


#[test]
fn test_malformed_secret_key() {
    let (_pk, sk) = KG::keygen_from_seed(&[9u8; 32]);
    let mut sk_bytes = sk.into_bytes();
    // s1 coefficients are η minus a 4-bit value; nibble 15 lands outside [−η, η]
    sk_bytes[128] = 0xFF;
    assert_eq!(
        PrivateKey::try_from_bytes(&sk_bytes[..]).err(),
        Some(Error::InvalidCoefficients { component: Component::SecretKey })
    );
}


#[test]
fn test_malformed_hint() {
    let (pk, sk) = KG::keygen_from_seed(&[10u8; 32]);
    let sig = sk.try_sign_deterministic(b"hint", &[]).unwrap();
    let mut sig_bytes = sig.into_bytes();
    // The final K bytes are cumulative hint counts; exceeding ω is malformed
    sig_bytes[mldsa65::SIG_LEN - 1] = 56;
    let sig_bad = Signature::try_from_bytes(&sig_bytes).unwrap();
    assert!(!pk.verify(b"hint", &sig_bad, &[]));
    assert!(!mldsa65::verify_encoded(&pk.into_bytes(), b"hint", &sig_bytes));
}


#[test]
fn test_threads() {
    let (pk, sk) = KG::keygen_from_seed(&[11u8; 32]);
    let handles: Vec<_> = (0u8..4)
        .map(|i| {
            let (pk, sk) = (pk.clone(), sk.clone());
            std::thread::spawn(move || {
                let msg = [i; 16];
                let sig = sk.try_sign_deterministic(&msg, &[]).unwrap();
                assert!(pk.verify(&msg, &sig, &[]));
                sig
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let sig = handle.join().unwrap();
        assert_eq!(sig, sk.try_sign_deterministic(&[i as u8; 16], &[]).unwrap());
    }
}
