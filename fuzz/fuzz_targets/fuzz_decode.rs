#![no_main]

use libfuzzer_sys::fuzz_target;
use mldsa65::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa65::{PrivateKey, PublicKey, Signature, KG, PK_LEN, SIG_LEN, SK_LEN};

fuzz_target!(|data: [u8; SK_LEN + SIG_LEN + PK_LEN]| {
    let (sk_bytes, rest) = data.split_at(SK_LEN);
    let (sig_bytes, pk_bytes) = rest.split_at(SIG_LEN);

    // A 'fuzzy' secret key either decodes and signs, or is rejected
    if let Ok(sk) = PrivateKey::try_from_bytes(sk_bytes) {
        let _sig = sk.try_sign_deterministic(&[0u8, 1, 2, 3], &[]);
        let re_encoded = sk.into_bytes();
        assert_eq!(&re_encoded[..], sk_bytes);
    }

    // A 'fuzzy' signature against a good key must never panic, and almost surely fails
    let (pk, _) = KG::keygen_from_seed(&[0u8; 32]);
    let sig = Signature::try_from_bytes(sig_bytes).unwrap();
    let _v = pk.verify(&[0u8, 1, 2, 3], &sig, &[]);
    let _v = mldsa65::verify_encoded(&pk.into_bytes(), &[0u8, 1, 2, 3], sig_bytes);

    // Every public key byte string of the right length decodes
    let pk = PublicKey::try_from_bytes(pk_bytes).unwrap();
    assert_eq!(&pk.clone().into_bytes()[..], pk_bytes);
    let (_, sk) = KG::keygen_from_seed(&[1u8; 32]);
    let sig2 = sk.try_sign_deterministic(&[0u8, 1, 2, 3], &[]).unwrap();
    let _v = pk.verify(&[0u8, 1, 2, 3], &sig2, &[]);
});
