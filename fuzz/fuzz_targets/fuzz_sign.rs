#![no_main]
use libfuzzer_sys::fuzz_target;
use mldsa65::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa65::KG;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;


// Deterministic RNG from the leading input bytes
fn create_rng(seed_data: &[u8]) -> ChaCha20Rng {
    let mut seed = [0u8; 32];
    let len = seed_data.len().min(32);
    seed[..len].copy_from_slice(&seed_data[..len]);
    ChaCha20Rng::from_seed(seed)
}


fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let mut rng = create_rng(data);
    let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();

    let ctx_len = (data[0] as usize) % 8;
    let (ctx, msg) = data.split_at(ctx_len.min(data.len()));

    let sig1 = sk.try_sign_with_rng(&mut rng, msg, ctx).unwrap();
    let sig2 = sk.try_sign_with_rng(&mut rng, msg, ctx).unwrap();
    assert!(sig1 != sig2);
    assert!(pk.verify(msg, &sig1, ctx));
    assert!(pk.verify(msg, &sig2, ctx));

    let derived_pk = sk.get_public_key();
    assert!(derived_pk.clone().into_bytes() == pk.into_bytes());
    assert!(derived_pk.verify(msg, &sig1, ctx));
});
