#![no_main]
use libfuzzer_sys::fuzz_target;
use mldsa65::traits::{KeyGen, Signer, Verifier};
use mldsa65::{Ph, KG};


fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Static key pair for speed
    let (pk, sk) = KG::keygen_from_seed(&[42u8; 32]);

    // First byte selects the context length
    let ctx_len = (data[0] as usize) % 8;
    let (ctx, msg) = data.split_at(ctx_len.min(data.len()));

    if let Ok(sig) = sk.try_sign_deterministic(msg, ctx) {
        assert!(pk.verify(msg, &sig, ctx));

        if !msg.is_empty() {
            let mut modified_msg = msg.to_vec();
            modified_msg[0] ^= 1;
            assert!(!pk.verify(&modified_msg, &sig, ctx));
        }

        let mut modified_ctx = ctx.to_vec();
        modified_ctx.push(1);
        assert!(!pk.verify(msg, &sig, &modified_ctx));
    }

    for ph in [Ph::SHA256, Ph::SHA512, Ph::SHAKE128, Ph::SHAKE256] {
        if let Ok(sig) = sk.try_hash_sign_with_seed(&[0u8; 32], msg, ctx, &ph) {
            assert!(pk.hash_verify(msg, &sig, ctx, &ph));
            assert!(!pk.verify(msg, &sig, ctx));
            let different_ph = match ph {
                Ph::SHA256 => Ph::SHA512,
                _ => Ph::SHA256,
            };
            assert!(!pk.hash_verify(msg, &sig, ctx, &different_ph));
        }
    }
});
