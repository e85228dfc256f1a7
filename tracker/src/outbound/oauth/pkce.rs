//! PKCE verifier and S256 challenge (RFC 7636).

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

pub(super) const CHALLENGE_METHOD: &str = "S256";

/// 32 random bytes encode to a 43-character verifier, the minimum allowed.
const VERIFIER_ENTROPY_BYTES: usize = 32;

pub(super) struct PkcePair {
    verifier: Zeroizing<String>,
    challenge: String,
}

impl PkcePair {
    pub(super) fn generate() -> Self {
        let mut entropy = Zeroizing::new([0_u8; VERIFIER_ENTROPY_BYTES]);
        rand::thread_rng().fill_bytes(&mut *entropy);
        Self::from_verifier(URL_SAFE_NO_PAD.encode(&*entropy))
    }

    pub(super) fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier: Zeroizing::new(verifier),
            challenge,
        }
    }

    pub(super) fn verifier(&self) -> &str {
        &self.verifier
    }

    pub(super) fn challenge(&self) -> &str {
        &self.challenge
    }
}
