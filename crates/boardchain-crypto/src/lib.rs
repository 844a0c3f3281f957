//! Subscription-token minting.
//!
//! A data node hands out one fixed token at startup (see
//! `boardchain-node::NodeConfig::subscribe_token`); clients present it back
//! on `BoardRequest::Subscribe` to open an event stream. Minting only needs
//! to be unguessable, not reversible or keyed to anything else, so this
//! crate is intentionally just `rand` feeding `blake3`.

use rand::RngCore;

/// Generates a fresh, unguessable subscription token.
///
/// 32 bytes of OS randomness hashed with blake3 and hex-encoded, so the
/// token is a fixed-width opaque string regardless of how the RNG fills its
/// bytes.
pub fn mint_subscribe_token() -> String {
    let mut seed = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut seed);
    blake3::hash(&seed).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_64_hex_characters() {
        let token = mint_subscribe_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn successive_tokens_differ() {
        assert_ne!(mint_subscribe_token(), mint_subscribe_token());
    }
}
