pub mod session_token;

use base64::engine::general_purpose::URL_SAFE as b64_urlsafe;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_LENGTH: usize = 32;
const MAX_TOKEN_LENGTH: usize = 4096;

#[derive(Debug)]
pub enum TokenError {
    TokenInvalid,
    TokenExpired,
    TokenMissing,
    SigningFailed,
}

impl std::error::Error for TokenError {}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::TokenInvalid => write!(f, "TokenInvalid"),
            TokenError::TokenExpired => write!(f, "TokenExpired"),
            TokenError::TokenMissing => write!(f, "TokenMissing"),
            TokenError::SigningFailed => write!(f, "SigningFailed"),
        }
    }
}

pub trait Expiring {
    fn expiration(&self) -> u64;
}

/// A token whose signature has not yet been checked.
#[derive(Debug)]
pub struct DecodedToken<C: Expiring + DeserializeOwned> {
    json: Vec<u8>,
    signature: Vec<u8>,
    pub claims: C,
}

impl<C: Expiring + DeserializeOwned> DecodedToken<C> {
    pub fn verify(&self, key: &[u8]) -> Result<&C, TokenError> {
        if !signature_matches(&self.json, &self.signature, key) {
            return Err(TokenError::TokenInvalid);
        }

        let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
            return Err(TokenError::TokenInvalid);
        };

        if self.claims.expiration() <= now.as_secs() {
            return Err(TokenError::TokenExpired);
        }

        Ok(&self.claims)
    }
}

/// Tokens are the URL-safe base64 encoding of the JSON claims followed by an HMAC-SHA256
/// signature over that JSON.
pub trait Token {
    type Claims: Expiring + Serialize + DeserializeOwned;

    fn encode_signed(claims: &Self::Claims, signing_key: &[u8]) -> Result<String, TokenError> {
        let mut token_unencoded =
            serde_json::to_vec(claims).map_err(|_| TokenError::SigningFailed)?;

        let mut mac =
            HmacSha256::new_from_slice(signing_key).map_err(|_| TokenError::SigningFailed)?;
        mac.update(&token_unencoded);
        token_unencoded.extend_from_slice(&mac.finalize().into_bytes());

        Ok(b64_urlsafe.encode(&token_unencoded))
    }

    fn decode(token: &str) -> Result<DecodedToken<Self::Claims>, TokenError> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenError::TokenInvalid);
        }

        let decoded_token = b64_urlsafe
            .decode(token)
            .map_err(|_| TokenError::TokenInvalid)?;

        if decoded_token.len() <= SIGNATURE_LENGTH {
            return Err(TokenError::TokenInvalid);
        }

        let (json, signature) = decoded_token.split_at(decoded_token.len() - SIGNATURE_LENGTH);
        let claims = serde_json::from_slice(json).map_err(|_| TokenError::TokenInvalid)?;

        Ok(DecodedToken {
            json: Vec::from(json),
            signature: Vec::from(signature),
            claims,
        })
    }
}

fn signature_matches(json: &[u8], signature: &[u8], key: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };

    mac.update(json);
    let correct_signature = mac.finalize().into_bytes();

    if correct_signature.len() != signature.len() || signature.is_empty() {
        return false;
    }

    // Bitwise comparison so the time taken doesn't depend on where the first mismatch is
    let mut signatures_dont_match = 0u8;
    for (correct_byte, byte) in correct_signature.iter().zip(signature) {
        signatures_dont_match |= correct_byte ^ byte;
    }

    signatures_dont_match == 0
}
