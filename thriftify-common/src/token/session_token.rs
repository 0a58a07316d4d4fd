use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::token::{Expiring, Token, TokenError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionTokenClaims {
    #[serde(rename = "sid")]
    pub session_id: String,
    #[serde(rename = "usr")]
    pub username: String,
    #[serde(rename = "exp")]
    pub expiration: u64,
}

impl Expiring for SessionTokenClaims {
    fn expiration(&self) -> u64 {
        self.expiration
    }
}

/// Carried in the session cookie. The claims name a server-side session, so a valid
/// signature alone is not enough to be signed in.
pub struct SessionToken {}

impl SessionToken {
    pub fn sign_new(
        session_id: &str,
        username: &str,
        lifetime: Duration,
        signing_key: &[u8],
    ) -> Result<String, TokenError> {
        let expiration = (SystemTime::now() + lifetime)
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TokenError::SigningFailed)?
            .as_secs();

        let claims = SessionTokenClaims {
            session_id: String::from(session_id),
            username: String::from(username),
            expiration,
        };

        Self::encode_signed(&claims, signing_key)
    }
}

impl Token for SessionToken {
    type Claims = SessionTokenClaims;
}
