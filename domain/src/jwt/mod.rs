//! Verification of the bearer tokens presented when a client opens a realtime connection.
//!
//! Tokens are HS256 JWTs. Issuing them belongs to the authentication service; this
//! module only mints tokens for developer tooling and tests, and answers the single
//! question the connection endpoint needs: which user does this token belong to?
//!
//! # Example
//!
//! ```rust
//! use domain::jwt::{AccessTokens, TokenVerifier};
//! use std::time::Duration;
//!
//! let tokens = AccessTokens::new("secret");
//! let user_id = domain::Id::new_v4();
//! let token = tokens.issue(user_id, Duration::from_secs(60)).unwrap();
//! assert_eq!(tokens.verify(&token).unwrap(), user_id);
//! ```

use crate::error::{AuthErrorKind, Error};
use crate::UserId;
use chrono::Utc;
use claims::{TokenType, UserClaims};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use std::time::Duration;

pub(crate) mod claims;

/// Resolves a presented token to the identity it was issued for.
pub trait TokenVerifier: Send + Sync {
    /// Rejects expired, malformed, wrongly signed and non-access tokens.
    fn verify(&self, token: &str) -> Result<UserId, Error>;
}

/// HMAC-backed access token handling.
pub struct AccessTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AccessTokens {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mint an access token for `user_id` that expires after `ttl`.
    pub fn issue(&self, user_id: UserId, ttl: Duration) -> Result<String, Error> {
        self.sign(user_id, TokenType::Access, ttl)
    }

    fn sign(&self, user_id: UserId, token_type: TokenType, ttl: Duration) -> Result<String, Error> {
        let now = Utc::now().timestamp().max(0) as usize;
        let claims = UserClaims {
            user_id: user_id.to_string(),
            token_type,
            iat: now,
            exp: now + ttl.as_secs() as usize,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

impl TokenVerifier for AccessTokens {
    fn verify(&self, token: &str) -> Result<UserId, Error> {
        let claims = decode::<UserClaims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.token_type != TokenType::Access {
            debug!("Rejected {:?} token presented as access token", claims.token_type);
            return Err(Error::auth(AuthErrorKind::WrongTokenType));
        }

        claims.user_id.parse::<UserId>().map_err(|e| {
            warn!("Token carries a malformed user id: {e}");
            Error::auth(AuthErrorKind::InvalidToken)
        })
    }
}
