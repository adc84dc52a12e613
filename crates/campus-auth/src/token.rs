//! HS256 bearer tokens for clubs.

use campus_types::{ActorIdentity, AuthRejection, Authorizer};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clubs::Club;
use crate::error::AuthError;

/// Token lifetime used when the configuration does not set one.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a club token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubClaims {
    /// Club id, as a decimal string.
    pub sub: String,
    pub name: String,
    pub email: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Issues and verifies club tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_hours", &self.ttl.num_hours())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service signing with `secret`. Tokens live `ttl_hours`.
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    /// Signs a token for `club`.
    pub fn issue(&self, club: &Club) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = ClubClaims {
            sub: club.id.to_string(),
            name: club.name.clone(),
            email: club.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Checks signature and expiry and returns the claims.
    pub fn decode(&self, token: &str) -> Result<ClubClaims, AuthError> {
        let data = decode::<ClubClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl Authorizer for TokenService {
    fn verify(&self, token: &str) -> Result<ActorIdentity, AuthRejection> {
        let claims = self
            .decode(token)
            .map_err(|e| AuthRejection::Invalid(e.to_string()))?;
        let club_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthRejection::Invalid(format!("non-numeric subject {:?}", claims.sub)))?;
        Ok(ActorIdentity {
            club_id,
            name: claims.name,
            email: claims.email,
        })
    }
}
