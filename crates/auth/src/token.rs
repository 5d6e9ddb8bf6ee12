use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};
use crate::session::SessionId;

/// HS256 signer/verifier for session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, sid: SessionId, now: DateTime<Utc>) -> Result<String, TokenValidationError> {
        let claims = SessionClaims::new(sid, now, now + self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenValidationError::Malformed)
    }

    /// Decode, check the signature, then check the time window against `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The window is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "session token rejected");
            TokenValidationError::Malformed
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
