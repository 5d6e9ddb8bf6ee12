//! `fieldtrack-auth`: shared-password login and signed session tokens.
//!
//! Decoupled from HTTP. The API crate extracts bearer tokens and hands them
//! to [`SessionSigner::verify`]; session state lives behind [`SessionStore`].

pub mod claims;
pub mod password;
pub mod session;
pub mod token;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::PasswordGate;
pub use session::{InMemorySessionStore, SessionId, SessionStore};
pub use token::SessionSigner;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid password")]
    InvalidPassword,

    #[error("missing or malformed bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenValidationError),

    #[error("unknown or expired session")]
    UnknownSession,
}
