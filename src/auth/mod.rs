use serde::{Deserialize, Serialize};

pub mod jwks;

pub use jwks::{AuthError, JwksVerifier, KeyCache};

/// Session-token claims issued by the identity provider. Only the subject
/// identifier is consumed downstream; the rest is validated.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}
