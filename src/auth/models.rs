use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT access token claims. Tokens are issued elsewhere; this service only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: Uuid, // User ID
    /// Permission strings, e.g. `view all categories` or `view category: <uuid>`
    #[serde(default)]
    pub permissions: Vec<String>,
    pub iat: usize, // Issued at
    pub exp: usize, // Expiration
}
