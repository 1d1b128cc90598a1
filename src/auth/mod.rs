mod jwt;
mod models;

// Re-export for use in extractors
pub use jwt::{decode_token, extract_token};
pub use models::TokenClaims;
