use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{err, ok, Ready};
use secrecy::Secret;
use uuid::Uuid;

use crate::auth::{decode_token, extract_token};
use crate::errors::AppError;
use crate::permission::{resolve_scope, PermissionScope};

/// Extractor that validates the JWT and provides the caller's id and permissions.
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub permissions: Vec<String>,
}

impl AuthenticatedUser {
    /// Category visibility for this request
    pub fn scope(&self) -> PermissionScope {
        resolve_scope(&self.permissions)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Extract JWT secret from app data
        let jwt_secret = match req.app_data::<web::Data<Secret<String>>>() {
            Some(secret) => secret,
            None => {
                return err(AppError::InternalError(
                    "JWT secret not configured".to_string(),
                ))
            }
        };

        let token = match extract_token(req) {
            Ok(t) => t,
            Err(e) => return err(e),
        };

        match decode_token(token, jwt_secret.get_ref()) {
            Ok(claims) => ok(AuthenticatedUser {
                user_id: claims.sub,
                permissions: claims.permissions,
            }),
            Err(e) => err(e),
        }
    }
}
