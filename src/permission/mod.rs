pub mod models;
pub mod service;

pub use models::PermissionScope;
pub use service::{apply_scope, resolve_scope, ALL_CATEGORIES_PERMISSION};
