pub mod handlers;
pub mod models;
mod service;

pub use handlers::{configure, health_check};
pub use models::ReportContext;
pub use service::ReportService;
