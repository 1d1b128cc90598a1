pub mod models;
pub mod service;

pub use models::{OverviewSummary, TypeShare, TypeSplit};
pub use service::{summarize, TOP_CATEGORY_LIMIT};
