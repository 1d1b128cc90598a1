pub mod aggregation;
pub mod auth;
pub mod balance;
pub mod config;
pub mod errors;
pub mod expense;
pub mod extractors;
pub mod openapi;
pub mod overview;
pub mod period;
pub mod permission;
pub mod report;
pub mod store;
pub mod transaction;
