pub mod aggregate;
pub mod analytics;
pub mod bucket;
pub mod config;
pub mod error;
pub mod record;
