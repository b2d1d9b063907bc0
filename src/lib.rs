pub mod ai;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod schema;
