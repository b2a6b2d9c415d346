pub mod collector;
pub mod config;
pub mod database;
pub mod errors;
pub mod github;
pub mod models;
pub mod pipeline;
pub mod transform;
