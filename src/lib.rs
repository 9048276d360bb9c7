pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod store;
