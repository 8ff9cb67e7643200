pub mod api;
pub mod artifacts;
pub mod config;
pub mod db;
pub mod error;
pub mod ev;
pub mod fetcher;
pub mod matcher;
pub mod refresh;
pub mod stages;
pub mod types;
