pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod listing;
pub mod mirror;
pub mod store;
