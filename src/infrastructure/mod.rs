pub mod cache;
pub mod config;
pub mod engines;
pub mod http;
pub mod repositories;
pub mod scheduler;
