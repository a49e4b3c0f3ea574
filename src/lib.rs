pub mod config;
pub mod data;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod parser;
pub mod session;
pub mod views;
