pub mod config;
pub mod logging;

// Crawl-and-resolve pipeline
pub mod browser;
pub mod classify;
pub mod crawl;
pub mod download;
pub mod hierarchy;
pub mod queue;
pub mod resolve;
pub mod sanitize;
pub mod session;
