pub mod config;
pub mod diagnostics;
pub mod error;
pub mod latency;
pub mod peripheral;
pub mod report;
pub mod state;
