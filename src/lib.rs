//! Library crate for tcp-sweep: a concurrent multi-target TCP connect scanner.
pub mod addr;
pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod ports;
pub mod probe;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod targets;
pub mod types;
