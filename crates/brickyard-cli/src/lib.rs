//! Command implementations behind the `brickyard` binary.

pub mod commands;
pub mod config;
pub mod watch;

pub use config::AppConfig;
