//! Core - configuration and startup

pub mod config;
pub mod studio;

pub use config::Config;
pub use studio::Studio;
