//! Configuration module for the dashboard core
//!
//! Compile-time limits live in [`constants`]; user preferences that may be
//! changed per run (environment or TOML file) live in [`runtime`].

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    ConfigError, GroupingPreferences, LoaderPreferences, LoggingPreferences, RuntimeConfig,
};
