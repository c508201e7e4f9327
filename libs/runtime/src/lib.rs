//! Process-level plumbing shared by the card portal binaries:
//! layered configuration, home directory resolution and logging bootstrap.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, ClientConfig, LoggingConfig, Section};
