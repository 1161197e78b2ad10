//! Process runtime helpers shared by the credex binaries: layered
//! configuration loading, home directory resolution and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, AppConfigProvider, CliArgs, LoggingConfig, Section,
    ServerConfig,
};
