pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, Commands, OutputFormat};
pub use commands::CommandHandler;
pub use config::{ConfigManager, DockformerConfig};
pub use error::{CliError, Result};
pub use logging::setup_logging;
