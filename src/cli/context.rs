//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, authentication validation, and client initialization.

use log::debug;
use panther_seim::Panther;
use panther_seim::config::Config;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Loaded configuration, with environment overrides applied
    pub config: Config,
    /// Client for the configured Panther domain
    pub client: Panther,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded, or the token or domain is missing.
    pub fn new(opts: &GlobalOptions) -> anyhow::Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?.with_env_overrides();
        if opts.convert {
            config.convert = true;
        }

        let mut client_config = config.client_config()?;
        if let Some(base) = opts.api_base_ref() {
            client_config = client_config.api_base(base);
        }
        let client = Panther::with_config(client_config)?;
        debug!("Using Panther domain {}", client.domain());

        Ok(Self {
            config,
            client,
            format: opts.format,
        })
    }
}
