//! Global CLI options passed to all command handlers

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// For most options, the precedence is: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file defaults are resolved later in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.panther/config.yaml)
    pub config: Option<String>,

    /// Convert timestamp fields, regardless of the config file
    pub convert: bool,

    /// Custom API base URL for development/testing
    pub api_base: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            convert: cli.convert,
            api_base: cli.api_base.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get API base override as `Option<&str>`.
    pub fn api_base_ref(&self) -> Option<&str> {
        self.api_base.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "panther",
            "--format",
            "json",
            "--config",
            "/custom/path",
            "--convert",
            "status",
        ]);
        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.config_ref(), Some("/custom/path"));
        assert!(opts.convert);
    }

    #[test]
    fn test_global_options_none_accessors() {
        let opts = GlobalOptions {
            format: OutputFormat::Pretty,
            config: None,
            convert: false,
            api_base: None,
        };

        assert_eq!(opts.config_ref(), None);
        assert_eq!(opts.api_base_ref(), None);
    }
}
