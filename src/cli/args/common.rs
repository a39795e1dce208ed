//! Common CLI types shared across commands

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - bordered tables and aligned records
    #[default]
    Pretty,
    /// Table format - borderless columns, one row per entry
    Table,
    /// JSON format - full records wrapped with metadata
    Json,
}
