//! API token commands

use colored::Colorize;
use panther_seim::config::Config;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;

/// Rotate the API token and store the replacement in the config file.
///
/// The old token stops working once Panther issues the new one.
pub async fn rotate(opts: &GlobalOptions) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let token = ctx.client.tokens().rotate().await?;

    // environment overrides are not persisted, apart from a domain the file lacks
    let mut stored = Config::load_at(opts.config_ref())?;
    stored.api_key = Some(token);
    if stored.domain.is_none() {
        stored.domain = ctx.config.domain.clone();
    }
    stored.save_at(opts.config_ref())?;

    println!("{} API token rotated and saved", "✓".green());
    Ok(())
}
