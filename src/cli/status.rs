//! Status command implementation

use colored::Colorize;
use panther_seim::config::{Config, ENV_API_TOKEN, ENV_DOMAIN};

use crate::cli::args::GlobalOptions;

/// Show the last four characters of a secret.
fn mask(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", tail)
}

fn source_of(var: &str) -> &'static str {
    if std::env::var(var).is_ok_and(|v| !v.is_empty()) {
        " (from environment)"
    } else {
        ""
    }
}

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> anyhow::Result<()> {
    println!("{}\n", "Panther Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display().to_string().cyan(),
            "(not found)".dimmed()
        );
    }
    println!();

    let config = Config::load_at(opts.config_ref())?.with_env_overrides();

    match config.api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => println!(
            "{} API token configured: {}{}",
            "✓".green(),
            mask(key),
            source_of(ENV_API_TOKEN).dimmed()
        ),
        None => {
            println!("{} API token not configured", "✗".red());
            println!("  → Run 'panther init' or set {}", ENV_API_TOKEN);
        }
    }

    match config.domain.as_deref().filter(|d| !d.is_empty()) {
        Some(domain) => println!(
            "{} Domain: {}{}",
            "✓".green(),
            domain,
            source_of(ENV_DOMAIN).dimmed()
        ),
        None => {
            println!("{} Domain not configured", "✗".red());
            println!("  → Run 'panther init' or set {}", ENV_DOMAIN);
        }
    }

    let convert = config.convert || opts.convert;
    println!(
        "{} Timestamp conversion {}",
        "○".dimmed(),
        if convert { "enabled" } else { "disabled" }
    );

    if let Some(secs) = config.timeout_secs {
        println!("{} Request timeout: {}s", "○".dimmed(), secs);
    }
    if let Some(base) = opts.api_base_ref() {
        println!("{} Custom API base: {}", "○".dimmed(), base.cyan());
    }

    println!();
    Ok(())
}
