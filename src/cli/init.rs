//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};
use panther_seim::config::Config;
use panther_seim::{ClientConfig, Panther};

use crate::cli::args::GlobalOptions;

/// Run the init command
///
/// Prompts for the domain and API token, checks them against the API, and
/// writes the config file.
pub async fn run(opts: &GlobalOptions) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();
    let existing = Config::load_at(opts.config_ref())?;

    println!("{}", "Welcome to the Panther CLI!".bold().green());
    println!("Let's set up your Panther configuration.\n");

    let mut domain_prompt = Input::<String>::with_theme(&theme)
        .with_prompt("Panther domain (e.g. acme.runpanther.net)");
    if let Some(domain) = &existing.domain {
        domain_prompt = domain_prompt.default(domain.clone());
    }
    let domain = domain_prompt.interact_text()?;

    let api_key: String = Password::with_theme(&theme)
        .with_prompt("Enter your Panther API token")
        .interact()?;

    let convert = Confirm::with_theme(&theme)
        .with_prompt("Convert timestamps in output?")
        .default(existing.convert)
        .interact()?;

    println!("\n{}", "Checking credentials...".cyan());
    let mut client_config = ClientConfig::new(api_key.clone(), domain.clone());
    if let Some(base) = opts.api_base_ref() {
        client_config = client_config.api_base(base);
    }
    let client = Panther::with_config(client_config)?;

    match client.users().list().await {
        Ok(users) => {
            let count = users.as_list().map_or(0, |u| u.len());
            println!("{} Connected ({} users visible)", "✓".green(), count);
        }
        Err(err) => {
            println!("{} Could not reach Panther: {}", "⚠".yellow(), err);
            let save = Confirm::with_theme(&theme)
                .with_prompt("Save the configuration anyway?")
                .default(false)
                .interact()?;
            if !save {
                return Ok(());
            }
        }
    }

    let config = Config {
        api_key: Some(api_key),
        domain: Some(domain),
        convert,
        ..existing
    };
    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "panther status".cyan());
    println!("  {} - List recent alerts", "panther alert list".cyan());

    Ok(())
}
