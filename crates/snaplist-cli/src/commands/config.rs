//! Config command handlers

use anyhow::{Context, Result};

use snaplist_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => output.print_json_value(&config),
        OutputFormat::Quiet => {
            println!("{}", config.server_url);
        }
        OutputFormat::Human => {
            let not_set = || "(not set)".to_string();
            println!("Configuration:");
            println!("  server_url:                 {}", config.server_url);
            println!("  bind:                       {}", config.bind);
            println!("  store_url:                  {}", config.store_url);
            println!(
                "  reconnect_initial_delay_ms: {}",
                config.reconnect_initial_delay_ms
            );
            println!(
                "  reconnect_max_delay_ms:     {}",
                config.reconnect_max_delay_ms
            );
            println!(
                "  reconnect_max_attempts:     {}",
                config.reconnect_max_attempts
            );
            println!(
                "  request_timeout_secs:       {}",
                config
                    .request_timeout_secs
                    .map(|s| s.to_string())
                    .unwrap_or_else(not_set)
            );
            println!(
                "  log_file:                   {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(not_set)
            );
            println!("  data_dir:                   {}", config.data_dir.display());
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    config.set_value(&key, &value)?;
    config.save().context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
