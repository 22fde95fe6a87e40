//! Config command - read and edit settings.json

use anyhow::Result;
use clap::Subcommand;

use ledgerline_core::config::{Config, CALLER_CERT_ENV, CALLER_CERT_KEY, TIMEOUT_KEY};
use ledgerline_core::LogEvent;

use super::{get_data_dir, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Change a setting (registrar.timeoutSecs, callerCertificate); `none` clears it
    Set {
        key: String,
        value: String,
    },
    /// Show the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_file(&data_dir)?;
            config.set(&key, &value)?;
            config.save(&data_dir)?;
            log_event(&get_logger(), LogEvent::new("setting_changed").with_command("config"));
            output::success(&format!("Updated {}", key));
        }
        ConfigCommands::Show { json } => {
            let config = Config::load(&data_dir)?;
            let caller_certificate = config
                .caller_certificate
                .as_ref()
                .map(|p| p.display().to_string());

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        (TIMEOUT_KEY): config.registrar_timeout_secs,
                        (CALLER_CERT_KEY): caller_certificate,
                    })
                );
                return Ok(());
            }

            let mut table = output::create_table();
            table.add_row(vec![
                TIMEOUT_KEY.to_string(),
                config
                    .registrar_timeout_secs
                    .map(|s| format!("{}s", s))
                    .unwrap_or_else(|| "none".to_string()),
            ]);
            table.add_row(vec![
                CALLER_CERT_KEY.to_string(),
                caller_certificate.unwrap_or_else(|| "none".to_string()),
            ]);
            println!("{}", table);
            if std::env::var_os(CALLER_CERT_ENV).is_some_and(|v| !v.is_empty()) {
                output::info(&format!("{} overrides {}", CALLER_CERT_ENV, CALLER_CERT_KEY));
            }
        }
    }

    Ok(())
}
