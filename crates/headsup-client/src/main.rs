//! headsup CLI entry point.

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;

use headsup_client::cli::{Cli, Command, ConfigAction, SettingsAction};
use headsup_client::commands;
use headsup_client::config::ClientConfig;
use headsup_client::error::ClientResult;
use headsup_client::settings::TomlSettingsStore;
use headsup_core::{TracingConfig, init_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(cli));
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config_path();
    let command = cli.command.unwrap_or_default();
    let tracing = match &command {
        Command::Run { log_format } if !cli.debug => {
            TracingConfig::daemon().with_format(*log_format)
        }
        Command::Run { log_format } => TracingConfig::cli(true).with_format(*log_format),
        _ => TracingConfig::cli(cli.debug),
    };
    init_tracing(tracing)?;

    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    let settings = TomlSettingsStore::new(ClientConfig::settings_path_for(&config_path));

    match command {
        Command::Run { .. } => commands::run::run(commands::context(&config, &config_path)?).await,
        Command::Next { json } => {
            let app = commands::context(&config, &config_path)?;
            println!("{}", commands::query::next(&app, Utc::now(), json).await?);
            Ok(())
        }
        Command::Agenda { ids } => {
            let app = commands::context(&config, &config_path)?;
            print!("{}", commands::query::agenda(&app, Utc::now(), ids).await?);
            Ok(())
        }
        Command::Alert { event_id } => {
            let app = commands::context(&config, &config_path)?;
            commands::run::alert(app, Utc::now(), &event_id).await
        }
        Command::Link { event_id, open } => {
            let app = commands::context(&config, &config_path)?;
            commands::query::print_link(&app, Utc::now(), &event_id, open).await
        }
        Command::Settings { action } => match action {
            SettingsAction::List => {
                print!("{}", commands::settings::list(&settings));
                Ok(())
            }
            SettingsAction::Get { key } => {
                println!("{}", commands::settings::get(&settings, &key)?);
                Ok(())
            }
            SettingsAction::Set { key, value } => {
                let value = commands::settings::set(&settings, &key, &value)?;
                println!("{key} = {value}");
                Ok(())
            }
            SettingsAction::Toggle { key } => {
                let value = commands::settings::toggle(&settings, &key)?;
                println!("{key} = {value}");
                Ok(())
            }
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
