//! mic-recorder CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use mic_recorder::cli::{
    app::{load_merged_config, run_convert, run_record, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use mic_recorder::domain::error::ConfigError;
use mic_recorder::infrastructure::{list_input_devices, XdgConfigStore};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let presenter = Presenter::new();
    let store = XdgConfigStore::from_override(cli.config.clone());

    match cli.command {
        Some(Commands::Config { action }) => {
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                let code = match e {
                    ConfigError::ValidationError { .. } => EXIT_USAGE_ERROR,
                    _ => EXIT_ERROR,
                };
                return ExitCode::from(code);
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Devices) => match list_input_devices() {
            Ok(devices) if devices.is_empty() => {
                presenter.warn("No input devices found");
                ExitCode::SUCCESS
            }
            Ok(devices) => {
                for device in devices {
                    presenter.device(&device.name, device.is_default);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                presenter.error(&e.to_string());
                ExitCode::from(EXIT_ERROR)
            }
        },
        Some(Commands::Convert {
            ref input,
            ref encoder,
            ref output,
        }) => {
            let config = load_merged_config(&store, encoder.to_config()).await;
            run_convert(config, input.clone(), output.clone()).await
        }
        None => {
            let config = load_merged_config(&store, cli.record_config()).await;
            run_record(config, cli.output.clone()).await
        }
    }
}

/// Log to stderr so stdout stays reserved for command output
fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
