// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Flow | List | Retire | Revive | Graft | Options | Configs | Version
//! ```

use std::process::ExitCode;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use git_mux::cli::global::GlobalOptions;
use git_mux::cli::{self, Command};
use git_mux::cmd::branch::{run_graft_command, run_retire_command, run_revive_command};
use git_mux::cmd::config::{run_configs_command, run_options_command};
use git_mux::cmd::flow::run_flow_command;
use git_mux::cmd::list::run_list_command;
use git_mux::config::loader::ConfigLoader;
use git_mux::config::types::GlobalConfig;
use git_mux::config::{Config, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use git_mux::engine::Engine;
use git_mux::error::Result;
use git_mux::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let command = match cli.command {
        Some(Command::Version) => {
            handle_version_command();
            return ExitCode::SUCCESS;
        }
        Some(Command::Configs) => {
            return report(
                build_config_loader(&cli.global)
                    .map(|loader| run_configs_command(&loader.format_loaded_files())),
            );
        }
        Some(command) => command,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&build_log_config(&config.global)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    report(dispatch_command(command, config).await)
}

fn build_log_config(global: &GlobalConfig) -> LogConfig {
    LogConfig::builder()
        .with_console_level(global.output_log_level)
        .with_file_level(global.file_log_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

async fn dispatch_command(command: Command, config: Config) -> Result<()> {
    if matches!(command, Command::Options) {
        run_options_command(&config);
        return Ok(());
    }

    let cancel_token = CancellationToken::new();
    let watcher_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, stopping after the current component...");
            watcher_token.cancel();
        }
    });

    // Engine work is synchronous git plumbing.
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut engine = Engine::new(&config)?.with_cancel_token(cancel_token);
        match &command {
            Command::Flow(args) => run_flow_command(args, &mut engine),
            Command::List(args) => run_list_command(args, &mut engine),
            Command::Retire(args) => run_retire_command(args, &mut engine),
            Command::Revive(args) => run_revive_command(args, &mut engine),
            Command::Graft(args) => run_graft_command(args, &mut engine),
            Command::Options | Command::Configs | Command::Version => Ok(()),
        }
    })
    .await
    .context("command task panicked")?
}

fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for assignment in global.to_config_overrides() {
        loader = loader.set_assignment(&assignment)?;
    }
    Ok(loader)
}

fn load_config(global: &GlobalOptions) -> Result<Config> {
    build_config_loader(global)?.build()
}
