// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Crave platform server binary.

mod cli;
mod loader;
mod logging;
mod shutdown;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, warn};

use crave_api::{ApiServerBuilder, TokenCodec};
use crave_core::{hash_password, InMemoryUserDirectory, Role, UserRecord};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command.unwrap_or(Command::Run) {
        Command::Version => {
            println!("crave v{}", crave_api::VERSION);
            ExitCode::SUCCESS
        }
        Command::Validate => validate(&cli.config),
        Command::Run => run(&cli.config).await,
    }
}

/// Validates the configuration file without starting the server.
fn validate(path: &std::path::Path) -> ExitCode {
    let config = match loader::load_config(path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration is invalid");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = TokenCodec::new(config.token.clone()) {
        error!(error = %e, "token configuration is invalid");
        return ExitCode::FAILURE;
    }

    println!("{} is valid", path.display());
    ExitCode::SUCCESS
}

/// Loads the configuration and runs the server until shutdown.
async fn run(path: &std::path::Path) -> ExitCode {
    let config = match loader::load_config(path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // TODO: replace with the Postgres-backed directory once the storage
    // service exposes it; until then sessions do not survive restarts.
    warn!("using the in-memory user directory; sessions are process-local");
    let directory = Arc::new(InMemoryUserDirectory::with_users(demo_users()));

    let server = match ApiServerBuilder::new()
        .config(config)
        .directory(directory)
        .build()
    {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "failed to build server");
            return ExitCode::FAILURE;
        }
    };

    match server.run_with_shutdown(shutdown::shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

/// Demo accounts for the in-memory directory, one per role.
fn demo_users() -> Vec<UserRecord> {
    let demo = |id, email: &str, role, password| {
        UserRecord::new(
            id,
            email,
            role,
            hash_password(password).expect("demo password hashes"),
        )
        .verified()
    };

    vec![
        demo(1, "client@crave.io", Role::Client, "client"),
        demo(2, "owner@crave.io", Role::Owner, "owner"),
        demo(3, "delivery@crave.io", Role::Delivery, "delivery"),
    ]
}
