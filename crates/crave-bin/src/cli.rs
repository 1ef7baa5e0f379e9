// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Crave - food ordering platform server
#[derive(Parser, Debug)]
#[command(
    name = "crave",
    author = "Sylvex <contact@sylvex.io>",
    version = crave_api::VERSION,
    about = "Crave food-ordering platform API server",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "crave.yaml",
        env = "CRAVE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "CRAVE_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "CRAVE_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,
}

// =============================================================================
// Commands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the API server (default)
    Run,
    /// Validate the configuration file and exit
    Validate,
    /// Show version information
    Version,
}

// =============================================================================
// Log Format
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for log aggregation.
    Json,
    /// Compact single-line output.
    Compact,
}

// =============================================================================
// Tests
// =============================================================================
