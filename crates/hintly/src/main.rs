// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hintly - a tutoring-chat backend with topic continuity and escalation.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hintly_config::{ConfigError, HintlyConfig};

/// Hintly - a tutoring-chat backend.
#[derive(Parser, Debug)]
#[command(name = "hintly", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

fn load(path: Option<&std::path::Path>) -> Result<HintlyConfig, Vec<ConfigError>> {
    match path {
        Some(path) => hintly_config::load_and_validate_path(path),
        None => hintly_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            hintly_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("hintly: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "hintly: config ok (listen {}:{}, database {}, {} API user(s), classifier {})",
                config.server.host,
                config.server.port,
                config.storage.database_path,
                config.auth.users.len(),
                if config.classifier.endpoint.is_some() {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        None => {
            println!("hintly: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 9321").unwrap();
        let config = load(Some(file.path())).expect("valid config");
        assert_eq!(config.server.port, 9321);
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["hintly", "--config", "/tmp/h.toml", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/h.toml")));
        let cli = Cli::try_parse_from(["hintly", "check-config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
    }
}
