//! Command-line entry point for **cfddns**
//!
//! * Parses `--silent`, `--dry-run` and `--config`
//! * Loads `.env`, then settings from file and environment
//! * Installs the run logger and performs a single sync pass

use cfddns_core::{
    RunLog, cfg::load_log_file, conclude, execute, load_settings, pipeline::RunOptions,
};
use clap::{Parser, error::ErrorKind};
use std::process::ExitCode;
use tracing_subscriber::{filter::EnvFilter, prelude::*};

/// Keep a Cloudflare DNS record pointed at this machine's public IP
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Suppress all log output, including the log file
    #[arg(short, long)]
    silent: bool,

    /// Report what would change without writing to Cloudflare
    #[arg(short, long)]
    dry_run: bool,

    /// Optional TOML file; environment variables take precedence
    #[arg(short, long, env = "CFDDNS_CONFIG", default_value = "cfddns.toml")]
    config: String,
}

/// Parse `args`; usage errors map to exit status 1, `--help`/`--version` to 0.
fn parse_cli<I, T>(args: I) -> Result<Cli, u8>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|e| {
        let _ = e.print();
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse_cli(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };
    dotenvy::dotenv().ok();

    let loaded = load_settings(&cli.config);
    let log_file = match &loaded {
        Ok(s) => s.log_file(),
        Err(_) => load_log_file(&cli.config),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn")),
        )
        .with(RunLog::new(!cli.silent, log_file))
        .init();

    let result = execute(
        loaded,
        RunOptions {
            dry_run: cli.dry_run,
        },
    )
    .await;
    ExitCode::from(conclude(&result))
}
