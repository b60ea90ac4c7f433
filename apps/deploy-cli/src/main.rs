//! `deploy-build`: publishes a built application to the distribution
//! service and prints its install page.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::bail;
use buildrelay_deploy::{
    DeployOrchestrator, DeploymentRequest, HttpDistributionService, build_http_client,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;

/// Upload a build and its debug symbols, then publish it on a channel.
#[derive(Parser, Debug)]
#[command(name = "deploy-build", version, about, long_about = None)]
struct Cli {
    /// Application archive to publish.
    #[arg(long, value_name = "PATH")]
    ipa: PathBuf,

    /// Debug-symbols archive uploaded alongside the application.
    #[arg(long, value_name = "PATH")]
    dsyms: Option<PathBuf>,

    /// JSON file with `host`, `auth_token` and `channel`.
    #[arg(long, value_name = "PATH")]
    configuration: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_status(&e));
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting deploy-build");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `--help` and `--version` succeed; every other parse error is a failure.
fn usage_exit_status(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    check_inputs(cli)?;

    let config = ServiceConfig::load(&cli.configuration)?;
    let request = DeploymentRequest {
        primary_artifact_path: cli.ipa.clone(),
        debug_artifact_path: cli.dsyms.clone(),
        destination_host: config.host.clone(),
        auth_token: config.auth_token.clone(),
        channel: config.channel.clone(),
    };

    let service = HttpDistributionService::new(build_http_client()?, config.timeouts());
    let orchestrator = DeployOrchestrator::new(&service);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match rt.block_on(orchestrator.deploy(&request)) {
        Ok(result) => {
            match result.install_page_url {
                Some(url) => println!("Done! Install page: {url}"),
                None => println!(
                    "Done! Build {} committed, but the service returned no install page.",
                    result.build_id
                ),
            }
            Ok(())
        }
        Err(failure) => {
            if failure.is_uncommitted() {
                eprintln!(
                    "Artifacts were uploaded but the release was not committed; re-run to publish."
                );
            }
            Err(failure.into())
        }
    }
}

/// Checks that every input file exists: configuration, then primary, then
/// debug symbols.
fn check_inputs(cli: &Cli) -> anyhow::Result<()> {
    require_file(&cli.configuration, "configuration file")?;
    require_file(&cli.ipa, "application archive")?;
    if let Some(ref dsyms) = cli.dsyms {
        require_file(dsyms, "debug symbols archive")?;
    }
    Ok(())
}

fn require_file(path: &Path, what: &str) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("{what} not found: {}", path.display());
    }
    Ok(())
}
