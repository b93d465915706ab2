use std::io::IsTerminal;

use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use iso_standards_downloader::client::IsoHttpClient;
use iso_standards_downloader::config::MirrorConfig;
use iso_standards_downloader::domain::RootUrl;
use iso_standards_downloader::error::MirrorError;
use iso_standards_downloader::mirror::Mirror;

/// ISO_URL: the URL of the ISO Standard you want to download, e.g.
/// https://standards.iso.org/iso-iec/...
#[derive(Parser)]
#[command(name = "iso-dl")]
#[command(about = "Download ISO Standards from https://standards.iso.org")]
#[command(disable_help_flag = true)]
struct Cli {
    /// Root listing URL of the standard
    iso_url: String,

    /// Print help
    #[arg(short = 'h', long = "help", visible_short_alias = '?', action = ArgAction::Help)]
    help: Option<bool>,
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve(&cli)?;
    println!("Found ISO Standard: {}", config.label());

    let client = IsoHttpClient::new()?;
    let mut mirror = Mirror::new(client, config);
    let stats = mirror.run();
    tracing::debug!(?stats, "walk finished");

    println!("Download finished!");
    Ok(())
}

/// Validates the URL and fixes the storage root; runs before any network I/O.
fn resolve(cli: &Cli) -> Result<MirrorConfig, MirrorError> {
    let root: RootUrl = cli.iso_url.parse()?;
    Ok(MirrorConfig::resolve(root).with_progress(std::io::stderr().is_terminal()))
}
