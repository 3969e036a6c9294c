//! `mps-prerelease-publish`: publish MPS prerelease builds to a Maven
//! repository with SPDX license metadata.
//!
//! # Flow (`publish`)
//! 1. Parse CLI arguments ([`cli`]) and load config ([`config::load_config`]).
//! 2. Download the distribution archive, reusing one already on disk
//!    ([`registry::teamcity`]).
//! 3. Read `third-party-libraries.json` from the archive ([`manifest`]) and
//!    resolve every license label to SPDX ([`license`]). Any unknown label
//!    stops the run here.
//! 4. Flatten the archive ([`archive::repackage`]).
//! 5. Render the POM with the license list ([`pom`]).
//! 6. Upload archive and POM with checksums ([`registry::maven`]).
//! 7. Report the result to TeamCity ([`ci`]).

mod archive;
mod ci;
mod cli;
mod config;
mod error;
mod license;
mod manifest;
mod models;
mod pom;
mod registry;
mod report;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{BuildArgs, CheckPublishedArgs, Cli, Command, LicensesArgs, PublishArgs};
use config::{load_config, Config};
use error::PublishError;
use license::catalog::{aggregate, LicenseCatalog};
use manifest::{read_manifest, read_manifest_from_zip};
use registry::maven::{MavenRepository, Payload, Upload};
use registry::teamcity::fetch_artifact;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    tracing::debug!(?config, "loaded config");

    match &cli.command {
        Command::Licenses(args) => run_licenses(args, cli.quiet),
        Command::Labels => {
            report::terminal::render_labels();
            Ok(())
        }
        Command::CheckPublished(args) => run_check_published(&config, args).await,
        Command::Download(args) => {
            let path = download(&config, args, cli.quiet).await?;
            if !cli.quiet {
                eprintln!("  {} {}", "→".cyan(), path.display());
            }
            Ok(())
        }
        Command::Repackage(args) => {
            let downloaded = download(&config, args, cli.quiet).await?;
            let path = repackage(&config, &downloaded)?;
            if !cli.quiet {
                eprintln!("  {} {}", "→".cyan(), path.display());
            }
            Ok(())
        }
        Command::Publish(args) => run_publish(&config, args, cli.quiet).await,
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match (quiet, verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn http_client(config: &Config) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("mps-prerelease-publish/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()?)
}

fn run_licenses(args: &LicensesArgs, quiet: bool) -> Result<()> {
    let (records, source) = match (&args.manifest, &args.archive) {
        (Some(path), _) => (read_manifest(path)?, path.display().to_string()),
        (None, Some(zip)) => (read_manifest_from_zip(zip)?, zip.display().to_string()),
        (None, None) => bail!("either --manifest or --archive is required"),
    };

    let catalog = match aggregate(&records) {
        Ok(catalog) => catalog,
        Err(err) => {
            report::terminal::render_unresolved(&err, &source, quiet);
            std::process::exit(1);
        }
    };

    match report::render_text(&args.report, &catalog)? {
        None => {
            if args.output.is_some() {
                bail!("--output needs a file format (json, lines or expression)");
            }
            report::terminal::render(&catalog, &records, &source, quiet);
        }
        Some(text) => match &args.output {
            Some(path) => std::fs::write(path, text)
                .with_context(|| format!("writing {}", path.display()))?,
            None => print!("{text}"),
        },
    }

    Ok(())
}

async fn run_check_published(config: &Config, args: &CheckPublishedArgs) -> Result<()> {
    let version = &args.version.version;
    let coords = config.coordinates(version);
    let repo = MavenRepository::new(
        http_client(config)?,
        config.repository_url(),
        args.repository.credentials(),
    );

    let already_published = repo.artifact_exists(&coords).await?;
    ci::set_parameter("alreadyPublished", &already_published.to_string());

    let status = if already_published {
        format!("MPS {version} already exists in the repository")
    } else {
        format!("MPS {version} will be uploaded to the repository")
    };
    ci::build_status(&status);
    Ok(())
}

async fn download(config: &Config, args: &BuildArgs, quiet: bool) -> Result<PathBuf> {
    let url = config.download_url(&args.build_id, &args.version.version);
    let client = http_client(config)?;
    Ok(fetch_artifact(&client, &url, &config.download_dir(), quiet).await?)
}

/// `<download-stem>-repackaged.zip` in the repackage directory.
fn repackaged_path(config: &Config, downloaded: &Path) -> PathBuf {
    let stem = downloaded
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    config.repackage_dir().join(format!("{stem}-repackaged.zip"))
}

fn repackage(config: &Config, downloaded: &Path) -> Result<PathBuf> {
    let dest = repackaged_path(config, downloaded);
    archive::repackage(downloaded, &dest)?;
    Ok(dest)
}

fn load_catalog(args: &PublishArgs, downloaded: &Path) -> Result<LicenseCatalog> {
    if let Some(path) = &args.licenses_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        return LicenseCatalog::parse_lines(&text)
            .with_context(|| format!("parsing {}", path.display()));
    }

    let records = read_manifest_from_zip(downloaded)?;
    Ok(aggregate(&records)?)
}

async fn run_publish(config: &Config, args: &PublishArgs, quiet: bool) -> Result<()> {
    let version = &args.build.version.version;
    let coords = config.coordinates(version);
    let credentials = args.repository.credentials();
    if !credentials.is_complete() {
        return Err(PublishError::MissingCredential {
            coordinates: coords.to_string(),
        }
        .into());
    }

    let downloaded = download(config, &args.build, quiet).await?;

    // Licenses must be settled before anything is built or uploaded.
    let catalog = load_catalog(args, &downloaded)?;
    if !quiet {
        eprintln!(
            "  {} {} licenses: {}",
            "→".cyan(),
            catalog.len(),
            catalog.expression()
        );
    }

    let repackaged = repackage(config, &downloaded)?;
    let pom = pom::render_pom(&coords, &catalog, &config.artifact.description)?;

    let repo = MavenRepository::new(http_client(config)?, config.repository_url(), credentials);
    repo.publish(
        &coords,
        vec![
            Upload {
                extension: "zip",
                payload: Payload::File(repackaged),
            },
            Upload {
                extension: "pom",
                payload: Payload::Bytes(pom.into_bytes()),
            },
        ],
    )
    .await?;

    ci::build_status(&format!("MPS {version} successfully published"));
    Ok(())
}
