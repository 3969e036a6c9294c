use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::registry::maven::Credentials;

#[derive(Parser, Debug)]
#[command(
    name = "mps-prerelease-publish",
    about = "Publish MPS prerelease builds to a Maven repository with SPDX license metadata",
    version
)]
pub struct Cli {
    /// Config file [default: ./.mps-prerelease-publish/config.toml, fallback ~/.config/mps-prerelease-publish/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print summary lines and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the license labels of a third-party library manifest to SPDX
    Licenses(LicensesArgs),

    /// List the known license and exception label spellings
    Labels,

    /// Report to TeamCity whether the version is already in the repository
    CheckPublished(CheckPublishedArgs),

    /// Download the distribution archive (skipped when already present)
    Download(BuildArgs),

    /// Download and flatten the distribution archive
    Repackage(BuildArgs),

    /// Download, extract licenses, repackage and upload with a POM
    Publish(PublishArgs),
}

#[derive(Args, Debug)]
pub struct LicensesArgs {
    /// Manifest JSON file
    #[arg(long, value_name = "FILE", required_unless_present = "archive", conflicts_with = "archive")]
    pub manifest: Option<PathBuf>,

    /// Distribution ZIP containing license/third-party-libraries.json
    #[arg(long, value_name = "ZIP")]
    pub archive: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Write the report to a file instead of stdout (not for `terminal`)
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Version of the MPS build to publish
    #[arg(long = "artifact-version", env = "ARTIFACT_VERSION", value_name = "VERSION")]
    pub version: String,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub version: VersionArgs,

    /// TeamCity build id the archive is downloaded from
    #[arg(long, env = "ARTIFACT_BUILD_ID", value_name = "ID")]
    pub build_id: String,
}

#[derive(Args, Debug)]
pub struct RepositoryArgs {
    /// Repository user name
    #[arg(long, env = "MAVEN_REPO_USER")]
    pub repo_user: Option<String>,

    /// Repository password
    #[arg(long, env = "MAVEN_REPO_PASSWORD", hide_env_values = true)]
    pub repo_password: Option<String>,
}

impl RepositoryArgs {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.repo_user.clone(),
            password: self.repo_password.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckPublishedArgs {
    #[command(flatten)]
    pub version: VersionArgs,

    #[command(flatten)]
    pub repository: RepositoryArgs,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Use a catalog written by `licenses --report lines` instead of the
    /// manifest inside the archive
    #[arg(long, value_name = "FILE")]
    pub licenses_file: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Lines,
    Expression,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_licenses_requires_a_source() {
        assert!(Cli::try_parse_from(["mps-prerelease-publish", "licenses"]).is_err());
        assert!(Cli::try_parse_from([
            "mps-prerelease-publish",
            "licenses",
            "--manifest",
            "a.json",
            "--archive",
            "b.zip"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_licenses() {
        let cli = Cli::try_parse_from([
            "mps-prerelease-publish",
            "-q",
            "licenses",
            "--archive",
            "MPS-2024.3.zip",
            "--report",
            "expression",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Command::Licenses(args) => {
                assert_eq!(args.archive, Some(PathBuf::from("MPS-2024.3.zip")));
                assert!(matches!(args.report, ReportFormat::Expression));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_publish() {
        let cli = Cli::try_parse_from([
            "mps-prerelease-publish",
            "publish",
            "--artifact-version",
            "2024.3",
            "--build-id",
            "4711",
            "--repo-user",
            "ci",
            "--repo-password",
            "pw",
        ])
        .unwrap();
        match cli.command {
            Command::Publish(args) => {
                assert_eq!(args.build.version.version, "2024.3");
                assert_eq!(args.build.build_id, "4711");
                assert!(args.repository.credentials().is_complete());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
