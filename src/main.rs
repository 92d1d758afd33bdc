use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use release_validator::ci::{wait_for_success, GitHubActionsClient, WaitOptions};
use release_validator::config::{self, Config};
use release_validator::git::{Git2Repository, Repository};
use release_validator::output::{self, OutputFormat};
use release_validator::{ui, ReleaseError, Validator, ValidatorOptions};

#[derive(Parser)]
#[command(
    name = "release-validator",
    version,
    about = "Validate release-train versions against git and CI state"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = ".", help = "Path inside the git repository")]
    repo: PathBuf,

    #[arg(long, global = true, help = "Remote to check release branches on")]
    remote: Option<String>,

    #[arg(long, global = true, help = "CI job that must pass")]
    ci_job: Option<String>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output (-v info, -vv debug)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a version may be released now
    Validate {
        /// Requested version, e.g. v2.99.0-rc1 or v2.99.0
        version: String,

        #[arg(long, help = "Release marker file, relative to the repository root")]
        version_file: Option<String>,

        #[arg(long, help = "Skip the CI check even when credentials are available")]
        no_ci: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Lines)]
        format: OutputFormat,

        #[arg(long, help = "Append key=value outputs to the file named by $GITHUB_OUTPUT")]
        github_output: bool,
    },
    /// Wait for the CI run of a tag's commit to finish successfully
    Wait {
        /// Tag whose commit's CI run to wait for
        tag: String,

        #[arg(long, help = "Give up after this many seconds")]
        timeout: Option<u64>,

        #[arg(long, help = "Seconds between polls")]
        interval: Option<u64>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "release_validator=warn",
        1 => "release_validator=info",
        _ => "release_validator=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match run(args) {
        Ok(()) => 0,
        Err(err) => report(&err),
    };
    std::process::exit(code);
}

fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ReleaseError>() {
        Some(ReleaseError::Validation(violation)) => {
            ui::display_violation(violation);
            1
        }
        Some(other) => {
            ui::display_error(&format!("{:#}", err));
            other.exit_code()
        }
        None => {
            ui::display_error(&format!("{:#}", err));
            2
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref(), &args.repo)
        .context("Error loading config")?;

    if let Some(remote) = args.remote {
        config.release.remote = remote;
    }
    if let Some(job) = args.ci_job {
        config.ci.job_name = job;
    }

    let repo = Git2Repository::open(&args.repo, config.release.remote.clone())
        .context("Git repository error")?;

    match args.command {
        Command::Validate {
            version,
            version_file,
            no_ci,
            format,
            github_output,
        } => {
            if let Some(path) = version_file {
                config.release.version_file = path;
            }
            validate(&config, &repo, &version, no_ci, format, github_output)
        }
        Command::Wait {
            tag,
            timeout,
            interval,
        } => {
            let options = WaitOptions {
                timeout: Duration::from_secs(timeout.unwrap_or(config.ci.wait_timeout_secs)),
                interval: Duration::from_secs(interval.unwrap_or(config.ci.poll_interval_secs)),
            };
            wait(&config, &repo, &tag, options)
        }
    }
}

fn ci_client(config: &Config, repo: &Git2Repository) -> Result<Option<GitHubActionsClient>> {
    let remote_url = repo.remote_url()?;
    Ok(GitHubActionsClient::from_config(
        &config.ci,
        remote_url.as_deref(),
    )?)
}

fn validate(
    config: &Config,
    repo: &Git2Repository,
    version: &str,
    no_ci: bool,
    format: OutputFormat,
    github_output: bool,
) -> Result<()> {
    let client = if no_ci {
        None
    } else {
        ci_client(config, repo)?
    };

    let mut validator = Validator::new(repo).with_options(ValidatorOptions::from(config));
    if let Some(client) = &client {
        tracing::info!(repository = client.repository(), "CI check enabled");
        validator = validator.with_ci(client);
    }

    ui::display_status(&format!(
        "Validating {} against remote '{}'",
        version,
        repo.remote_name()
    ));
    let result = validator.validate(version)?;
    ui::display_success(&ui::format_summary(&result));

    let step_output = if github_output {
        std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from)
    } else {
        None
    };

    match step_output {
        Some(path) => {
            output::append_step_outputs(&path, &result)?;
            tracing::info!(path = %path.display(), "wrote step outputs");
        }
        None => {
            if github_output {
                tracing::warn!("GITHUB_OUTPUT is not set, printing outputs instead");
            }
            print!("{}", output::render(&result, format)?);
        }
    }

    Ok(())
}

fn wait(config: &Config, repo: &Git2Repository, tag: &str, options: WaitOptions) -> Result<()> {
    let client = ci_client(config, repo)?.ok_or_else(|| {
        ReleaseError::config(format!(
            "waiting for CI needs a token in ${} or ${}",
            config.ci.token_env,
            release_validator::ci::github::FALLBACK_TOKEN_ENV
        ))
    })?;

    let commit = repo.resolve_commit(tag)?;
    ui::display_status(&format!(
        "Waiting for '{}' on {} ({})",
        config.ci.job_name, tag, commit
    ));

    let conclusion = wait_for_success(&client, tag, &commit, &config.ci.job_name, options)?;
    ui::display_success(&format!("{} finished: {}", config.ci.job_name, conclusion));
    Ok(())
}
