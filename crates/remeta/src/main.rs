use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use remeta::cli::Cli;
use remeta::{AssumeYes, Config, Confirm, FileConfig, Refresher, RunOutcome, StdinConfirm};
use remeta_fetch::{ClientSetting, HttpClient, ReqwestClient, Url};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "remeta", &mut io::stdout());
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(io::stderr)
        .init();

    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let work_dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => exe
            .parent()
            .map(Path::to_path_buf)
            .context("Executable has no parent directory")?,
    };
    let config = load_config(&cli, &work_dir, &exe)?;

    let client = ReqwestClient::new(client_setting(&config)?)
        .context("Failed to set up HTTP client")?;

    if cli.yes {
        refresh(config, client, AssumeYes)
    } else {
        refresh(config, client, StdinConfirm)
    }
}

fn load_config(cli: &Cli, work_dir: &Path, exe: &Path) -> Result<Config> {
    let mut config = Config::new(work_dir);
    if let Some(name) = exe.file_name() {
        config = config.with_program_name(name);
    }

    let file = match &cli.config {
        Some(path) => Some((path.clone(), FileConfig::read(path)?)),
        None => FileConfig::discover(work_dir)?,
    };
    if let Some((path, file)) = file {
        tracing::info!(path = %path.display(), "loaded config file");
        config.merge_file(file);
        config = config.with_config_file(path);
    }
    config.merge_overrides(cli.overrides());
    config.validate()?;

    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn client_setting(config: &Config) -> Result<ClientSetting> {
    let proxies = config
        .proxies
        .iter()
        .map(|p| p.parse::<Url>().with_context(|| format!("Invalid proxy URL {p}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(ClientSetting {
        proxies,
        progress: true,
        ..Default::default()
    })
}

fn refresh<C: HttpClient, K: Confirm>(config: Config, client: C, confirm: K) -> Result<()> {
    let work_dir: PathBuf = config.work_dir.clone();
    let refresher = Refresher::new(config, client, confirm)?;

    match refresher
        .run()
        .with_context(|| format!("Failed to refresh {}", work_dir.display()))?
    {
        RunOutcome::Cancelled => tracing::info!("nothing changed"),
        RunOutcome::Completed(summary) => {
            if !summary.cleared.is_clean() {
                tracing::warn!(
                    failed = summary.cleared.failed.len(),
                    "some entries could not be removed during reset"
                );
            }
            tracing::info!(
                promoted = summary.finalized.promoted.len(),
                "refresh complete"
            );
        }
    }
    Ok(())
}
