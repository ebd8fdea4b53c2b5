use std::path::PathBuf;

use clap::{ArgAction, Parser};
use clap_complete::Shell;

use crate::config::Overrides;

#[derive(Clone, Debug, Parser)]
#[command(name = "remeta", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Working directory [default: directory of the executable]
    #[arg(short = 'C', long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Config file [default: <DIR>/remeta.toml if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Delete without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Archive to download
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Mirror host prepended to GitHub URLs
    #[arg(long, value_name = "HOST", conflicts_with = "no_mirror")]
    pub mirror: Option<String>,

    /// Download directly and leave file contents alone
    #[arg(long)]
    pub no_mirror: bool,

    /// Never download; extract the archive already in the directory
    ///
    /// The archive is kept by the reset so it can be reused.
    #[arg(long)]
    pub skip_download: bool,

    /// Top-level folder expected inside the archive
    #[arg(long, value_name = "NAME")]
    pub nested_root: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    pub completions: Option<Shell>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            archive_url: self.url.clone(),
            mirror: self.mirror.clone(),
            no_mirror: self.no_mirror,
            skip_download: self.skip_download,
            nested_root: self.nested_root.clone(),
        }
    }

    /// Default log filter for the given verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "remeta",
            "-C",
            "/srv/meta",
            "-y",
            "--skip-download",
            "--nested-root",
            "meta-main",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.dir.as_deref(), Some(std::path::Path::new("/srv/meta")));
        assert!(cli.yes);
        assert_eq!(cli.log_level(), "trace");
        let overrides = cli.overrides();
        assert!(overrides.skip_download);
        assert_eq!(overrides.nested_root.as_deref(), Some("meta-main"));
    }

    #[test]
    fn mirror_conflicts_with_no_mirror() {
        let result = Cli::try_parse_from(["remeta", "--mirror", "https://m", "--no-mirror"]);
        assert!(result.is_err());
    }
}
