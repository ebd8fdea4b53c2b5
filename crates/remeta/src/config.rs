use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use remeta_fetch::Mirror;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_ARCHIVE_URL: &str = "https://github.com/KSP-CKAN/CKAN-meta/archive/master.tar.gz";
pub const DEFAULT_MIRROR: &str = "https://ghproxy.net";
pub const DEFAULT_ARCHIVE_NAME: &str = "_META.tar.gz";
pub const DEFAULT_EXTRACT_DIR: &str = "_META";
pub const DEFAULT_NESTED_ROOT: &str = "CKAN-meta-master";
pub const DEFAULT_EXCLUDE: &[&str] = &[".git", ".mypy_cache"];

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "remeta.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Everything a run needs, resolved from defaults, file and flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub work_dir: PathBuf,
    /// File name of the running program; never deleted by the reset.
    pub program_name: Option<OsString>,
    /// Config file the run was loaded from; kept by the reset when it lives
    /// in `work_dir`.
    pub config_file: Option<PathBuf>,
    pub archive_url: String,
    /// `None` disables mirroring of both the download and file contents.
    pub mirror: Option<String>,
    pub skip_download: bool,
    pub archive_name: String,
    pub extract_dir: String,
    pub nested_root: String,
    pub exclude: Vec<String>,
    pub proxies: Vec<String>,
}

impl Config {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            program_name: None,
            config_file: None,
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            mirror: Some(DEFAULT_MIRROR.to_string()),
            skip_download: false,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            extract_dir: DEFAULT_EXTRACT_DIR.to_string(),
            nested_root: DEFAULT_NESTED_ROOT.to_string(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
            proxies: Vec::new(),
        }
    }

    pub fn with_program_name(mut self, name: impl Into<OsString>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn merge_file(&mut self, file: FileConfig) {
        if let Some(url) = file.archive_url {
            self.archive_url = url;
        }
        if let Some(mirror) = file.mirror {
            self.mirror = Some(mirror);
        }
        if file.no_mirror == Some(true) {
            self.mirror = None;
        }
        if let Some(skip) = file.skip_download {
            self.skip_download = skip;
        }
        if let Some(name) = file.archive_name {
            self.archive_name = name;
        }
        if let Some(dir) = file.extract_dir {
            self.extract_dir = dir;
        }
        if let Some(root) = file.nested_root {
            self.nested_root = root;
        }
        if let Some(exclude) = file.exclude {
            self.exclude = exclude;
        }
        if let Some(proxies) = file.proxy {
            self.proxies = proxies;
        }
    }

    pub fn merge_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.archive_url {
            self.archive_url = url;
        }
        if let Some(mirror) = overrides.mirror {
            self.mirror = Some(mirror);
        }
        if overrides.no_mirror {
            self.mirror = None;
        }
        if overrides.skip_download {
            self.skip_download = true;
        }
        if let Some(root) = overrides.nested_root {
            self.nested_root = root;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "archive-url",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(mirror) = &self.mirror
            && mirror.trim_end_matches('/').is_empty()
        {
            return Err(ConfigError::Invalid {
                key: "mirror",
                reason: "must not be empty, use no-mirror to disable".to_string(),
            });
        }
        check_component("archive-name", &self.archive_name)?;
        check_component("extract-dir", &self.extract_dir)?;
        check_component("nested-root", &self.nested_root)?;
        if self.archive_name == self.extract_dir {
            return Err(ConfigError::Invalid {
                key: "extract-dir",
                reason: "must differ from archive-name".to_string(),
            });
        }
        Ok(())
    }

    pub fn mirror(&self) -> Option<Mirror> {
        self.mirror.as_deref().map(Mirror::new)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.work_dir.join(&self.archive_name)
    }

    pub fn extract_path(&self) -> PathBuf {
        self.work_dir.join(&self.extract_dir)
    }

    pub fn nested_root_path(&self) -> PathBuf {
        self.extract_path().join(&self.nested_root)
    }

    /// Names the reset stage must leave in place.
    ///
    /// Always the program, `remeta.toml` and the excludes. A `--config` file
    /// inside the working directory is added, and so is the archive when
    /// downloads are disabled, since that run depends on it.
    pub fn protected_names(&self) -> Vec<OsString> {
        let mut names: Vec<OsString> = Vec::with_capacity(self.exclude.len() + 4);
        let mut keep = |name: OsString| {
            if !names.contains(&name) {
                names.push(name);
            }
        };

        if let Some(program) = &self.program_name {
            keep(program.clone());
        }
        keep(CONFIG_FILE_NAME.into());
        if let Some(file) = &self.config_file
            && self.is_in_work_dir(file)
            && let Some(name) = file.file_name()
        {
            keep(name.to_os_string());
        }
        for name in &self.exclude {
            keep(name.into());
        }
        if self.skip_download {
            keep(self.archive_name.clone().into());
        }
        names
    }

    fn is_in_work_dir(&self, file: &Path) -> bool {
        let parent = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        match (parent.canonicalize(), self.work_dir.canonicalize()) {
            (Ok(parent), Ok(work_dir)) => parent == work_dir,
            _ => parent == self.work_dir,
        }
    }
}

fn check_component(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::Invalid {
            key,
            reason: format!("{value:?} must be a single plain file name"),
        }),
    }
}

/// On-disk `remeta.toml`. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub archive_url: Option<String>,
    pub mirror: Option<String>,
    pub no_mirror: Option<bool>,
    pub skip_download: Option<bool>,
    pub archive_name: Option<String>,
    pub extract_dir: Option<String>,
    pub nested_root: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub proxy: Option<Vec<String>>,
}

impl FileConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Load `<dir>/remeta.toml` if it exists.
    pub fn discover(dir: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read(&path).map(|file| Some((path, file)))
    }
}

/// Values given on the command line, highest precedence.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub archive_url: Option<String>,
    pub mirror: Option<String>,
    pub no_mirror: bool,
    pub skip_download: bool,
    pub nested_root: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("/work");
        assert_eq!(config.archive_url, DEFAULT_ARCHIVE_URL);
        assert_eq!(config.mirror.as_deref(), Some("https://ghproxy.net"));
        assert!(!config.skip_download);
        assert_eq!(config.archive_path(), Path::new("/work/_META.tar.gz"));
        assert_eq!(
            config.nested_root_path(),
            Path::new("/work/_META/CKAN-meta-master")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn protected_names_include_program_and_config() {
        let config = Config::new("/work").with_program_name("remeta");
        assert_eq!(
            config.protected_names(),
            vec![
                OsString::from("remeta"),
                OsString::from("remeta.toml"),
                OsString::from(".git"),
                OsString::from(".mypy_cache")
            ]
        );
    }

    #[test]
    fn protected_names_include_config_file_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let inside = Config::new(dir.path()).with_config_file(dir.path().join("site.toml"));
        assert!(inside.protected_names().contains(&OsString::from("site.toml")));

        let elsewhere =
            Config::new(dir.path().join("sub")).with_config_file(dir.path().join("site.toml"));
        assert!(!elsewhere.protected_names().contains(&OsString::from("site.toml")));
    }

    #[test]
    fn skip_download_protects_archive() {
        let mut config = Config::new("/work");
        assert!(!config.protected_names().contains(&OsString::from(DEFAULT_ARCHIVE_NAME)));

        config.skip_download = true;
        assert!(config.protected_names().contains(&OsString::from(DEFAULT_ARCHIVE_NAME)));
    }

    #[test]
    fn parse_kebab_case_keys() {
        let file = FileConfig::parse(
            r#"
archive-url = "https://github.com/o/r/archive/main.tar.gz"
mirror = "https://mirror.example/"
skip-download = true
nested-root = "r-main"
exclude = [".git", "keep.me"]
"#,
            Path::new("remeta.toml"),
        )
        .unwrap();

        assert_eq!(file.nested_root.as_deref(), Some("r-main"));
        assert_eq!(file.skip_download, Some(true));
        assert_eq!(file.exclude.unwrap(), vec![".git", "keep.me"]);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = FileConfig::parse("mirorr = \"x\"", Path::new("remeta.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn file_overrides_defaults_and_flags_override_file() {
        let mut config = Config::new("/work");
        config.merge_file(FileConfig {
            mirror: Some("https://file.example".to_string()),
            nested_root: Some("from-file".to_string()),
            skip_download: Some(true),
            ..Default::default()
        });
        assert_eq!(config.mirror.as_deref(), Some("https://file.example"));
        assert_eq!(config.nested_root, "from-file");
        assert_eq!(config.archive_name, DEFAULT_ARCHIVE_NAME);

        config.merge_overrides(Overrides {
            mirror: Some("https://flag.example".to_string()),
            ..Default::default()
        });
        assert_eq!(config.mirror.as_deref(), Some("https://flag.example"));
        assert_eq!(config.nested_root, "from-file");
        assert!(config.skip_download);
    }

    #[test]
    fn no_mirror_wins() {
        let mut config = Config::new("/work");
        config.merge_overrides(Overrides {
            mirror: Some("https://flag.example".to_string()),
            no_mirror: true,
            ..Default::default()
        });
        assert!(config.mirror().is_none());
    }

    #[test]
    fn rejects_path_like_names() {
        for bad in ["", "..", "a/b", "/abs"] {
            let mut config = Config::new("/work");
            config.extract_dir = bad.to_string();
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::Invalid { key: "extract-dir", .. })
                ),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn rejects_empty_mirror() {
        let mut config = Config::new("/work");
        config.mirror = Some("/".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn discover_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileConfig::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn discover_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "no-mirror = true\n").unwrap();

        let (path, file) = FileConfig::discover(dir.path()).unwrap().unwrap();

        assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));
        assert_eq!(file.no_mirror, Some(true));
    }
}
