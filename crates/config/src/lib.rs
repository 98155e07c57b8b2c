//! Layered configuration for the `gsm` binary.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a config file (`--config`, else `config.toml` in the user config dir),
//! 3. `GSM_`-prefixed environment variables (`GSM_WORKERS_NUM=4`),
//! 4. command-line overrides ([`Overrides`]).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::{BaseDirs, ProjectDirs};
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APPLICATION: &str = "games-screenshot-manager";
pub const ENV_PREFIX: &str = "GSM_";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registered name of the provider to run.
    pub provider: String,
    /// Library root. May start with `~`.
    pub output_path: PathBuf,
    /// Provider-specific source location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<PathBuf>,
    pub download_covers: bool,
    pub dry_run: bool,
    pub workers_num: usize,
    pub buffer_size: usize,
    /// `tracing` filter directive, e.g. `info` or `gsm_providers=debug`.
    pub log_level: String,
    /// Catalog cache location; the per-user cache dir when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "steam".to_string(),
            output_path: PathBuf::from("./Output"),
            input_path: None,
            download_covers: false,
            dry_run: false,
            workers_num: 2,
            buffer_size: 32,
            log_level: "info".to_string(),
            cache_dir: None,
        }
    }
}

/// Values given on the command line. `None` leaves lower layers untouched.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_covers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers_num: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Loads and validates the configuration.
    ///
    /// An explicit `file` must exist. Without one, the default config file is
    /// used only if present.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match file {
            Some(file) if !file.is_file() => exn::bail!(ErrorKind::MissingFile(file.to_path_buf())),
            Some(file) => Some(file.to_path_buf()),
            None => default_file().filter(|file| file.is_file()),
        };
        let config = Self::extract(file.as_deref(), ENV_PREFIX, overrides)?;
        config.validate()?;
        Ok(config)
    }

    fn extract(file: Option<&Path>, env_prefix: &str, overrides: &Overrides) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        figment
            .merge(Env::prefixed(env_prefix))
            .merge(Serialized::defaults(overrides))
            .extract()
            .or_raise(|| ErrorKind::Extract)
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("provider must not be empty"));
        }
        if self.workers_num == 0 {
            exn::bail!(ErrorKind::Invalid("workers_num must be at least 1"));
        }
        if self.buffer_size == 0 {
            exn::bail!(ErrorKind::Invalid("buffer_size must be at least 1"));
        }
        Ok(())
    }
}

/// `config.toml` in the per-user config directory.
pub fn default_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", APPLICATION).map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Replaces a leading `~` with the current user's home directory.
///
/// `~user` forms are left alone.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    if !path.starts_with("~") {
        return Ok(path.to_path_buf());
    }
    let dirs = BaseDirs::new().ok_or_raise(|| ErrorKind::NoHomeDirectory)?;
    Ok(expand_home_with(path, dirs.home_dir()))
}

fn expand_home_with(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
