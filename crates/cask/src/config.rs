use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::dirs;

const ENV_PREFIX: &str = "CASK_";
const ENV_KEYS: &[&str] = &["bin_dir", "state_dir", "work_dir", "timeout_secs", "retries"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where binaries are placed.
    pub bin_dir:      PathBuf,
    /// Where installation records and lock files live.
    pub state_dir:    PathBuf,
    /// Scratch space for downloads.
    pub work_dir:     PathBuf,
    /// Whole-download timeout; `0` disables it.
    pub timeout_secs: u64,
    pub retries:      u32,
}

impl Default for Config {
    fn default() -> Self {
        let fallback = || PathBuf::from(".cask");
        Self {
            bin_dir:      dirs::user_bin().unwrap_or_else(|| fallback().join("bin")),
            state_dir:    dirs::user_data()
                .map(|p| p.join("cask").join("receipts"))
                .unwrap_or_else(|| fallback().join("receipts")),
            work_dir:     dirs::user_cache()
                .map(|p| p.join("cask").join("downloads"))
                .unwrap_or_else(|| fallback().join("downloads")),
            timeout_secs: 300,
            retries:      3,
        }
    }
}

impl Config {
    /// `<user config dir>/cask/config.toml`.
    pub fn default_path() -> Option<PathBuf> { dirs::user_config().map(|p| p.join("cask").join("config.toml")) }

    /// Defaults, then the config file, then `CASK_*` variables.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).only(ENV_KEYS))
    }

    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let file = file.map(Path::to_path_buf).or_else(Self::default_path);
        Self::figment(file.as_deref())
            .extract()
            .context("invalid configuration")
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
