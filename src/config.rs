//! Configuration (`ctc.toml`).
//!
//! Looked up in the working directory first, then `~/.ctc/config.toml`.
//! Every key is optional:
//!
//! ```toml
//! [fingerprint]
//! temp_dir = "/mnt/ramdisk"        # where preprocessor output is written
//! msvc_compilers = ["cl-wrapper"]  # extra names driven with /P /Fi
//! jobs = 8                         # threads for `ctc compdb`
//! ```

use crate::fingerprint::Fingerprinter;
use crate::runner::CommandRunner;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "ctc.toml";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CtcConfig {
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct FingerprintConfig {
    pub temp_dir: Option<PathBuf>,
    #[serde(default)]
    pub msvc_compilers: Vec<String>,
    pub jobs: Option<usize>,
}

impl CtcConfig {
    /// Apply the `[fingerprint]` settings to a fingerprinter.
    pub fn configure<R: CommandRunner>(
        &self,
        fingerprinter: Fingerprinter<R>,
    ) -> Fingerprinter<R> {
        let fingerprinter = fingerprinter.msvc_compilers(self.fingerprint.msvc_compilers.clone());
        match &self.fingerprint.temp_dir {
            Some(dir) => fingerprinter.temp_dir(dir),
            None => fingerprinter,
        }
    }
}

/// Load `ctc.toml` from `dir`, falling back to the user config, then defaults.
pub fn load_config(dir: &Path) -> Result<CtcConfig> {
    let local = dir.join(CONFIG_FILE);
    if local.exists() {
        return load_config_file(&local);
    }

    if let Some(home) = dirs::home_dir() {
        let global = home.join(".ctc").join("config.toml");
        if global.exists() {
            return load_config_file(&global);
        }
    }

    Ok(CtcConfig::default())
}

/// Parse one config file. A relative `temp_dir` is taken relative to the file.
pub fn load_config_file(path: &Path) -> Result<CtcConfig> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} - check file permissions", path.display()))?;
    let mut config: CtcConfig = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse {} - check for syntax errors", path.display()))?;

    if let Some(temp_dir) = &config.fingerprint.temp_dir
        && temp_dir.is_relative()
    {
        let base = path.parent().unwrap_or(Path::new("."));
        config.fingerprint.temp_dir = Some(std::path::absolute(base.join(temp_dir))?);
    }

    if config.fingerprint.jobs == Some(0) {
        return Err(anyhow::anyhow!(
            "Invalid {}: 'jobs' must be at least 1",
            path.display()
        ));
    }

    log::debug!("loaded config from {}", path.display());
    Ok(config)
}
