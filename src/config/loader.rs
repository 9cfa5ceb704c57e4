use std::{env, fs, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use regex::{Captures, Regex};
use tracing::debug;

use crate::config::settings::{ClientConfig, LogFormat, LoggingConfig};
use crate::utils::constants::{ENV_CREDENTIAL, ENV_ENDPOINT};

/// Load and validate config from YAML file
pub fn file_to_config(path: &Path) -> Result<ClientConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&expand_env_vars(&content)?)
}

pub fn parse_config(content: &str) -> Result<ClientConfig> {
    let mut config: ClientConfig =
        serde_yaml::from_str(content).map_err(|e| anyhow!("Invalid config format: {}", e))?;

    // Apply defaults
    if config.logging.is_none() {
        config.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::from_env()));
    }
    debug!("validating config ...");
    validate(&config)?;
    Ok(config)
}

impl ClientConfig {
    /// Config assembled from `CAMPUS_ENDPOINT` and `API01_GITEA_TOKEN`
    pub fn from_env() -> Result<Self> {
        let endpoint = env::var(ENV_ENDPOINT).with_context(|| format!("{} is not set", ENV_ENDPOINT))?;
        let credential =
            env::var(ENV_CREDENTIAL).with_context(|| format!("{} is not set", ENV_CREDENTIAL))?;
        let config = ClientConfig::new(endpoint, credential);
        validate(&config)?;
        Ok(config)
    }
}

pub fn validate(config: &ClientConfig) -> Result<()> {
    if config.endpoint.trim().is_empty() {
        bail!("endpoint must not be empty");
    }
    if config.credential.trim().is_empty() {
        bail!("credential must not be empty");
    }
    if config.request_timeout_ms == 0 {
        bail!("request_timeout_ms must be greater than 0");
    }
    Ok(())
}

/// Replace `${VAR}` and `${VAR:default}` with values from the environment
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
