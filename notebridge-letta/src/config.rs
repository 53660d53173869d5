use std::time::Duration;

use secrecy::SecretString;

use crate::LettaError;

pub const DEFAULT_API_BASE: &str = "https://api.letta.com";
pub const DEFAULT_PROJECT: &str = "default-project";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the Letta platform.
///
/// A missing `api_key` is not an error: the client then reports itself as
/// unconfigured and the bridge runs without the agent integration.
#[derive(Clone, Debug)]
pub struct LettaConfig {
    pub api_key: Option<SecretString>,
    pub api_base: String,
    pub project: String,
    /// Agent template, e.g. `clever-jade-worm:latest`. Required to create agents.
    pub template_version: Option<String>,
    pub timeout: Duration,
}

impl Default for LettaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            template_version: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LettaConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key: Some(api_key),
            ..Self::default()
        }
    }

    /// Read `LETTA_API_KEY` (or `LETTA_TOKEN`), `LETTA_PROJECT`,
    /// `LETTA_TEMPLATE_VERSION`, `LETTA_API_BASE` and `LETTA_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, LettaError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, LettaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.api_key = read("LETTA_API_KEY")
            .or_else(|| read("LETTA_TOKEN"))
            .map(SecretString::new);
        if let Some(project) = read("LETTA_PROJECT") {
            config.project = project;
        }
        config.template_version = read("LETTA_TEMPLATE_VERSION");
        if let Some(api_base) = read("LETTA_API_BASE") {
            config.api_base = api_base;
        }
        if let Some(seconds) = read("LETTA_TIMEOUT_SECS") {
            let seconds = seconds.parse::<u64>().map_err(|err| {
                LettaError::Config(format!("LETTA_TIMEOUT_SECS must be whole seconds: {err}"))
            })?;
            config.timeout = Duration::from_secs(seconds);
        }

        Ok(config)
    }

    pub fn api_base(mut self, value: impl Into<String>) -> Self {
        self.api_base = value.into();
        self
    }

    pub fn project(mut self, value: impl Into<String>) -> Self {
        self.project = value.into();
        self
    }

    pub fn template_version(mut self, value: impl Into<String>) -> Self {
        self.template_version = Some(value.into());
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn can_create_agents(&self) -> bool {
        self.is_configured() && self.template_version.is_some()
    }
}
