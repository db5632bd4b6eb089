use std::{borrow::Cow, sync::OnceLock};

use thiserror::Error;

pub const DEFAULT_PREFIX: &str = "assertion failed: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    /// Diagnostic tag written before every message.
    pub prefix: Cow<'static, str>,
    pub trailing_newline: bool,
    /// Also emit the rendered message as an error record on the `log` facade.
    pub mirror_to_log: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            prefix: Cow::Borrowed(DEFAULT_PREFIX),
            trailing_newline: false,
            mirror_to_log: false,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("reporter configuration is already installed")]
    AlreadyInstalled,
    #[error("prefix must be a single line: {0:?}")]
    InvalidPrefix(String),
}

impl ReporterConfig {
    pub fn with_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.prefix = prefix.into();
        self
    }
    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }
    pub fn with_mirror_to_log(mut self, mirror_to_log: bool) -> Self {
        self.mirror_to_log = mirror_to_log;
        self
    }
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.contains(['\n', '\r']) {
            return Err(ConfigError::InvalidPrefix(self.prefix.to_string()));
        }
        Ok(())
    }
}

static CONFIG: OnceLock<ReporterConfig> = OnceLock::new();

/// Installs the process-wide reporter configuration. Can succeed only once,
/// and only before the first report reads the defaults.
pub fn install(config: ReporterConfig) -> Result<(), ConfigError> {
    config.validate()?;
    log::debug!(
        "installing reporter config: prefix={:?} trailing_newline={} mirror_to_log={}",
        config.prefix,
        config.trailing_newline,
        config.mirror_to_log
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInstalled)
}

/// The installed configuration, or the defaults if none was installed.
pub fn current() -> &'static ReporterConfig {
    CONFIG.get_or_init(ReporterConfig::default)
}
