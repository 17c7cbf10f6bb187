//! Launch configuration for the headless executable

use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the headless executable inside the install directory
pub const HEADLESS_EXECUTABLE: &str = "Neos.exe";

/// Config file used when none is given, relative to the install directory
pub const DEFAULT_CONFIG_FILE: &str = "Config/Config.json";

/// Runtime that hosts the executable on non-Windows platforms
pub const DEFAULT_RUNTIME: &str = "mono";

/// How long `close` waits for a graceful exit before killing the process
pub const GRACEFUL_EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to launch the headless client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Directory holding the headless binaries; also the working directory
    pub headless_path: PathBuf,
    /// Config file passed with `--config`
    pub config_path: Option<PathBuf>,
    /// Program that hosts the executable.
    ///
    /// `None` means `mono` on non-Windows platforms and running the
    /// executable directly on Windows.
    pub runtime: Option<PathBuf>,
}

impl LaunchConfig {
    /// Launch config for an install directory with default settings
    pub fn new(headless_path: impl Into<PathBuf>) -> Self {
        Self {
            headless_path: headless_path.into(),
            config_path: None,
            runtime: None,
        }
    }

    /// Create a new builder for `LaunchConfig`
    pub fn builder(headless_path: impl Into<PathBuf>) -> LaunchConfigBuilder {
        LaunchConfigBuilder {
            config: Self::new(headless_path),
        }
    }

    /// Path of the headless executable
    #[must_use]
    pub fn executable(&self) -> PathBuf {
        self.headless_path.join(HEADLESS_EXECUTABLE)
    }

    /// Config file that will be passed to the executable
    #[must_use]
    pub fn resolved_config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.headless_path.join(DEFAULT_CONFIG_FILE))
    }

    /// Install directory
    #[must_use]
    pub fn headless_path(&self) -> &Path {
        &self.headless_path
    }
}

/// Builder for `LaunchConfig`
#[derive(Debug)]
pub struct LaunchConfigBuilder {
    config: LaunchConfig,
}

impl LaunchConfigBuilder {
    /// Set the config file
    #[must_use]
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.config_path = Some(path.into());
        self
    }

    /// Set the hosting runtime
    #[must_use]
    pub fn runtime(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.runtime = Some(path.into());
        self
    }

    /// Build the launch config
    #[must_use]
    pub fn build(self) -> LaunchConfig {
        self.config
    }
}
