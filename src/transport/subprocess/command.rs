//! Process command building logic for subprocess transport

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::config::LaunchConfig;

/// Command builder for the headless executable
pub struct CommandBuilder<'a> {
    runtime: Option<&'a Path>,
    launch: &'a LaunchConfig,
}

impl<'a> CommandBuilder<'a> {
    /// Create a new command builder
    ///
    /// With a `runtime` the executable is passed to it as first argument,
    /// otherwise the executable is started directly.
    pub fn new(runtime: Option<&'a Path>, launch: &'a LaunchConfig) -> Self {
        Self { runtime, launch }
    }

    /// Build the complete command with arguments and piped stdio
    pub fn build(&self) -> Command {
        let executable = self.launch.executable();

        let mut cmd = match self.runtime {
            Some(runtime) => {
                let mut cmd = Command::new(runtime);
                cmd.arg(&executable);
                cmd
            }
            None => Command::new(&executable),
        };

        cmd.arg("--config")
            .arg(self.launch.resolved_config_path())
            .current_dir(&self.launch.headless_path);

        // Stderr is piped as well so the child cannot touch the parent terminal
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd
    }
}
