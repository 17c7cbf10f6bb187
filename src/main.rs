// Headless console supervisor
//
// Launches the headless client, reports startup events and forwards each
// line read from stdin as a console command once the world is ready.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use headless_console::{HeadlessClient, HeadlessEvent, HeadlessOptions, LaunchConfig};

#[derive(Debug, Parser)]
#[command(name = "headless-console", about = "Supervise a headless client console", version, long_about = None)]
struct Cli {
    /// Directory containing the headless executable
    #[arg(long, env = "HEADLESS_PATH")]
    headless_path: PathBuf,

    /// Config file, defaults to Config/Config.json inside the headless directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Runtime used to launch the executable (e.g. mono), resolved from PATH by default
    #[arg(long)]
    runtime: Option<PathBuf>,

    /// Per-command timeout in milliseconds, 0 waits forever
    #[arg(long, default_value_t = 30_000)]
    timeout: u64,

    /// Session ID attempts before giving up
    #[arg(long, default_value_t = 15)]
    session_attempts: u32,

    /// Delay after readiness before commands are forwarded, in milliseconds
    #[arg(long, default_value_t = 1_000)]
    ready_delay: u64,

    /// Print every console line
    #[arg(long)]
    events: bool,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut launch = LaunchConfig::builder(&cli.headless_path);
    if let Some(config) = &cli.config {
        launch = launch.config_path(config);
    }
    if let Some(runtime) = &cli.runtime {
        launch = launch.runtime(runtime);
    }

    let options = HeadlessOptions::builder()
        .command_timeout((cli.timeout > 0).then(|| Duration::from_millis(cli.timeout)))
        .session_id_max_attempts(cli.session_attempts)
        .safe_ready_delay(Duration::from_millis(cli.ready_delay))
        .events_enabled(cli.events)
        .build();

    let client = HeadlessClient::connect(launch.build(), options)
        .await
        .context("failed to launch headless client")?;

    let output = Output {
        json: cli.json,
        show_lines: cli.events,
    };
    let mut events = Box::pin(client.events());
    let mut ready = false;
    while let Some(event) = events.next().await {
        output.print(&event)?;
        match event {
            HeadlessEvent::Ready { .. } => {
                ready = true;
                break;
            }
            HeadlessEvent::Closed => break,
            _ => {}
        }
    }

    if !ready {
        anyhow::bail!("headless client exited before becoming ready");
    }

    tokio::time::sleep(client.options().safe_ready_delay).await;

    let printer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if let Err(e) = output.print(&event) {
                log::error!("Failed to print event: {e}");
            }
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match client.run_command(line).await {
            Ok(response) => println!("{response}"),
            Err(e) if e.is_retryable() => log::warn!("{line}: {e}"),
            Err(e) => {
                log::error!("{line}: {e}");
                if client.is_closed() {
                    break;
                }
            }
        }
    }

    client.close().await?;
    printer.await?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
    show_lines: bool,
}

impl Output {
    fn print(self, event: &HeadlessEvent) -> Result<()> {
        if matches!(event, HeadlessEvent::Message { .. }) && !self.show_lines {
            return Ok(());
        }
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{}", describe(event));
        }
        Ok(())
    }
}

fn describe(event: &HeadlessEvent) -> String {
    match event {
        HeadlessEvent::Ready { session_id } => format!("[ready] {session_id}"),
        HeadlessEvent::Message { line } => format!("[console] {line}"),
        HeadlessEvent::Error { kind, message } => format!("[error] {kind:?}: {message}"),
        HeadlessEvent::Closed => "[closed]".to_string(),
    }
}
