//! crashprobe - native crash delivery check for React Native apps
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crashprobe::{cli, Config};

/// Drive a React Native app into a native crash and wait for report delivery
#[derive(Parser, Debug)]
#[command(name = "crashprobe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: ~/.config/crashprobe/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the native crash scenario (default)
    Run(RunArgs),
    /// Show the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// Appium server URL
    #[arg(long)]
    appium_url: Option<String>,

    /// Telemetry DSN
    #[arg(long)]
    dsn: Option<String>,

    /// Seconds to wait after relaunch for the crash report to be sent
    #[arg(long)]
    flush_wait: Option<u64>,

    /// Android package of the app under test
    #[arg(long)]
    app_package: Option<String>,

    /// Launch activity of the app under test
    #[arg(long)]
    app_activity: Option<String>,

    /// Emulator or device name
    #[arg(long)]
    device_name: Option<String>,
}

impl RunArgs {
    fn apply(self, config: &mut Config) {
        if let Some(url) = self.appium_url {
            config.appium.url = url;
        }
        if let Some(dsn) = self.dsn {
            config.telemetry.dsn = Some(dsn);
        }
        if let Some(secs) = self.flush_wait {
            config.scenario.flush_wait_secs = secs;
        }
        if let Some(package) = self.app_package {
            config.device.app_package = Some(package);
        }
        if let Some(activity) = self.app_activity {
            config.device.app_activity = Some(activity);
        }
        if let Some(name) = self.device_name {
            config.device.device_name = name;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration. Load errors are returned, not logged.
    let mut config = match &args.config {
        Some(path) => {
            let _ = dotenvy::dotenv();
            Config::load_from(path)?
        }
        None => Config::load()?,
    };

    if args.debug {
        config.debug = true;
    }

    let level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("crashprobe={}", level))),
        )
        .init();

    match args.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(run) => {
            run.apply(&mut config);
            let outcome = cli::run_native_crash(&config).await?;
            println!("{}", cli::summary(&outcome));
        }
        Command::Config { init } => {
            if init {
                println!("{}", cli::init_config(&config)?);
            } else {
                println!("{}", cli::show_config(&config)?);
            }
        }
    }

    Ok(())
}
