//! reelchat TUI Entry Point
//!
//! Launches the terminal chat UI.
//!
//! Usage:
//!   reelchat [OPTIONS]
//!
//! Options:
//!   --endpoint <URL>            Chat proxy endpoint
//!   --config <PATH>             Config file (default: ~/.config/reelchat/config.toml)
//!   --reveal-interval-ms <MS>   Delay between revealed characters
//!   --timeout-secs <S>          Per-request timeout
//!   --max-retries <N>           Retries for transient gateway failures
//!   --log-file <PATH>           Write logs here (the terminal is in raw mode)

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelchat_core::config::{self, ConfigOverrides};
use reelchat_core::ReelchatConfig;
use reelchat_tui::App;

/// Log file used when `RUST_LOG` is set without `--log-file`
const DEFAULT_LOG_FILE: &str = "reelchat.log";

#[derive(Debug, Parser)]
#[command(name = "reelchat", version, about = "Chat about a small movie and TV catalog")]
struct Cli {
    /// Chat proxy endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay between revealed characters, in milliseconds
    #[arg(long)]
    reveal_interval_ms: Option<u64>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Retries after a transient gateway failure
    #[arg(long)]
    max_retries: Option<u32>,

    /// Write logs to this file
    #[arg(long, env = "REELCHAT_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref endpoint) = self.endpoint {
            overrides = overrides.with_endpoint(endpoint.clone());
        }
        if let Some(ms) = self.reveal_interval_ms {
            overrides = overrides.with_reveal_interval_ms(ms);
        }
        if let Some(secs) = self.timeout_secs {
            overrides = overrides.with_timeout_secs(secs);
        }
        if let Some(retries) = self.max_retries {
            overrides = overrides.with_max_retries(retries);
        }
        overrides
    }

    fn load_config(&self) -> anyhow::Result<ReelchatConfig> {
        let mut config = match self.config {
            Some(ref path) => config::load_config_from_path(Some(path.clone()))?,
            None => config::load_config()?,
        };
        self.overrides().apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

/// Set up file logging; stdout belongs to the TUI
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None if std::env::var_os("RUST_LOG").is_some() => PathBuf::from(DEFAULT_LOG_FILE),
        None => return Ok(()),
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    let config = cli.load_config()?;
    tracing::info!(
        source = %config.source(),
        endpoint = %config.endpoint,
        "Configuration loaded"
    );

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: reelchat requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ReelchatConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(config)?;
    app.run(terminal).await?;
    tracing::info!("Chat surface closed");
    Ok(())
}
