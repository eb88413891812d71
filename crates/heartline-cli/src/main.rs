//! Heartline terminal client.
//!
//! Wires storage, signaling and the application controller together,
//! then hands the terminal to the event loop in `app`.

mod app;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use heartline_app::AppController;
use heartline_core::config::AppConfig;
use heartline_core::identity::{IdentityStore, UserDirectory};
use heartline_core::session::SessionHandle;
use heartline_core::suggestion::SuggestionSink;
use heartline_infrastructure::{HeartlinePaths, RestStore, TomlProfileStore};
use heartline_session::{GatewayClient, LoopbackTransport, ManagedSession};

#[derive(Parser, Debug)]
#[command(name = "heartline")]
#[command(about = "Heartline - talk to a voice agent from your terminal", long_about = None)]
struct Args {
    /// Gateway base URL for connection details (or HEARTLINE_GATEWAY_URL)
    #[arg(long)]
    gateway_url: Option<String>,

    /// Record store base URL for users and suggestions (or HEARTLINE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer key for the record store (or HEARTLINE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Run fully in-process against the loopback transport
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Seconds until the loopback agent reports ready
    #[arg(long, default_value_t = 3)]
    ready_delay_secs: u64,

    /// Write logs to stderr instead of discarding them
    #[arg(long, default_value_t = false)]
    log_stderr: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_stderr);

    let config = load_config()?;
    let controller = bootstrap(&args, config)?;
    controller.restore_identity().await;

    let cancel = CancellationToken::new();
    controller.spawn_watchers(&cancel);

    let mut terminal = setup_terminal().context("Failed to initialize terminal")?;
    let result = app::run(&mut terminal, controller.clone()).await;
    restore_terminal(&mut terminal)?;

    cancel.cancel();
    controller.end_call().await;

    result
}

/// Loads configuration: shipped defaults, `config.toml` overrides when
/// the file exists, then environment overrides.
fn load_config() -> Result<AppConfig> {
    let mut config = match HeartlinePaths::config_file() {
        Ok(path) if path.exists() => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            AppConfig::from_toml_str(&contents)
                .with_context(|| format!("Invalid configuration in {}", path.display()))?
        }
        _ => AppConfig::default(),
    };
    config.apply_env();
    Ok(config)
}

/// Wires storage, session and controller from the CLI options.
fn bootstrap(args: &Args, config: AppConfig) -> Result<Arc<AppController>> {
    let profile_store = Arc::new(TomlProfileStore::open_default()?);

    let rest_store = match &args.api_url {
        Some(url) => Some(RestStore::new(url.clone(), args.api_key.clone())),
        None => RestStore::try_from_env(),
    };
    let directory = rest_store
        .clone()
        .map(|store| Arc::new(store) as Arc<dyn UserDirectory>);
    let suggestion_sink = rest_store.map(|store| Arc::new(store) as Arc<dyn SuggestionSink>);

    let identity = Arc::new(IdentityStore::new(profile_store, directory));

    // The media stack is an external collaborator; the loopback transport
    // carries the media leg while signaling goes through the gateway.
    let transport = Arc::new(LoopbackTransport::ready_in_secs(args.ready_delay_secs));
    let gateway = if args.offline {
        None
    } else {
        gateway_url(args).map(|url| GatewayClient::new(url, config.agent_name.clone()))
    };
    match (&gateway, args.offline) {
        (Some(_), _) => tracing::info!("[Bootstrap] Gateway signaling configured"),
        (None, true) => tracing::info!("[Bootstrap] Offline mode, loopback session"),
        (None, false) => {
            tracing::warn!("[Bootstrap] No gateway configured, falling back to loopback session");
        }
    }
    let session: Arc<dyn SessionHandle> = Arc::new(ManagedSession::new(
        gateway,
        transport,
        config.connect_timeout(),
    ));

    Ok(Arc::new(AppController::new(
        config,
        identity,
        session,
        suggestion_sink,
    )))
}

fn gateway_url(args: &Args) -> Option<String> {
    args.gateway_url.clone().or_else(|| {
        std::env::var("HEARTLINE_GATEWAY_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
    })
}

/// Logs land in a file under the config directory; the terminal is in
/// raw mode and stray output tears the UI. `--log-stderr` redirects them
/// to stderr for debugging outside the alternate screen.
fn init_logging(log_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_enabled = log_stderr
        || matches!(
            std::env::var("HEARTLINE_LOG_STDERR").ok().as_deref(),
            Some("1") | Some("true") | Some("TRUE") | Some("yes") | Some("YES")
        );
    if stderr_enabled {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    } else if let Some(file) = open_log_file() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}

/// Opens `logs/heartline.log` under the config directory for appending.
fn open_log_file() -> Option<std::fs::File> {
    let dir = HeartlinePaths::logs_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("heartline.log"))
        .ok()
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
