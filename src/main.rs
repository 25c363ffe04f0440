use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use devhub::api::ApiClient;
use devhub::app::{App, AppEvent};
use devhub::config::Config;
use devhub::feed::Tag;
use devhub::session::{Session, TokenStore};
use devhub::ui;

/// Get the config directory path (~/.config/devhub/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("devhub");
    Ok(config_dir)
}

/// Send tracing output to a log file when `RUST_LOG` is set.
///
/// The TUI owns the terminal, so nothing is logged to stdout or stderr.
fn init_logging(config_dir: &Path) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }
    let log_path = config_dir.join("devhub.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "devhub", about = "Terminal client for the DevHub blogging platform")]
struct Args {
    /// API base URL (beats the config file and DEVHUB_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Config file path (default: ~/.config/devhub/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Forget the stored login token and exit
    #[arg(long)]
    logout: bool,

    /// Start with the feed filtered by this tag
    #[arg(long, value_name = "TAG")]
    tag: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // Token file lives here: user-only access
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    eprintln!(
                        "Warning: failed to set permissions on {}: {}",
                        config_dir.display(),
                        e
                    );
                }
            }
            Err(e) => {
                eprintln!(
                    "Warning: failed to read metadata for {}: {}",
                    config_dir.display(),
                    e
                );
            }
        }
    }

    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;
    config.apply_env();
    if let Some(url) = args.api_url {
        tracing::debug!("API URL overridden from command line");
        config.api_url = url;
    }

    let store = TokenStore::new(config_dir.join("token"));

    if args.logout {
        store.remove().context("Failed to remove stored token")?;
        println!("Logged out: stored token removed.");
        return Ok(());
    }

    let session = match Session::restore(store.clone()) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to restore session, continuing signed out");
            eprintln!("Warning: could not read stored login ({}). Continuing signed out.", e);
            // Keep the store so a sign-in during this run replaces the bad file
            Session::signed_out(store)
        }
    };

    let client = ApiClient::new(&config.api_url, config.request_timeout())
        .with_context(|| format!("Invalid API URL '{}'", config.api_url))?;

    let mut app = App::new(client, session, config);

    if let Some(tag) = args.tag.as_deref() {
        // The loop starts the first load for whatever filter is selected
        app.feed.preselect_tag(Tag::from_name(tag));
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
