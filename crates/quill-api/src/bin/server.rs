//! quill API server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # Administrative flows
//!
//! User and group creation are one-shot CLI modes that run against the same
//! store and exit before serving:
//!
//! ```
//! cargo run -p quill-api --bin server -- --add-user alice
//! cargo run -p quill-api --bin server -- --add-group "Rustaceans" rustaceans
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use quill_api::{AppState, ServerConfig};
use quill_core::{group::NewGroup, principal::NewUser, store::ContentStore as _};
use quill_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "quill content API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create a user account (password read from stdin) and exit.
  #[arg(long, value_name = "USERNAME")]
  add_user: Option<String>,

  /// Create a group and exit.
  #[arg(long, num_args = 2..=3, value_names = ["TITLE", "SLUG", "DESCRIPTION"])]
  add_group: Option<Vec<String>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("QUILL"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path and open the store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Administrative one-shot modes.
  if let Some(username) = cli.add_user {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    let account = store
      .add_user(NewUser { username, password_hash: hash })
      .await
      .context("failed to add user")?;
    println!("created user {} ({})", account.username, account.user_id);
    return Ok(());
  }

  if let Some(args) = cli.add_group {
    let mut args = args.into_iter();
    let title = args.next().context("missing group title")?;
    let slug = args.next().context("missing group slug")?;
    let description = args.next().unwrap_or_default();
    let group = store
      .add_group(NewGroup { title, slug, description })
      .await
      .context("failed to add group")?;
    println!("created group {} ({})", group.slug, group.group_id);
    return Ok(());
  }

  // Build application state and serve.
  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg.clone()),
  };

  let app = quill_api::router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
