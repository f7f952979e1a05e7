//! herocache - offline hero catalogue from the command line.
//!
//! Reads go through the local cache first and only reach the API when
//! nothing is stored yet. `--refresh` and `prefetch` force network reads.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use herocache_core::api::{ApiClient, RequestBuilder};
use herocache_core::usecase::{
    prefetch_all, ClearData, HeroCatalog, LoginService, DEFAULT_PREFETCH_CONCURRENCY,
};
use herocache_core::{Config, HeroStore, TokenStore};

// ============================================================================
// Constants
// ============================================================================

/// Overrides `api_base_url`
const ENV_API_URL: &str = "HEROCACHE_API_URL";
/// Overrides `database_path`
const ENV_DATABASE: &str = "HEROCACHE_DB";
/// Password for non-interactive login
const ENV_PASSWORD: &str = "HEROCACHE_PASSWORD";

const LOG_FILE_PREFIX: &str = "herocache.log";

#[derive(Debug, Parser)]
#[command(name = "herocache")]
#[command(about = "Offline-first hero catalogue", long_about = None)]
struct Cli {
    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Clear all cached data and log out
    Logout,
    /// List heroes
    Heroes {
        /// Name substring, case and accent insensitive
        #[arg(short, long)]
        filter: Option<String>,
        /// Sort by name descending
        #[arg(long)]
        desc: bool,
        /// Fetch from the API even when heroes are cached
        #[arg(long)]
        refresh: bool,
    },
    /// List a hero's locations
    Locations { hero_id: String },
    /// List a hero's transformations
    Transformations { hero_id: String },
    /// Download every hero with locations and transformations
    Prefetch {
        #[arg(short, long, default_value_t = DEFAULT_PREFETCH_CONCURRENCY)]
        concurrency: usize,
    },
    /// Show session and cache status
    Status,
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard must be held for the process lifetime so buffered file
/// output is flushed.
fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // RUST_LOG wins over the --verbose default
    let default_filter = if verbose {
        "warn,herocache=debug,herocache_core=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&path)?;

    if let Ok(url) = std::env::var(ENV_API_URL) {
        config.api_base_url = url;
    }
    if let Ok(db) = std::env::var(ENV_DATABASE) {
        config.database_path = Some(PathBuf::from(db));
    }
    Ok((config, path))
}

/// Everything a command needs, wired once from config
struct App {
    config: Config,
    config_path: PathBuf,
    store: Arc<HeroStore>,
    tokens: Arc<dyn TokenStore>,
    api: Arc<ApiClient>,
}

impl App {
    fn new(config: Config, config_path: PathBuf) -> Result<Self> {
        let database_path = config.database_path()?;
        debug!(path = %database_path.display(), "Opening store");
        let store = Arc::new(
            HeroStore::open(&database_path)
                .with_context(|| format!("Failed to open {}", database_path.display()))?,
        );

        let tokens = config.token_store()?;
        let builder = RequestBuilder::new(config.api_base_url.clone(), tokens.clone());
        let api = ApiClient::with_timeout(builder, Duration::from_secs(config.request_timeout_secs))?
            .with_login_transport(config.login_transport);

        Ok(Self {
            config,
            config_path,
            store,
            tokens,
            api: Arc::new(api),
        })
    }

    fn catalog(&self) -> HeroCatalog {
        HeroCatalog::new(self.store.clone(), self.api.clone())
    }

    async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(username) => username,
            None => prompt("Username: ")?,
        };
        let password = match std::env::var(ENV_PASSWORD) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Password: ")?,
        };

        LoginService::new(self.api.clone(), self.tokens.clone())
            .login(&username, &password)
            .await?;

        self.config.last_username = Some(username.clone());
        if let Err(e) = self.config.save_to(&self.config_path) {
            warn!(error = %e, "Failed to save config");
        }
        println!("Logged in as {}", username);
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        ClearData::new(self.store.clone(), self.tokens.clone()).clear_all_and_logout()?;
        println!("Local data cleared and session removed");
        Ok(())
    }

    async fn heroes(&self, filter: Option<&str>, desc: bool, refresh: bool) -> Result<()> {
        let catalog = self.catalog();
        catalog.set_sort_ascending(!desc);

        let heroes = if refresh {
            catalog.refresh_heroes(filter).await?
        } else {
            catalog.load_heroes(filter).await?
        };

        if heroes.is_empty() {
            println!("No heroes found");
        }
        for hero in heroes {
            let star = if hero.favorite { " *" } else { "" };
            println!("{}  {}{}", hero.id, hero.name, star);
        }
        Ok(())
    }

    async fn locations(&self, hero_id: &str) -> Result<()> {
        let locations = self.catalog().load_locations(hero_id).await?;
        if locations.is_empty() {
            println!("No locations for {}", hero_id);
        }
        for location in locations {
            let date = location
                .parsed_date()
                .map(|d| d.date_naive().to_string())
                .unwrap_or_else(|| location.date.clone());
            match location.coordinate() {
                Some(c) => println!("{}  {}  {:.5}, {:.5}", location.id, date, c.latitude, c.longitude),
                None => println!("{}  {}  (invalid coordinate)", location.id, date),
            }
        }
        Ok(())
    }

    async fn transformations(&self, hero_id: &str) -> Result<()> {
        let transformations = self.catalog().load_transformations(hero_id).await?;
        if transformations.is_empty() {
            println!("No transformations for {}", hero_id);
        }
        for transformation in transformations {
            match transformation.photo_url() {
                Some(url) => println!("{}  {}", transformation.name, url),
                None => println!("{}", transformation.name),
            }
        }
        Ok(())
    }

    async fn prefetch(&self, concurrency: usize) -> Result<()> {
        let report = prefetch_all(&self.catalog(), concurrency).await?;
        println!(
            "Cached {} heroes, {} locations, {} transformations",
            report.heroes, report.locations, report.transformations
        );
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.hero_id, failure.error);
        }
        if !report.is_complete() {
            anyhow::bail!("{} hero detail fetches failed", report.failures.len());
        }
        Ok(())
    }

    fn status(&self) -> Result<()> {
        let counts = self.store.counts()?;
        println!("API:             {}", self.config.api_base_url);
        println!("Database:        {}", self.config.database_path()?.display());
        println!(
            "Session:         {}",
            if self.tokens.has_token() { "logged in" } else { "logged out" }
        );
        println!("Heroes:          {}", counts.heroes);
        println!("Locations:       {}", counts.locations);
        println!("Transformations: {}", counts.transformations);
        Ok(())
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run(cli: Cli, config: Config, config_path: PathBuf) -> Result<()> {
    let mut app = App::new(config, config_path)?;

    match cli.command {
        Commands::Login { username } => app.login(username).await,
        Commands::Logout => app.logout(),
        Commands::Heroes {
            filter,
            desc,
            refresh,
        } => app.heroes(filter.as_deref(), desc, refresh).await,
        Commands::Locations { hero_id } => app.locations(&hero_id).await,
        Commands::Transformations { hero_id } => app.transformations(&hero_id).await,
        Commands::Prefetch { concurrency } => app.prefetch(concurrency).await,
        Commands::Status => app.status(),
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (config, config_path) = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let guard = init_tracing(cli.verbose, config.log_dir.as_deref());
    info!(command = ?cli.command, "herocache starting");

    let result = run(cli, config, config_path).await;
    // Flush the log file before a possible exit
    drop(guard);

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
