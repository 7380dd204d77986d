pub mod config;
pub mod controller;
pub mod host;
pub mod model;
pub mod navigate;
pub mod render;
pub mod search;
pub mod ui;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{ConfigValidationResult, SearchBoxConfig};
use controller::{DropdownContent, DropdownState, SearchBoxController};
use navigate::{Navigator, PrintNavigator};
use render::render_dropdown;
use search::AlgoliaClient;

/// Exit code when `sbx url` gets a blank query.
pub const EXIT_EMPTY_QUERY: u8 = 2;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "sbx",
    version,
    about = "Instant product search box over a hosted search index"
)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "SBX_CONFIG")]
    pub config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive search box
    Tui {
        /// Render one frame to stdout and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Run one query and print the dropdown
    Search {
        query: String,

        /// Print robot JSON instead of markup
        #[arg(long)]
        json: bool,

        /// Override dropdown.hits_per_page
        #[arg(long)]
        count: Option<usize>,
    },
    /// Render a saved search response offline
    Render {
        /// JSON body as returned by the search service
        hits: PathBuf,

        /// Query the response belongs to
        #[arg(long, default_value = "")]
        query: String,

        #[arg(long)]
        json: bool,
    },
    /// Print the results-page URL for a query
    Url { query: String },
    /// Show the resolved configuration (secrets redacted) and its validation
    Config {
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

/// Robot output for `search` and `render`.
#[derive(Debug, Serialize)]
pub struct DropdownReport<'a> {
    pub query: &'a str,
    /// Input element the dropdown attaches to on the page.
    pub input_selector: &'a str,
    pub visible: bool,
    pub content: &'a DropdownContent,
    pub markup: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    path: Option<&'a Path>,
    config: SearchBoxConfig,
    validation: ConfigValidationResult,
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let tui = matches!(cli.command, Commands::Tui { once: false });
    let _log_guard = init_logging(cli.verbose, tui)?;

    match cli.command {
        Commands::Tui { once } => {
            let config = load_config(cli.config.as_deref())?;
            ui::tui::run_tui(config, once).await?;
        }
        Commands::Search { query, json, count } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(count) = count {
                config.dropdown.hits_per_page = count;
            }
            run_search(config, &query, json).await?;
        }
        Commands::Render { hits, query, json } => {
            let config = load_config(cli.config.as_deref())?;
            run_render(&config, &hits, &query, json)?;
        }
        Commands::Url { query } => {
            let config = load_config(cli.config.as_deref())?;
            match navigate::results_url(&config.results, &query) {
                Some(url) => PrintNavigator.navigate(&url)?,
                None => {
                    eprintln!("query is empty; nothing to navigate to");
                    return Ok(ExitCode::from(EXIT_EMPTY_QUERY));
                }
            }
        }
        Commands::Config { json } => {
            let config = load_config(cli.config.as_deref())?;
            print_config(&config, cli.config.as_deref(), json)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sbx", &mut std::io::stdout());
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&Path>) -> Result<SearchBoxConfig> {
    let config = SearchBoxConfig::load(path).context("loading configuration")?;
    debug!(
        component = "cli",
        index = %config.service.index,
        "configuration loaded"
    );
    Ok(config)
}

async fn run_search(config: SearchBoxConfig, query: &str, json: bool) -> Result<()> {
    let backend = AlgoliaClient::new(&config.service)?;
    let selector = config.input.selector.clone();
    let mut controller = SearchBoxController::new(config)?;
    host::search_once(&mut controller, &backend, query).await?;
    let markup = controller.markup().into_string();
    print_dropdown(query.trim(), &selector, controller.dropdown(), &markup, json)
}

fn run_render(config: &SearchBoxConfig, hits: &Path, query: &str, json: bool) -> Result<()> {
    let body = std::fs::read(hits).with_context(|| format!("reading {}", hits.display()))?;
    let response = search::algolia::parse_response(&body)?;
    let state = DropdownState {
        visible: true,
        content: DropdownContent::from_response(query.trim(), &response, config),
    };
    let markup = render_dropdown(&state.content, config).into_string();
    print_dropdown(query.trim(), &config.input.selector, &state, &markup, json)
}

fn print_dropdown(
    query: &str,
    input_selector: &str,
    state: &DropdownState,
    markup: &str,
    json: bool,
) -> Result<()> {
    if json {
        let report = DropdownReport {
            query,
            input_selector,
            visible: state.visible,
            content: &state.content,
            markup: markup.to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{markup}");
    }
    Ok(())
}

fn print_config(config: &SearchBoxConfig, path: Option<&Path>, json: bool) -> Result<()> {
    let validation = config.validate();
    if json {
        let report = ConfigReport {
            path,
            config: config.redacted(),
            validation,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", toml::to_string_pretty(&config.redacted())?);
    if validation.valid {
        println!("# configuration is valid");
    }
    for warning in &validation.warnings {
        println!("# warning: {warning}");
    }
    for error in &validation.errors {
        println!("# error: {error}");
    }
    Ok(())
}

/// Stderr logging for one-shot commands; the interactive TUI logs to a
/// daily file under the data dir so it does not scribble over the screen.
fn init_logging(
    verbose: u8,
    tui: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let default_level = match verbose {
        0 => "searchbox=warn",
        1 => "searchbox=debug",
        _ => "searchbox=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if tui {
        let dir = default_log_dir();
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(&dir, "sbx.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(writer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("installing logger: {e}"))?;
        return Ok(Some(guard));
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing logger: {e}"))?;
    Ok(None)
}

pub fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "searchbox", "searchbox")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("searchbox-logs"))
}
