use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use kanatap::{
    app::App,
    app_dirs::AppDirs,
    client::{HttpWordSource, WordLoader, WordSource},
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, FixedTicker, PracticeEventSource, Runner, Ticker},
    server, ui, Catalog,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    net::SocketAddr,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;

/// hiragana tap-typing practice with a tiny word service
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice spelling words in hiragana by tapping glyph tiles. `serve` runs the word service, `practice` is the terminal client, `words` prints the word list."
)]
pub struct Cli {
    /// config file to use instead of the default location
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// run the HTTP word service
    Serve {
        /// address to listen on
        #[clap(short, long)]
        addr: Option<SocketAddr>,
    },
    /// practice in the terminal against a running word service
    Practice {
        /// base url of the word service
        #[clap(short, long)]
        url: Option<String>,

        /// hiragana to build the tiles from; starts practice right away
        #[clap(short, long)]
        chars: Option<String>,

        /// seconds to wait for the word service before giving up
        #[clap(long)]
        timeout_secs: Option<u64>,
    },
    /// print the word list as JSON, optionally filtered to what `chars` can spell
    Words {
        #[clap(short, long)]
        chars: Option<String>,
    },
}

impl Cli {
    fn config_store(&self) -> FileConfigStore {
        match self.config {
            Some(ref path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }

    /// Command line flags win over the config file.
    fn apply_overrides(&self, mut config: Config) -> Config {
        match &self.command {
            Command::Serve { addr } => {
                if let Some(addr) = addr {
                    config.server_addr = *addr;
                }
            }
            Command::Practice {
                url,
                chars,
                timeout_secs,
            } => {
                if let Some(url) = url {
                    config.base_url = url.clone();
                }
                if chars.is_some() {
                    config.default_chars = chars.clone();
                }
                if let Some(secs) = timeout_secs {
                    config.fetch_timeout_secs = *secs;
                }
            }
            Command::Words { .. } => {}
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Practice { .. } => {
            if !stdin().is_tty() {
                let mut cmd = Cli::command();
                cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
            }
            init_file_logging();
        }
        Command::Serve { .. } | Command::Words { .. } => init_stderr_logging(),
    }

    let config = cli.apply_overrides(cli.config_store().load());

    match cli.command {
        Command::Serve { .. } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::serve(config.server_addr))?;
        }
        Command::Words { ref chars } => {
            let response = server::words_for(Catalog::builtin()?, chars.as_deref());
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Practice { .. } => run_practice(&config)?,
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .try_init();
}

// The terminal is taken over by the UI, so the client logs to a file.
fn init_file_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }
}

fn run_practice(config: &Config) -> Result<(), Box<dyn Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let events = CrosstermEventSource::new();
    let source = HttpWordSource::new(config.base_url.clone(), config.fetch_timeout())?;
    let mut loader = WordLoader::new(
        source,
        rt.handle().clone(),
        events.sender(),
        config.fetch_timeout(),
    );
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(TICK_RATE_MS)));
    info!(base_url = %config.base_url, "starting practice client");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.default_chars.clone());
    let result = start_tui(&mut terminal, &mut app, &runner, &mut loader);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B, E, T, S>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    loader: &mut WordLoader<S>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    E: PracticeEventSource,
    T: Ticker,
    S: WordSource,
{
    // Characters from the command line or config start practice immediately
    if !app.filter_input.trim().is_empty() {
        if let Some(action) = app.submit_filter() {
            app.perform(action, loader);
        }
    }

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if !app.handle_event(runner.step(), loader) {
            break;
        }
    }

    Ok(())
}
