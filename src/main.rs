mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::{Arc, Mutex},
};
use tracing_subscriber::EnvFilter;

use wpm::{
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    error::WordSourceError,
    game::Game,
    history::ResultsLog,
    runtime::{
        CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, ThreadedFetcher,
        Ticker,
    },
    session::Session,
    word_source::{HttpWordProvider, StaticWordProvider, WordProvider},
};

/// typing speed game with live wpm, accuracy and pause/resume
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about,
    long_about = "Type a batch of random words as fast as you can. Live WPM and accuracy update while you type; Escape pauses, Ctrl+Enter restarts."
)]
pub struct Cli {
    /// number of words to fetch for each game
    #[arg(short = 'w', long = "words")]
    word_count: Option<usize>,

    /// custom prompt to type instead of fetched words
    #[arg(short = 'p', long)]
    prompt: Option<String>,

    /// word list provider to fetch from
    #[arg(long)]
    url: Option<String>,

    /// do not append finished games to the results log
    #[arg(long)]
    no_log: bool,
}

impl Cli {
    /// Apply command line overrides on top of the stored config
    fn apply(&self, mut config: Config) -> Config {
        if let Some(word_count) = self.word_count {
            config.word_count = word_count.max(1);
        }
        if let Some(ref url) = self.url {
            config.provider_url = url.clone();
        }
        if self.no_log {
            config.log_results = false;
        }
        config
    }

    fn provider(&self, config: &Config) -> Result<Arc<dyn WordProvider>, WordSourceError> {
        Ok(match self.prompt {
            Some(ref prompt) => Arc::new(StaticWordProvider::from_prompt(prompt)),
            None => Arc::new(HttpWordProvider::new(config.provider_url.clone())?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub game: Game<ThreadedFetcher>,
    pub confirming_reset: bool,
}

impl App {
    pub fn new(game: Game<ThreadedFetcher>) -> Self {
        Self {
            game,
            confirming_reset: false,
        }
    }

    fn on_event(&mut self, event: GameEvent) -> Flow {
        let flow = match event {
            GameEvent::Key(key) => self.on_key(key),
            GameEvent::WordsLoaded { generation, words } => {
                self.game.on_words_loaded(generation, words);
                Flow::Continue
            }
            GameEvent::Tick | GameEvent::Resize => Flow::Continue,
        };
        self.game.tick();
        flow
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        if self.confirming_reset {
            // any answer other than yes declines
            let answer = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
            self.game.reset(&|| answer);
            self.confirming_reset = false;
            return Flow::Continue;
        }

        // ctrl+enter is not reported by every terminal, so ctrl+r works too
        if ctrl && matches!(key.code, KeyCode::Enter | KeyCode::Char('r')) {
            self.confirming_reset = true;
            return Flow::Continue;
        }

        if self.game.session().has_finished() {
            return match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Flow::Quit,
                KeyCode::Char('n') => {
                    // nothing left to lose once finished
                    self.game.reset(&|| true);
                    Flow::Continue
                }
                _ => Flow::Continue,
            };
        }

        match key.code {
            KeyCode::Esc => {
                self.game.toggle_pause();
            }
            KeyCode::Backspace => {
                self.game.backspace();
            }
            KeyCode::Char(c) if !ctrl => {
                self.game.type_char(c);
            }
            _ => {}
        }
        Flow::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let config = cli.apply(FileConfigStore::new().load());
    tracing::info!(?config, "starting");
    let provider = cli.provider(&config)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let fetcher = ThreadedFetcher::new(provider, events.sender());
    let session = Session::with_tick_rate(SystemClock::new(), config.tick_rate());
    let mut game = Game::new(session, fetcher, config.word_count);
    if config.log_results {
        game = game.with_results_log(ResultsLog::new());
    }

    let runner = Runner::new(events, FixedTicker::new(config.tick_rate()));
    let mut app = App::new(game);
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: GameEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.on_event(runner.step()) == Flow::Quit {
            break;
        }
    }

    tracing::info!("exiting");
    Ok(())
}

/// Log to a file in the data dir; the terminal belongs to the TUI.
/// Filter with RUST_LOG, default `info`.
fn init_logging() {
    let path = AppDirs::log_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
