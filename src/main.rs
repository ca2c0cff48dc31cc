use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use kviz::{
    app::App,
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore},
    result::{FileResultStore, ResultStore},
    runtime::{CrosstermEventSource, QuizEvent, Runner},
    ui::humanize_age,
    Difficulty, QuestionBank,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;

/// terminal knowledge quiz: ten random questions, four answer styles, one score
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Draws up to ten questions from the chosen difficulty pool, shuffles their options, and scores each answer all-or-nothing. The last result is kept for next time."
)]
pub struct Cli {
    /// learner name (prefills the login screen)
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// learner group (prefills the login screen)
    #[clap(short = 'g', long)]
    group: Option<String>,

    /// difficulty tier to preselect
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// directory with easy.json, medium.json and hard.json to use instead of the bundled bank
    #[clap(short = 'b', long)]
    bank: Option<PathBuf>,

    /// seed for question draws and option order (repeatable runs)
    #[clap(long)]
    seed: Option<u64>,

    /// print the last stored result and exit
    #[clap(long)]
    last: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let results = FileResultStore::new();
    if cli.last {
        print_last(&results);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(name) = cli.name {
        config.name = name;
    }
    if let Some(group) = cli.group {
        config.group = group;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }

    let bank = match &cli.bank {
        Some(dir) => QuestionBank::from_dir(dir)?,
        None => QuestionBank::builtin()?,
    };
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(seed = ?cli.seed, bank = ?cli.bank, "starting");

    let mut app = App::new(
        bank,
        config,
        Box::new(config_store),
        Box::new(results),
        rng,
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            QuizEvent::Key(key) => {
                app.handle_key(key);
                if app.should_quit {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            QuizEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            QuizEvent::Tick => {}
        }
    }

    Ok(())
}

fn print_last(store: &impl ResultStore) {
    match store.load() {
        Some(last) => println!(
            "{} ({}) scored {} / {} ({}%) on {}, {}",
            last.name,
            last.group,
            last.score,
            last.max_score,
            last.percent(),
            last.difficulty,
            humanize_age(last.timestamp, chrono::Local::now())
        ),
        None => println!("no result stored yet"),
    }
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("KVIZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
