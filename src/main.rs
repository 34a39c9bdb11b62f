mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use gapfill::{
    cloze::{render_masked, Difficulty},
    config::{Config, ConfigStore, FileConfigStore},
    curriculum::{Browser, BuiltinSource, Curriculum, FallbackSource, JsonFileSource, SentenceSource},
    logging,
    quiz::Quiz,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::Session,
    speech::Speech,
    TICK_RATE_MS,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};

/// listen-and-fill cloze trainer for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Read the translation, listen to the sentence, and type the words that were blanked out. Sentences come from a built-in grammar curriculum or your own JSON file."
)]
pub struct Cli {
    /// how many words to blank out
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// curriculum level to practise, by name or title (see --list)
    #[clap(short = 'l', long)]
    level: Option<String>,

    /// topic within the level to practise (see --list)
    #[clap(short = 't', long)]
    topic: Option<String>,

    /// JSON file of sentences to practise; the built-in curriculum is used if it yields nothing
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// text-to-speech command writing audio to stdout, e.g. "espeak-ng --stdout {text}"; quote arguments containing spaces
    #[clap(long)]
    speech_command: Option<String>,

    /// audio player command reading from stdin, e.g. "aplay -q"; quote arguments containing spaces
    #[clap(long)]
    player_command: Option<String>,

    /// list curriculum levels and topics, then exit
    #[clap(long)]
    list: bool,

    /// print every sentence of the pool with its gaps, then exit
    #[clap(long)]
    preview: bool,

    /// seed the gap selection for reproducible drills
    #[clap(long)]
    seed: Option<u64>,

    /// store the effective settings in the config file
    #[clap(long)]
    save_config: bool,
}

/// Split a command line on whitespace. Single- or double-quoted runs stay
/// in one argument; an unterminated quote runs to the end.
fn split_command(command: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in command.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    parts.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        parts.push(current);
    }
    parts
}

impl Cli {
    /// Command line values override the config file
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty;
        }
        if self.level.is_some() {
            cfg.level = self.level.clone();
        }
        if self.topic.is_some() {
            cfg.topic = self.topic.clone();
        }
        if self.file.is_some() {
            cfg.sentence_file = self.file.clone();
        }
        if let Some(ref command) = self.speech_command {
            cfg.speech.synth_command = split_command(command);
        }
        if let Some(ref command) = self.player_command {
            cfg.speech.player_command = split_command(command);
        }
        cfg
    }
}

fn sentence_source(cfg: &Config) -> Box<dyn SentenceSource> {
    let builtin = BuiltinSource::new(cfg.level.clone(), cfg.topic.clone());
    match &cfg.sentence_file {
        Some(path) => Box::new(FallbackSource::new(JsonFileSource::new(path), builtin)),
        None => Box::new(builtin),
    }
}

fn print_curriculum<W: Write>(out: &mut W, curriculum: &Curriculum) -> io::Result<()> {
    for level in curriculum.levels() {
        writeln!(out, "{}", level.display_name())?;
        for topic in &level.topics {
            writeln!(out, "  {} ({} sentences)", topic.name, topic.sentences.len())?;
        }
    }
    Ok(())
}

fn print_preview<W: Write>(out: &mut W, session: &mut Session) -> io::Result<()> {
    let (_, total) = session.progress();
    for n in 1..=total {
        let mask = session.prepare().clone();
        let sentence = session.current();
        let focus = sentence.focus.as_deref().unwrap_or("-");
        writeln!(out, "{n}. [{focus}] {}", sentence.translation)?;
        writeln!(out, "   {}", render_masked(&sentence.words(), &mask))?;
        session.advance();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    let log_path = logging::init(&config.log_filter);
    info!(version = env!("CARGO_PKG_VERSION"), log = ?log_path, "starting gapfill");

    if cli.save_config {
        store.save(&config)?;
        println!("settings saved to {}", store.path().display());
    }

    if cli.list {
        print_curriculum(&mut io::stdout(), &Curriculum::builtin()?)?;
        return Ok(());
    }

    let source = sentence_source(&config);
    let pool = source.load();
    info!(source = %source.describe(), sentences = pool.len(), "sentence pool loaded");

    let mut session = match Session::with_seed(pool, config.difficulty, config.ratios, cli.seed) {
        Ok(session) => session,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, format!("{e} (source: {})", source.describe()))
                .exit();
        }
    };

    if cli.preview {
        print_preview(&mut io::stdout(), &mut session)?;
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut quiz = Quiz::new(session, Speech::from_config(&config.speech));
    match Curriculum::builtin()
        .ok()
        .and_then(|c| Browser::new(c, config.level.as_deref(), config.topic.as_deref()))
    {
        Some(browser) => quiz = quiz.with_browser(browser),
        None => warn!("built-in curriculum unavailable; level and topic switching disabled"),
    }

    with_terminal_mode(enable_raw_mode, disable_raw_mode, || {
        with_terminal_mode(
            || execute!(io::stdout(), EnterAlternateScreen),
            || execute!(io::stdout(), LeaveAlternateScreen, Show),
            || {
                let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
                start_tui(&mut terminal, &mut quiz)
            },
        )
    })
}

/// Run `body` between `enter` and `leave`. `leave` runs whether or not
/// `body` fails; the body's error wins over a failure to leave.
fn with_terminal_mode<T>(
    enter: impl FnOnce() -> io::Result<()>,
    leave: impl FnOnce() -> io::Result<()>,
    body: impl FnOnce() -> Result<T, Box<dyn Error>>,
) -> Result<T, Box<dyn Error>> {
    enter()?;
    let result = body();
    let restored = leave();
    let value = result?;
    restored?;
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key(quiz: &mut Quiz, key: KeyEvent) -> Flow {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('c') if ctrl => return Flow::Quit,
        KeyCode::Char('n') if ctrl => quiz.next(),
        KeyCode::Char('p') if ctrl => quiz.previous(),
        KeyCode::Char('r') if ctrl => quiz.new_mask(),
        KeyCode::Char('d') if ctrl => quiz.cycle_difficulty(),
        KeyCode::Char('s') if ctrl => quiz.speak(),
        KeyCode::Char('l') if ctrl => quiz.next_level(),
        KeyCode::Char('t') if ctrl => quiz.next_topic(),
        KeyCode::Char(_) if ctrl => {}
        KeyCode::Char(c) => quiz.type_char(c),
        KeyCode::Backspace => quiz.backspace(),
        KeyCode::Tab | KeyCode::Down => quiz.focus_next(),
        KeyCode::BackTab | KeyCode::Up => quiz.focus_prev(),
        KeyCode::Enter => quiz.check_or_next(),
        _ => {}
    }
    Flow::Continue
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, quiz: &mut Quiz) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| ui::draw(quiz, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                // Only the status line changes on its own
                if quiz.on_tick() {
                    terminal.draw(|f| ui::draw(quiz, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(quiz, f))?;
            }
            AppEvent::Key(key) => {
                if handle_key(quiz, key) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(quiz, f))?;
            }
        }
    }

    info!("quitting");
    Ok(())
}
