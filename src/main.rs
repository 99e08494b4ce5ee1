pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use lacuna::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, EventSource, Runner, TrainerEvent},
    trainer::LineInput,
    translate::{GoogleTranslator, TranslationDesk, TranslationError},
    Trainer,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    ops::RangeInclusive,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;
const MIN_REPEATS_RANGE: RangeInclusive<usize> = 2..=100;

/// fill-in-the-blank romanian phrase trainer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice Romanian phrases by restoring hidden letters. Phrases come from a built-in list or are mined from your own text as frequently repeated word sequences."
)]
pub struct Cli {
    /// text file to mine practice phrases from
    file: Option<PathBuf>,

    /// minimum number of times a phrase must repeat to be picked up
    #[clap(short = 'r', long)]
    min_repeats: Option<usize>,

    /// shortest mined phrase, in words
    #[clap(long)]
    min_words: Option<usize>,

    /// longest mined phrase, in words
    #[clap(long)]
    max_words: Option<usize>,

    /// language code translations are requested in
    #[clap(short = 't', long)]
    target_lang: Option<String>,

    /// never contact the translation service
    #[clap(long)]
    no_translate: bool,
}

impl Cli {
    /// Command line flags win over the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(r) = self.min_repeats {
            config.min_repeats = r;
        }
        if let Some(n) = self.min_words {
            config.min_words = n;
        }
        if let Some(n) = self.max_words {
            config.max_words = n;
        }
        if let Some(ref lang) = self.target_lang {
            config.target_lang = lang.clone();
        }
        if self.no_translate {
            config.translate = false;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PromptField {
    #[strum(to_string = "File")]
    Path,
    #[strum(to_string = "Min. repeats")]
    MinRepeats,
}

/// The "open file" form
#[derive(Debug, Clone)]
pub struct LoadPrompt {
    pub path: LineInput,
    pub min_repeats: usize,
    pub focus: PromptField,
}

impl LoadPrompt {
    fn new(min_repeats: usize) -> Self {
        Self {
            path: LineInput::default(),
            min_repeats: min_repeats.clamp(*MIN_REPEATS_RANGE.start(), *MIN_REPEATS_RANGE.end()),
            focus: PromptField::Path,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            PromptField::Path => PromptField::MinRepeats,
            PromptField::MinRepeats => PromptField::Path,
        };
    }

    fn bump_repeats(&mut self, up: bool) {
        let next = if up {
            self.min_repeats.saturating_add(1)
        } else {
            self.min_repeats.saturating_sub(1)
        };
        if MIN_REPEATS_RANGE.contains(&next) {
            self.min_repeats = next;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Practice,
    LoadFile,
}

pub struct App {
    pub trainer: Trainer,
    pub state: AppState,
    pub prompt: LoadPrompt,
    pub config: Config,
    pub desk: Option<TranslationDesk>,
    settings_changed: bool,
}

impl App {
    pub fn new(config: Config, file: Option<&Path>) -> Self {
        let desk = if config.translate {
            match GoogleTranslator::new(config.translate_timeout()) {
                Ok(translator) => Some(TranslationDesk::new(
                    Arc::new(translator),
                    config.source_lang.clone(),
                    config.target_lang.clone(),
                )),
                Err(e) => {
                    log::warn!("translation disabled: {e}");
                    None
                }
            }
        } else {
            None
        };
        Self::with_desk(config, desk, file)
    }

    pub fn with_desk(config: Config, desk: Option<TranslationDesk>, file: Option<&Path>) -> Self {
        let mut trainer = Trainer::default();
        trainer.next_phrase();
        if let Some(path) = file {
            // a failed load leaves the built-in phrases up, with the error shown
            let _ = trainer.load_file(path, &config.miner_config());
        }

        Self {
            trainer,
            state: AppState::Practice,
            prompt: LoadPrompt::new(config.min_repeats),
            config,
            desk,
            settings_changed: false,
        }
    }

    pub fn settings_changed(&self) -> bool {
        self.settings_changed
    }

    /// Handle one key press. Returns false when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if shortcut(&key) && key.code == KeyCode::Char('c') {
            return false;
        }

        match self.state {
            AppState::Practice => self.on_practice_key(key),
            AppState::LoadFile => {
                self.on_prompt_key(key);
                true
            }
        }
    }

    fn on_practice_key(&mut self, key: KeyEvent) -> bool {
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shortcut = shortcut(&key);

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Enter => self.trainer.submit(),
            KeyCode::Right if alt => {
                self.trainer.next_phrase();
            }
            KeyCode::Left if alt => {
                self.trainer.prev_phrase();
            }
            KeyCode::Up if alt || ctrl => self.trainer.increase_hide(),
            KeyCode::Down if alt || ctrl => self.trainer.decrease_hide(),
            KeyCode::Char('t') if shortcut => self.translate(),
            KeyCode::Char('o') if shortcut => {
                self.prompt = LoadPrompt::new(self.config.min_repeats);
                self.state = AppState::LoadFile;
            }
            KeyCode::Left => self.trainer.answer_mut().left(),
            KeyCode::Right => self.trainer.answer_mut().right(),
            KeyCode::Home => self.trainer.answer_mut().home(),
            KeyCode::End => self.trainer.answer_mut().end(),
            KeyCode::Backspace => self.trainer.answer_mut().backspace(),
            KeyCode::Delete => self.trainer.answer_mut().delete(),
            // AltGr arrives as Ctrl+Alt on Windows
            KeyCode::Char(c) if ctrl == alt => self.trainer.answer_mut().insert(c),
            _ => {}
        }
        true
    }

    fn on_prompt_key(&mut self, key: KeyEvent) {
        match (key.code, self.prompt.focus) {
            (KeyCode::Esc, _) => self.state = AppState::Practice,
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => self.prompt.toggle_focus(),
            (KeyCode::Enter, _) => self.load_from_prompt(),
            (KeyCode::Up | KeyCode::Char('+'), PromptField::MinRepeats) => {
                self.prompt.bump_repeats(true)
            }
            (KeyCode::Down | KeyCode::Char('-'), PromptField::MinRepeats) => {
                self.prompt.bump_repeats(false)
            }
            (KeyCode::Left, PromptField::Path) => self.prompt.path.left(),
            (KeyCode::Right, PromptField::Path) => self.prompt.path.right(),
            (KeyCode::Home, PromptField::Path) => self.prompt.path.home(),
            (KeyCode::End, PromptField::Path) => self.prompt.path.end(),
            (KeyCode::Backspace, PromptField::Path) => self.prompt.path.backspace(),
            (KeyCode::Delete, PromptField::Path) => self.prompt.path.delete(),
            (KeyCode::Char(c), PromptField::Path) => self.prompt.path.insert(c),
            _ => {}
        }
    }

    fn load_from_prompt(&mut self) {
        let path = self.prompt.path.text();
        let path = path.trim();
        if path.is_empty() {
            return;
        }

        let mut miner_config = self.config.miner_config();
        miner_config.min_repeats = self.prompt.min_repeats;

        if self.trainer.load_file(path, &miner_config).is_ok()
            && self.config.min_repeats != self.prompt.min_repeats
        {
            self.config.min_repeats = self.prompt.min_repeats;
            self.settings_changed = true;
        }
        self.state = AppState::Practice;
    }

    fn translate(&mut self) {
        match self.desk {
            Some(ref desk) => {
                self.trainer.request_translation(desk);
            }
            None => self.trainer.translation_unavailable(TranslationError::Disabled),
        }
    }

    /// Apply any finished translation. Returns true when the screen changed.
    pub fn poll_translation(&mut self) -> bool {
        let mut changed = false;
        if let Some(ref desk) = self.desk {
            while let Some(reply) = desk.try_recv() {
                changed |= self.trainer.apply_translation(reply);
            }
        }
        changed
    }
}

/// Ctrl without Alt, so AltGr letters are not taken as shortcuts
fn shortcut(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        logging::init(&path);
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    let mut app = App::new(config, cli.file.as_deref());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if app.settings_changed() {
        if let Err(e) = store.save(&app.config) {
            log::warn!("could not save settings to {}: {e}", store.path().display());
        }
    }

    result
}

fn start_tui<B: Backend, E: EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            TrainerEvent::Tick => {
                if app.poll_translation() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            TrainerEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            TrainerEvent::Closed => {
                log::warn!("input closed, leaving the trainer");
                break;
            }
            TrainerEvent::Key(key) => {
                if !app.on_key(key) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
    if app.state == AppState::LoadFile {
        ui::render_load_prompt(&app.prompt, f);
    }
}
