mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    ops::ControlFlow,
    sync::mpsc::Sender,
};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
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
use term_type::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    countdown::{Countdown, CountdownTick},
    history::{self, HistoryRecord, HistoryStore},
    logging,
    navigation::{Action, Screen, Transition},
    runtime::{
        spawn_terminal_reader, AppEvent, EventQueue, EventSource, FixedTicker, PeriodicTask,
        Runner, Ticker,
    },
    sampler::ProgressSampler,
    session::{Mode, SessionError, TypingSession, MAX_TIMED_SECS, MAX_WORD_COUNT},
    words::{self, TextError, WordList},
};
use tracing::{debug, info, warn};

/// a typing speed test for your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing speed test for your terminal with live wpm, accuracy, a results graph and a local history of past tests. Without a mode flag an interactive menu opens."
)]
pub struct Cli {
    /// number of words to use in test
    #[clap(
        short = 'w',
        long = "words",
        value_parser = clap::value_parser!(u64).range(1..=MAX_WORD_COUNT as u64),
        conflicts_with_all = ["number_of_secs", "prompt"]
    )]
    number_of_words: Option<u64>,

    /// number of seconds to run test
    #[clap(
        short = 's',
        long = "secs",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TIMED_SECS),
        conflicts_with = "prompt"
    )]
    number_of_secs: Option<u64>,

    /// custom text to type instead of random words
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// show past results
    History,
    /// delete all past results
    ClearHistory,
}

/// What the first screen of a run shows
#[derive(Debug, Clone, PartialEq)]
pub enum Launch {
    Screen(Screen),
    Test(TestSource),
}

impl Cli {
    fn launch(&self) -> Result<Launch, TextError> {
        if self.command == Some(Command::History) {
            return Ok(Launch::Screen(Screen::History));
        }
        if let Some(ref prompt) = self.prompt {
            return Ok(Launch::Test(TestSource::Custom(words::normalize(prompt)?)));
        }
        if let Some(secs) = self.number_of_secs {
            return Ok(Launch::Test(TestSource::Generated(Mode::Timed(secs))));
        }
        if let Some(n) = self.number_of_words {
            return Ok(Launch::Test(TestSource::Generated(Mode::WordCount(n as usize))));
        }
        Ok(Launch::Screen(Screen::Menu))
    }
}

/// Where the text of a test comes from; kept for retries
#[derive(Debug, Clone, PartialEq)]
pub enum TestSource {
    Generated(Mode),
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    Start(Mode),
    History,
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub label: &'static str,
    pub description: &'static str,
    pub shortcut: char,
    pub action: MenuAction,
}

pub const MENU_ITEMS: [MenuItem; 8] = [
    MenuItem {
        label: "Time 15s",
        description: "Timed mode - 15 seconds",
        shortcut: '1',
        action: MenuAction::Start(Mode::Timed(15)),
    },
    MenuItem {
        label: "Time 30s",
        description: "Timed mode - 30 seconds",
        shortcut: '2',
        action: MenuAction::Start(Mode::Timed(30)),
    },
    MenuItem {
        label: "Time 60s",
        description: "Timed mode - 60 seconds",
        shortcut: '3',
        action: MenuAction::Start(Mode::Timed(60)),
    },
    MenuItem {
        label: "Words 10",
        description: "Type 10 words",
        shortcut: '4',
        action: MenuAction::Start(Mode::WordCount(10)),
    },
    MenuItem {
        label: "Words 25",
        description: "Type 25 words",
        shortcut: '5',
        action: MenuAction::Start(Mode::WordCount(25)),
    },
    MenuItem {
        label: "Words 50",
        description: "Type 50 words",
        shortcut: '6',
        action: MenuAction::Start(Mode::WordCount(50)),
    },
    MenuItem {
        label: "History",
        description: "View past results",
        shortcut: 'h',
        action: MenuAction::History,
    },
    MenuItem {
        label: "Quit",
        description: "Exit the application",
        shortcut: 'q',
        action: MenuAction::Quit,
    },
];

pub struct App {
    pub screen: Screen,
    pub session: Option<TypingSession>,
    pub source: Option<TestSource>,
    pub menu_selected: usize,
    pub history_records: Vec<HistoryRecord>,
    pub history_scroll: usize,
    /// One-line message for the current screen, e.g. a failed save
    pub notice: Option<String>,
    pub config: Config,
    pub theme: ui::Theme,
    sampler: ProgressSampler,
    sample_task: Option<PeriodicTask>,
    countdown: Option<Countdown>,
    words: WordList,
    history: Box<dyn HistoryStore>,
    config_store: Box<dyn ConfigStore>,
    events: Sender<AppEvent>,
}

impl App {
    pub fn new(
        config: Config,
        words: WordList,
        history: Box<dyn HistoryStore>,
        config_store: Box<dyn ConfigStore>,
        events: Sender<AppEvent>,
    ) -> Self {
        // start on the mode picked last time
        let menu_selected = MENU_ITEMS
            .iter()
            .position(|item| item.action == MenuAction::Start(config.mode()))
            .unwrap_or(0);

        Self {
            screen: Screen::Menu,
            session: None,
            source: None,
            menu_selected,
            history_records: vec![],
            history_scroll: 0,
            notice: None,
            sampler: ProgressSampler::new(config.sample_interval()),
            config,
            theme: ui::Theme::default(),
            sample_task: None,
            countdown: None,
            words,
            history,
            config_store,
            events,
        }
    }

    pub fn launch(&mut self, launch: Launch) -> ControlFlow<()> {
        match launch {
            Launch::Screen(Screen::History) => {
                self.open_history();
                self.navigate(Action::OpenHistory)
            }
            Launch::Screen(_) => ControlFlow::Continue(()),
            Launch::Test(source) => self.begin_test(source, Action::StartTest),
        }
    }

    /// Builds a fresh session and its periodic tasks. Any previous session
    /// is discarded along with its tasks.
    pub fn start_test(&mut self, source: TestSource) -> Result<(), SessionError> {
        self.cancel_tasks();

        if let TestSource::Generated(mode) = &source {
            if !mode.is_valid() {
                return Err(SessionError::InvalidMode(*mode));
            }
        }

        let (target, mode) = match &source {
            TestSource::Generated(mode) => (self.words.pick_random(word_count_for(*mode)), *mode),
            TestSource::Custom(text) => (text.clone(), Mode::FreeText),
        };
        let session = TypingSession::new(target, mode)?;

        if let TestSource::Generated(mode) = &source {
            self.config.remember_mode(*mode);
            if let Err(err) = self.config_store.save(&self.config) {
                warn!(%err, "could not save config");
            }
        }

        let sample_interval = self.config.sample_interval();
        self.sampler = ProgressSampler::new(sample_interval);
        self.sample_task = Some(PeriodicTask::spawn(
            sample_interval,
            self.events.clone(),
            AppEvent::Sample,
        ));
        self.countdown = mode
            .is_timed()
            .then(|| Countdown::start(self.config.countdown_interval(), self.events.clone()));

        debug!(mode = %mode.label(), chars = session.target().len(), "test created");
        self.session = Some(session);
        self.source = Some(source);
        self.notice = None;
        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent) -> ControlFlow<()> {
        match event {
            AppEvent::Key(key) => return self.on_key(key),
            AppEvent::Sample => self.on_sample(),
            AppEvent::Countdown => return self.on_countdown(),
            AppEvent::Resize | AppEvent::Tick => {}
        }
        ControlFlow::Continue(())
    }

    fn on_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        if key.kind != KeyEventKind::Press {
            return ControlFlow::Continue(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            // ctrl+c to quit
            return self.navigate(Action::Quit);
        }

        match self.screen {
            Screen::Menu => self.on_menu_key(key),
            Screen::Typing => self.on_typing_key(key),
            Screen::Results => self.on_results_key(key),
            Screen::History => self.on_history_key(key),
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_selected = (self.menu_selected + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_selected = (self.menu_selected + 1) % MENU_ITEMS.len();
            }
            KeyCode::Enter => return self.activate(MENU_ITEMS[self.menu_selected].action),
            KeyCode::Esc => return self.navigate(Action::Quit),
            KeyCode::Char(c) => {
                if let Some(idx) = MENU_ITEMS.iter().position(|item| item.shortcut == c) {
                    self.menu_selected = idx;
                    return self.activate(MENU_ITEMS[idx].action);
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn activate(&mut self, action: MenuAction) -> ControlFlow<()> {
        match action {
            MenuAction::Start(mode) => self.begin_test(TestSource::Generated(mode), Action::StartTest),
            MenuAction::History => {
                self.open_history();
                self.navigate(Action::OpenHistory)
            }
            MenuAction::Quit => self.navigate(Action::Quit),
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        let Some(session) = self.session.as_mut() else {
            return self.navigate(Action::Abort);
        };

        match key.code {
            KeyCode::Esc => return self.abort_test(),
            // terminals commonly send ctrl+backspace as ctrl+h
            KeyCode::Char('w') | KeyCode::Char('h') if ctrl => session.delete_word(),
            KeyCode::Backspace if ctrl || alt => session.delete_word(),
            KeyCode::Backspace => session.backspace(),
            KeyCode::Char(c) if !ctrl => {
                session.type_char(c);
                if session.has_finished() {
                    return self.finish_test();
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn on_results_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        match key.code {
            KeyCode::Enter => {
                if let Some(source) = self.source.clone() {
                    return self.begin_test(source, Action::Retry);
                }
            }
            KeyCode::Tab => return self.navigate(Action::OpenMenu),
            KeyCode::Char('h') => {
                self.open_history();
                return self.navigate(Action::OpenHistory);
            }
            KeyCode::Esc | KeyCode::Char('q') => return self.navigate(Action::Quit),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn on_history_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Tab => return self.navigate(Action::Back),
            KeyCode::Char('q') => return self.navigate(Action::Quit),
            KeyCode::Up | KeyCode::Char('k') => {
                self.history_scroll = self.history_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.history_scroll + 1 < self.history_records.len() {
                    self.history_scroll += 1;
                }
            }
            KeyCode::Home => self.history_scroll = 0,
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn on_sample(&mut self) {
        if let Some(session) = self.session.as_mut() {
            self.sampler.on_tick(session);
        }
    }

    fn on_countdown(&mut self) -> ControlFlow<()> {
        let (Some(countdown), Some(session)) = (self.countdown.as_mut(), self.session.as_mut())
        else {
            return ControlFlow::Continue(());
        };

        if countdown.on_tick(session) == CountdownTick::Expired {
            return self.finish_test();
        }
        ControlFlow::Continue(())
    }

    fn begin_test(&mut self, source: TestSource, action: Action) -> ControlFlow<()> {
        match self.start_test(source) {
            Ok(()) => self.navigate(action),
            Err(err) => {
                warn!(%err, "could not start test");
                self.notice = Some(err.to_string());
                ControlFlow::Continue(())
            }
        }
    }

    fn finish_test(&mut self) -> ControlFlow<()> {
        self.cancel_tasks();
        let Some(session) = self.session.as_mut() else {
            return ControlFlow::Continue(());
        };
        session.finish();

        let summary = session.summary();
        info!(
            mode = %summary.mode_label,
            wpm = summary.wpm,
            accuracy = summary.accuracy,
            "test finished"
        );

        // a failed save must not keep the results from showing
        self.notice = match self.history.append(HistoryRecord::from(&summary)) {
            Ok(()) => None,
            Err(err) => {
                warn!(%err, "could not save result");
                Some(format!("result not saved: {err}"))
            }
        };
        self.navigate(Action::Finish)
    }

    fn abort_test(&mut self) -> ControlFlow<()> {
        self.cancel_tasks();
        self.session = None;
        debug!("test aborted");
        self.navigate(Action::Abort)
    }

    fn open_history(&mut self) {
        self.history_scroll = 0;
        match self.history.load() {
            Ok(records) => {
                self.history_records = records;
                self.notice = None;
            }
            Err(err) => {
                warn!(%err, "could not load history");
                self.history_records = vec![];
                self.notice = Some(err.to_string());
            }
        }
    }

    fn cancel_tasks(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
        if let Some(mut task) = self.sample_task.take() {
            task.cancel();
        }
    }

    fn navigate(&mut self, action: Action) -> ControlFlow<()> {
        match self.screen.next(action) {
            Transition::Go(screen) => {
                debug!(from = %self.screen, to = %screen, ?action, "navigate");
                self.screen = screen;
                ControlFlow::Continue(())
            }
            Transition::Stay => ControlFlow::Continue(()),
            Transition::Quit => {
                self.cancel_tasks();
                ControlFlow::Break(())
            }
        }
    }
}

fn word_count_for(mode: Mode) -> usize {
    match mode {
        Mode::WordCount(n) => n,
        Mode::Timed(secs) => words::words_for_secs(secs),
        Mode::FreeText => 0,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir));
    let history = history::open_default();

    if cli.command == Some(Command::ClearHistory) {
        history.clear()?;
        println!("History cleared.");
        return Ok(());
    }

    let launch = match cli.launch() {
        Ok(launch) => launch,
        Err(err) => Cli::command().error(ErrorKind::InvalidValue, err).exit(),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = config_store.load();
    let words = WordList::english()?;
    let queue = EventQueue::new();

    let mut app = App::new(
        config,
        words,
        history,
        Box::new(config_store),
        queue.sender(),
    );
    if app.launch(launch).is_break() {
        return Ok(());
    }
    info!(screen = %app.screen, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    spawn_terminal_reader(queue.sender());
    let runner = Runner::new(queue, FixedTicker::new(app.config.tick_rate()));
    let result = run_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.handle_event(runner.step()).is_break() {
            break;
        }
    }

    Ok(())
}
