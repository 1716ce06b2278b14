mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
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
    io::{self, stdin},
    time::Duration,
};

use picklock::{
    config::{Config, ConfigStore, FileConfigStore, RawConfig},
    events::GameEvent,
    input::{apply_action, Action},
    runtime::{CrosstermEventSource, FixedTicker, PickEvent, PickEventSource, Runner, Ticker},
    session::{Session, SessionStatus},
    TICK_RATE_MS,
};

/// terminal lockpicking minigame
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timing minigame: run the pick down the track and set it inside the sweet spot to pop each barrel in sequence. A bad set snaps a pick and re-locks everything."
)]
pub struct Cli {
    /// number of lock barrels (3-5)
    #[clap(short = 'u', long)]
    units: Option<u8>,

    /// starting number of lockpicks
    #[clap(short = 'p', long)]
    picks: Option<u32>,

    /// width of the sweet spot, in surface units
    #[clap(short = 'z', long)]
    window_size: Option<f64>,

    /// comma-separated candidate pick speeds (0.5-5)
    #[clap(short = 's', long, value_delimiter = ',')]
    speeds: Option<Vec<f64>>,

    /// how far the pick travels before stopping on its own (50-100%)
    #[clap(short = 't', long)]
    track_length: Option<f64>,

    /// leftmost percentage a sweet spot can appear at
    #[clap(long)]
    target_min: Option<f64>,

    /// rightmost percentage a sweet spot can appear at
    #[clap(long)]
    target_max: Option<f64>,

    /// seed for reproducible sessions
    #[clap(long)]
    seed: Option<u64>,

    /// persist the resolved flags to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overlay the flags that were actually given onto a stored raw config.
    fn apply_to(&self, mut raw: RawConfig) -> RawConfig {
        if let Some(u) = self.units {
            raw.unit_count = Some(f64::from(u));
        }
        if let Some(p) = self.picks {
            raw.initial_picks = Some(f64::from(p));
        }
        if let Some(z) = self.window_size {
            raw.target_window_size = Some(z);
        }
        if let Some(s) = &self.speeds {
            raw.speed_variants = Some(s.clone());
        }
        if let Some(t) = self.track_length {
            raw.track_length = Some(t);
        }
        if let Some(min) = self.target_min {
            raw.target_position_min = Some(min);
        }
        if let Some(max) = self.target_max {
            raw.target_position_max = Some(max);
        }
        raw
    }
}

/// Surface units per terminal column: an 80-column terminal spans the nominal
/// 1000-unit surface, so configured window sizes keep their intended feel and
/// a wider terminal shrinks the window's share of travel.
const SURFACE_UNITS_PER_CELL: f64 = 12.5;

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub session: Session,
    /// One-line reaction to the latest game event, shown under the track.
    pub message: Option<String>,
}

impl App {
    pub fn new(config: Config, seed: Option<u64>) -> Self {
        let session = match seed {
            Some(s) => Session::with_seed(config, s),
            None => Session::new(config),
        };
        Self {
            session,
            message: None,
        }
    }

    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::new(config, Some(seed))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }

        match self.session.status() {
            SessionStatus::Idle => match key.code {
                KeyCode::Esc => return KeyOutcome::Quit,
                _ => self.session.start(),
            },
            SessionStatus::Active => match key.code {
                KeyCode::Esc => return KeyOutcome::Quit,
                KeyCode::Char('r') => self.restart(),
                KeyCode::Char('w') | KeyCode::Char('W') => {
                    apply_action(&mut self.session, Action::Engage)
                }
                KeyCode::Enter => apply_action(&mut self.session, Action::Commit),
                _ => {}
            },
            SessionStatus::Won | SessionStatus::Lost => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Char('r') => self.restart(),
                _ => {}
            },
        }

        self.pump_events();
        KeyOutcome::Continue
    }

    pub fn on_tick(&mut self) {
        self.session.on_tick();
        self.pump_events();
    }

    pub fn on_resize(&mut self, width: u16) {
        self.session
            .set_surface_width(f64::from(width) * SURFACE_UNITS_PER_CELL);
    }

    fn restart(&mut self) {
        self.session.reset();
        self.message = None;
    }

    /// Turn queued game events into the status line; sounds and flashes
    /// would hang off the same queue.
    fn pump_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::UnitEngaged { speed, .. } => {
                    self.message = Some(format!("pick running at {speed:.1}x"));
                }
                GameEvent::UnitHit { unit } => {
                    self.message = Some(format!("click! barrel {unit} set"));
                }
                GameEvent::UnitMissed { picks_left, .. } => {
                    self.message = Some(format!("snap! pick broke, {picks_left} left"));
                }
                GameEvent::TrackEndReached => {
                    self.message = Some("pick ran out, no harm done".to_string());
                }
                // The terminal screens and the barrel row carry these.
                GameEvent::FullReset | GameEvent::SessionWon | GameEvent::SessionLost => {}
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let raw = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&raw)?;
    }
    let config = Config::from_raw(raw);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, cli.seed);
    app.on_resize(terminal.size()?.width);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend, E: PickEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            PickEvent::Tick => {
                if app.session.is_engaged() {
                    app.on_tick();
                }
            }
            PickEvent::Resize(width, _) => app.on_resize(width),
            PickEvent::Key(key) => {
                if app.handle_key(key) == KeyOutcome::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}
