use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the game loop. `Tick` doubles as the
/// animation frame: the loop advances the indicator once per tick.
#[derive(Clone, Debug)]
pub enum PickEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Tick,
}

/// Source of input events (keyboard, resize). Abstracted so tests can feed
/// scripted events without a TTY.
pub trait PickEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event, or Err(Timeout).
    fn recv_timeout(&self, timeout: Duration) -> Result<PickEvent, RecvTimeoutError>;
}

/// Production event source pumping crossterm events off a reader thread.
pub struct CrosstermEventSource {
    rx: Receiver<PickEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(PickEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(w, h)) => {
                    if tx.send(PickEvent::Resize(w, h)).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PickEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PickEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Interval between animation ticks.
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Scripted event source for headless tests.
pub struct TestEventSource {
    rx: Receiver<PickEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PickEvent>) -> Self {
        Self { rx }
    }
}

impl PickEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PickEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Steps the game one event at a time; quiet periods turn into ticks, so the
/// indicator keeps moving while the player hesitates.
pub struct Runner<E: PickEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: PickEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Block up to one tick interval and return the next event, or `Tick` if
    /// none arrived.
    pub fn step(&self) -> PickEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => PickEvent::Tick,
        }
    }
}
