use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Everything the trainer loop reacts to
#[derive(Clone, Debug)]
pub enum TrainerEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within the tick interval
    Tick,
    /// The event source hung up; no more input will arrive
    Closed,
}

/// Source of terminal events
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next event
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a helper thread
pub struct CrosstermEventSource {
    rx: Receiver<TrainerEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                // some terminals also report releases and repeats
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    TrainerEvent::Key(key)
                }
                Ok(CtEvent::Resize(_, _)) => TrainerEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    log::error!("terminal input closed: {e}");
                    break;
                }
            };
            if tx.send(evt).is_err() {
                break;
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

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Event source fed by a channel, for headless runs
pub struct ChannelEventSource {
    rx: Receiver<TrainerEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<TrainerEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pulls one event at a time, turning quiet periods into ticks.
///
/// Ticks are what the loop uses to poll for finished translations.
pub struct Runner<E: EventSource> {
    events: E,
    tick_rate: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(events: E, tick_rate: Duration) -> Self {
        Self { events, tick_rate }
    }

    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    pub fn step(&self) -> TrainerEvent {
        match self.events.recv_timeout(self.tick_rate) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => TrainerEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => TrainerEvent::Closed,
        }
    }
}
