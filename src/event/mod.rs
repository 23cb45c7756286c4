//! Event handling for the operator console.
//!
//! Terminal events (keyboard, resize) are collected by a dispatcher task
//! and fed to the application loop over a channel. When no terminal event
//! arrives within the tick rate, a tick event is emitted instead so the
//! loop still gets a chance to drain poller channels and expire alerts.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use eyre::Result;
use futures::Stream;
use tokio::sync::mpsc;

/// Default event polling interval.
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(100);

/// Application events.
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),
    /// Terminal resize event
    Resize(u16, u16),
    /// Regular tick event for housekeeping
    Tick,
}

/// Event dispatcher that collects terminal events.
pub struct EventDispatcher {
    /// Polling interval
    tick_rate: Duration,
}

impl EventDispatcher {
    /// Create a new event dispatcher with the default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
        }
    }

    /// Set a custom tick rate.
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Wait for and return the next event.
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CrosstermEvent::Key(key) => Ok(Event::Key(key)),
                CrosstermEvent::Resize(width, height) => Ok(Event::Resize(width, height)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream of application events backed by a dispatcher task.
pub struct EventHandler {
    event_rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a handler and spawn its dispatcher task.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let _handle = tokio::spawn(async move {
            let dispatcher = EventDispatcher::new();
            loop {
                match dispatcher.next() {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });

        Self { event_rx: rx }
    }

    fn poll_event(&mut self, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        Pin::new(&mut self.event_rx).poll_recv(cx)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream for EventHandler {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.poll_event(cx)
    }
}
