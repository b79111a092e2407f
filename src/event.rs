use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for query polling and UI refresh
  Tick,
}

/// Merges terminal input with a periodic tick into one event source.
pub struct EventHandler {
  stream: EventStream,
  ticker: Interval,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let mut ticker = interval(tick_rate);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Self {
      stream: EventStream::new(),
      ticker,
    }
  }

  /// Receive the next event. `None` means the terminal input stream ended.
  pub async fn next(&mut self) -> Option<Event> {
    loop {
      tokio::select! {
        _ = self.ticker.tick() => return Some(Event::Tick),
        maybe = self.stream.next() => match maybe? {
          Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
            return Some(Event::Key(key));
          }
          Ok(_) => {}
          Err(_) => return None,
        },
      }
    }
  }
}
