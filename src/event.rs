use crossterm::event::{self, Event as TermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::warn;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Key press (release and repeat events are dropped)
  Key(KeyEvent),
  /// Terminal was resized; triggers a redraw
  Resize,
  /// Periodic tick for query polling and notification expiry
  Tick,
}

/// Reads terminal input on a blocking thread and interleaves it with ticks
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // crossterm's poll/read block, keep them off the async workers
    tokio::task::spawn_blocking(move || {
      let mut last_tick = Instant::now();
      loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        let ready = match event::poll(timeout) {
          Ok(ready) => ready,
          Err(e) => {
            warn!(error = %e, "Terminal poll failed");
            false
          }
        };

        if ready {
          let forwarded = match event::read() {
            Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            Ok(TermEvent::Resize(..)) => Some(Event::Resize),
            Ok(_) => None,
            Err(e) => {
              warn!(error = %e, "Terminal read failed");
              None
            }
          };
          if let Some(evt) = forwarded {
            if tx.send(evt).is_err() {
              break;
            }
          }
        }

        if last_tick.elapsed() >= tick_rate {
          if tx.send(Event::Tick).is_err() {
            break;
          }
          last_tick = Instant::now();
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
