//! # Incremental Reveal
//!
//! Turns a finished reply into a paced stream of growing prefixes:
//!
//! ```text
//! "Hello"  →  "H" ─tick─ "He" ─tick─ "Hel" ─tick─ "Hell" ─tick─ "Hello"  (end)
//! ```
//!
//! Pacing uses wall-clock ticks (`tokio::time::interval`), so the speed does
//! not depend on how often the UI redraws. A late tick is delayed rather than
//! bursting, which keeps the interval between two characters at or above the
//! cadence. The stream is single-shot: it ends after the full text and
//! cannot be rewound.

use std::time::Duration;

use futures::Stream;
use futures::stream;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Default time between two revealed characters.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(5);

struct Revealer {
    text: String,
    /// Byte offset of the end of the last emitted prefix.
    shown: usize,
    cadence: Duration,
    /// Started on first poll so the clock runs from when rendering begins.
    ticker: Option<Interval>,
}

impl Revealer {
    /// End of the prefix one character longer than the current one.
    fn next_end(&self) -> Option<usize> {
        let c = self.text[self.shown..].chars().next()?;
        Some(self.shown + c.len_utf8())
    }
}

/// Lazily reveals `text` one character per `cadence`.
///
/// The first prefix appears one cadence after the stream is first polled.
/// An empty `text` produces an empty stream.
pub fn prefixes(text: impl Into<String>, cadence: Duration) -> impl Stream<Item = String> {
    let state = Revealer {
        text: text.into(),
        shown: 0,
        cadence: cadence.max(Duration::from_millis(1)),
        ticker: None,
    };

    stream::unfold(state, |mut r| async move {
        let end = r.next_end()?;
        let cadence = r.cadence;
        let ticker = r.ticker.get_or_insert_with(|| {
            let mut ticker = interval_at(Instant::now() + cadence, cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;
        r.shown = end;
        Some((r.text[..end].to_string(), r))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[tokio::test(start_paused = true)]
    async fn reveals_every_prefix_in_order() {
        let frames: Vec<String> = prefixes("Hello", DEFAULT_CADENCE).collect().await;
        assert_eq!(frames, vec!["H", "He", "Hel", "Hell", "Hello"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_yields_nothing() {
        let frames: Vec<String> = prefixes("", DEFAULT_CADENCE).collect().await;
        assert!(frames.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn respects_multibyte_boundaries() {
        let frames: Vec<String> = prefixes("héé→", DEFAULT_CADENCE).collect().await;
        assert_eq!(frames, vec!["h", "hé", "héé", "héé→"]);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_is_wall_clock() {
        let cadence = Duration::from_millis(20);
        let start = Instant::now();
        let frames: Vec<String> = prefixes("abcd", cadence).collect().await;
        assert_eq!(frames.len(), 4);
        assert!(start.elapsed() >= cadence * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_shows_before_first_tick() {
        let cadence = Duration::from_millis(10);
        let mut frames = Box::pin(prefixes("ab", cadence));

        let mut next = task::spawn(frames.next());
        assert_pending!(next.poll());
        drop(next);

        tokio::time::advance(cadence).await;
        let mut next = task::spawn(frames.next());
        assert_ready_eq!(next.poll(), Some("a".to_string()));
    }
}
