//! Synchronization Engine
//!
//! Each tick walks the same path: poll the collector, snapshot the page, extract
//! words, diff them against the origin's cursor and send whatever is new.
//!
//! ```text
//! Idle → Polling → Extracting → Diffing → Sending → Idle
//!          │           │            │
//!          ╰ Disabled  ╰ Empty      ╰ UpToDate
//! ```
//!
//! The cursor only moves in memory mode, and only after a send was attempted.
//! A failed send still advances it; the batch is gone for good.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::cursor::CursorStore;
use crate::dispatch::SiteRegistry;
use crate::extract::parse_and_extract;
use crate::model::{CycleConfig, Delivery, PageSnapshot, SyncCursor, WordBatch, WordToken};
use crate::page::PageSource;
use crate::status::StatusSource;
use crate::transport::WordSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Collector said no, or could not be reached.
    Disabled,
    PageUnavailable,
    /// Nothing recognisable on the page.
    Empty,
    UpToDate,
    Sent {
        words: usize,
        delivery: Delivery,
        cursor: Option<SyncCursor>,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub struct Plan<'a> {
    pub new_words: &'a [WordToken],
    /// Value to persist after sending, if the cursor should move at all.
    pub next_cursor: Option<u64>,
}

/// Picks the words to send this cycle.
///
/// A cursor past the end of `words` means the text was replaced, so it counts as
/// zero. Without memory the whole text is sent and the cursor is left alone.
pub fn plan_batch(words: &[WordToken], sent_count: u64, config: CycleConfig) -> Plan<'_> {
    if !config.memory_enabled {
        return Plan {
            new_words: words,
            next_cursor: None,
        };
    }

    let start = match usize::try_from(sent_count) {
        Ok(n) if n <= words.len() => n,
        _ => 0,
    };
    let new_words = &words[start..];
    let next_cursor = if new_words.is_empty() {
        None
    } else {
        Some((start + new_words.len()) as u64)
    };

    Plan { new_words, next_cursor }
}

pub struct SyncEngine<P, T, S, C> {
    page: P,
    status: T,
    sink: S,
    cursors: C,
    registry: SiteRegistry,
    interval: Duration,
    /// Set when the collector asks for a resync, cleared once the cursor is wiped.
    pending_force: AtomicBool,
}

impl<P, T, S, C> SyncEngine<P, T, S, C>
where
    P: PageSource,
    T: StatusSource,
    S: WordSink,
    C: CursorStore,
{
    pub fn new(page: P, status: T, sink: S, cursors: C, registry: SiteRegistry, interval: Duration) -> Self {
        SyncEngine {
            page,
            status,
            sink,
            cursors,
            registry,
            interval,
            pending_force: AtomicBool::new(false),
        }
    }

    pub fn cursors(&self) -> &C {
        &self.cursors
    }

    /// Parsing and extraction happen in one synchronous call.
    fn extract(&self, snapshot: &PageSnapshot) -> Vec<WordToken> {
        let extractor = self.registry.resolve(&snapshot.url);
        tracing::trace!(url = %snapshot.url, schema = extractor.name(), "extracting");
        parse_and_extract(extractor.as_ref(), &snapshot.html)
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let status = self.status.poll().await;
        // The collector reports force only once, so keep it until a snapshot names the origin.
        if status.force {
            self.pending_force.store(true, Ordering::SeqCst);
        }
        if !status.enabled {
            return CycleOutcome::Disabled;
        }

        let snapshot = match self.page.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("page unavailable: {}", crate::unpack_error(&e));
                return CycleOutcome::PageUnavailable;
            }
        };
        let origin = snapshot.origin();

        if self.pending_force.swap(false, Ordering::SeqCst) {
            tracing::info!(origin, "force resync requested, clearing cursor");
            if let Err(e) = self.cursors.clear(&origin).await {
                tracing::error!(origin, "failed to clear cursor: {}", crate::unpack_error(&e));
            }
        }

        let words = self.extract(&snapshot);
        if words.is_empty() {
            return CycleOutcome::Empty;
        }

        let config = status.cycle_config();
        let sent_count = if config.memory_enabled {
            self.cursors.read(&origin).await
        } else {
            0
        };
        if (words.len() as u64) < sent_count {
            tracing::info!(origin, sent_count, words = words.len(), "text shrank, starting over");
        }

        let plan = plan_batch(&words, sent_count, config);
        if plan.new_words.is_empty() {
            return CycleOutcome::UpToDate;
        }

        let batch = WordBatch::new(plan.new_words);
        let next_cursor = plan.next_cursor;
        let delivery = self.sink.deliver(&batch).await;

        let cursor = match next_cursor {
            Some(sent_count) => match self.cursors.write(&origin, sent_count).await {
                Ok(()) => Some(SyncCursor {
                    origin: origin.clone(),
                    sent_count,
                }),
                Err(e) => {
                    tracing::error!(origin, "failed to store cursor: {}", crate::unpack_error(&e));
                    None
                }
            },
            None => None,
        };

        CycleOutcome::Sent {
            words: batch.words.len(),
            delivery,
            cursor,
        }
    }

    /// Runs one cycle per tick until `token` is cancelled. A slow cycle delays the
    /// next tick rather than overlapping with it.
    pub async fn run(&self, token: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_cycle().await {
                        CycleOutcome::Sent { words, delivery, cursor } => {
                            tracing::info!(
                                words,
                                delivered = delivery.is_delivered(),
                                cursor = cursor.map(|c| c.sent_count),
                                "sent words"
                            );
                        }
                        outcome => tracing::trace!(?outcome, "cycle finished"),
                    }
                }
                _ = token.cancelled() => {
                    tracing::info!("sync loop shutting down");
                    break;
                }
            }
        }
    }
}
