//! Candidate audio ingest: chunk reordering and the transcription backlog.
//!
//! Chunks arrive `seq`-numbered (starting at 1 per connection) and may be
//! reordered in flight. [`ReorderBuffer`] restores order within a bounded
//! window and never stalls the pipeline: when the window overflows, the
//! expected position jumps past the gap and the loss is logged.
//!
//! Released chunks feed the transcription service one call at a time.
//! [`ChunkBacklog`] holds what is waiting; past its cap the oldest entries
//! are merged pairwise so entry count stays bounded while raw audio is
//! preserved.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use viva_core::{SessionId, SpeechToText, SttError};

use crate::actor::SessionEvent;

/// First chunk seq a connection sends.
const FIRST_SEQ: u64 = 1;

// ── Reorder buffer ───────────────────────────────────────────────────────────

/// Restores arrival order of `seq`-numbered audio chunks.
#[derive(Debug)]
pub(crate) struct ReorderBuffer {
    /// Next seq expected for in-order release.
    next: u64,
    /// Out-of-order chunks waiting for the gap below them to fill.
    pending: BTreeMap<u64, Bytes>,
    window: usize,
}

impl ReorderBuffer {
    pub fn new(window: usize) -> Self {
        Self {
            next: FIRST_SEQ,
            pending: BTreeMap::new(),
            window,
        }
    }

    /// Forget all buffered chunks and expect a fresh numbering. Called when
    /// a new connection binds, since seqs are per-connection.
    pub fn reset(&mut self) {
        self.next = FIRST_SEQ;
        self.pending.clear();
    }

    /// Accept one chunk and return every chunk now deliverable in order.
    pub fn accept(&mut self, seq: u64, chunk: Bytes) -> Vec<Bytes> {
        if seq < self.next {
            tracing::warn!(seq, expected = self.next, "Dropping audio chunk below the reorder floor");
            return Vec::new();
        }

        if self.pending.insert(seq, chunk).is_some() {
            tracing::debug!(seq, "Duplicate audio chunk replaced in reorder buffer");
        }

        let mut released = self.drain_contiguous();

        if self.pending.len() > self.window {
            // A gap is holding the window hostage. Skip it rather than stall.
            if let Some(&lowest) = self.pending.keys().next() {
                tracing::warn!(
                    from = self.next,
                    to = lowest,
                    "Audio gap exceeded reorder window; skipping ahead"
                );
                self.next = lowest;
                released.extend(self.drain_contiguous());
            }
        }

        released
    }

    fn drain_contiguous(&mut self) -> Vec<Bytes> {
        let mut run = Vec::new();
        while let Some(chunk) = self.pending.remove(&self.next) {
            run.push(chunk);
            self.next += 1;
        }
        run
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ── Transcription backlog ────────────────────────────────────────────────────

/// In-order queue of audio awaiting transcription, bounded by entry count.
#[derive(Debug)]
pub(crate) struct ChunkBacklog {
    queue: VecDeque<Bytes>,
    max_entries: usize,
}

impl ChunkBacklog {
    pub fn new(max_entries: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            // Merging needs two entries to work with.
            max_entries: max_entries.max(2),
        }
    }

    /// Queue a chunk, merging the two oldest entries first when at the cap.
    pub fn push(&mut self, chunk: Bytes) {
        if self.queue.len() >= self.max_entries {
            if let (Some(first), Some(second)) = (self.queue.pop_front(), self.queue.pop_front()) {
                tracing::debug!(
                    entries = self.queue.len() + 2,
                    "Transcription backlog at capacity; merging oldest chunks"
                );
                let mut merged = BytesMut::with_capacity(first.len() + second.len());
                merged.extend_from_slice(&first);
                merged.extend_from_slice(&second);
                self.queue.push_front(merged.freeze());
            }
        }
        self.queue.push_back(chunk);
    }

    pub fn pop(&mut self) -> Option<Bytes> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

// ── Transcription calls ──────────────────────────────────────────────────────

/// Feed one chunk to the transcriber off-actor and post the outcome back.
pub(crate) fn spawn_transcribe(
    stt: Arc<dyn SpeechToText>,
    inbox: mpsc::UnboundedSender<SessionEvent>,
    session_id: SessionId,
    utterance: u64,
    chunk: Bytes,
    max_retries: u32,
    base_delay_ms: u64,
) {
    tokio::spawn(async move {
        let result = with_retry(
            || {
                let stt = Arc::clone(&stt);
                let chunk = chunk.clone();
                async move { stt.push_chunk(session_id, chunk).await }
            },
            max_retries,
            base_delay_ms,
            "push_chunk",
        )
        .await;
        let _ = inbox.send(SessionEvent::SttDone {
            utterance,
            closing: false,
            result,
        });
    });
}

/// Close the current utterance off-actor and post the final hypothesis back.
pub(crate) fn spawn_finish(
    stt: Arc<dyn SpeechToText>,
    inbox: mpsc::UnboundedSender<SessionEvent>,
    session_id: SessionId,
    utterance: u64,
    max_retries: u32,
    base_delay_ms: u64,
) {
    tokio::spawn(async move {
        let result = with_retry(
            || {
                let stt = Arc::clone(&stt);
                async move { stt.finish_utterance(session_id).await }
            },
            max_retries,
            base_delay_ms,
            "finish_utterance",
        )
        .await;
        let _ = inbox.send(SessionEvent::SttDone {
            utterance,
            closing: true,
            result,
        });
    });
}

/// Retry a transcription call with exponential backoff.
///
/// Returns the last error once `max_retries` extra attempts are spent;
/// the caller treats that as an unrecoverable session fault.
async fn with_retry<T, F, Fut>(
    mut op: F,
    max_retries: u32,
    base_delay_ms: u64,
    what: &'static str,
) -> Result<T, SttError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SttError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                let delay_ms = base_delay_ms.saturating_mul(1 << (attempt - 1).min(16));
                tracing::warn!(
                    call = what,
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Transcription call failed; retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => {
                tracing::error!(call = what, attempts = attempt + 1, error = %err, "Transcription retries exhausted");
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(tag: u8) -> Bytes {
        Bytes::from(vec![tag])
    }

    fn tags(chunks: &[Bytes]) -> Vec<u8> {
        chunks.iter().map(|c| c[0]).collect()
    }

    #[test]
    fn in_order_chunks_release_immediately() {
        let mut buf = ReorderBuffer::new(8);
        assert_eq!(tags(&buf.accept(1, chunk(1))), vec![1]);
        assert_eq!(tags(&buf.accept(2, chunk(2))), vec![2]);
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn out_of_order_arrival_is_released_in_order() {
        let mut buf = ReorderBuffer::new(8);
        assert_eq!(tags(&buf.accept(1, chunk(1))), vec![1]);
        assert!(buf.accept(3, chunk(3)).is_empty());
        assert_eq!(tags(&buf.accept(2, chunk(2))), vec![2, 3]);
        assert_eq!(tags(&buf.accept(4, chunk(4))), vec![4]);
    }

    #[test]
    fn chunk_below_floor_is_dropped() {
        let mut buf = ReorderBuffer::new(8);
        buf.accept(1, chunk(1));
        buf.accept(2, chunk(2));
        assert!(buf.accept(1, chunk(9)).is_empty());
        assert_eq!(tags(&buf.accept(3, chunk(3))), vec![3]);
    }

    #[test]
    fn window_overflow_skips_the_gap() {
        let mut buf = ReorderBuffer::new(3);
        // Seq 1 never arrives; 2..=4 fill the window.
        assert!(buf.accept(2, chunk(2)).is_empty());
        assert!(buf.accept(3, chunk(3)).is_empty());
        assert!(buf.accept(4, chunk(4)).is_empty());
        // The fourth pending chunk forces the floor past the gap.
        assert_eq!(tags(&buf.accept(5, chunk(5))), vec![2, 3, 4, 5]);
        // The late chunk 1 is now below the floor.
        assert!(buf.accept(1, chunk(1)).is_empty());
        assert_eq!(tags(&buf.accept(6, chunk(6))), vec![6]);
    }

    #[test]
    fn reset_restarts_numbering() {
        let mut buf = ReorderBuffer::new(8);
        buf.accept(1, chunk(1));
        buf.accept(3, chunk(3));
        buf.reset();
        assert_eq!(tags(&buf.accept(1, chunk(7))), vec![7]);
        assert_eq!(buf.pending_len(), 0);
    }

    #[test]
    fn backlog_merges_oldest_pair_at_capacity() {
        let mut backlog = ChunkBacklog::new(3);
        backlog.push(Bytes::from_static(b"a"));
        backlog.push(Bytes::from_static(b"b"));
        backlog.push(Bytes::from_static(b"c"));
        assert_eq!(backlog.len(), 3);

        backlog.push(Bytes::from_static(b"d"));
        assert_eq!(backlog.len(), 3);

        // Byte order survives the merge.
        assert_eq!(backlog.pop().unwrap().as_ref(), b"ab");
        assert_eq!(backlog.pop().unwrap().as_ref(), b"c");
        assert_eq!(backlog.pop().unwrap().as_ref(), b"d");
        assert!(backlog.pop().is_none());
    }

    #[test]
    fn backlog_cap_has_a_floor_of_two() {
        let mut backlog = ChunkBacklog::new(0);
        backlog.push(Bytes::from_static(b"a"));
        backlog.push(Bytes::from_static(b"b"));
        backlog.push(Bytes::from_static(b"c"));
        assert_eq!(backlog.pop().unwrap().as_ref(), b"ab");
        assert_eq!(backlog.pop().unwrap().as_ref(), b"c");
    }
}
