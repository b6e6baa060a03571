//! The append-only session transcript.
//!
//! Entries are numbered by a strictly increasing `seq` allocated when an
//! utterance starts. A candidate utterance begins as a partial hypothesis
//! and is rewritten in place until the recognizer commits it; interviewer
//! utterances are always appended final.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Ai,
}

/// Why an utterance was spoken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtteranceKind {
    /// Interviewer greeting plus the first question.
    Opening,
    /// Candidate answer to a primary question or probe.
    Answer,
    /// Interviewer cut-in while the candidate was speaking.
    Interruption,
    /// Follow-up question drilling into the current answer.
    Probe,
    /// Steer back toward the current question.
    Redirect,
    /// Transition to the next question (or the closing remark).
    MoveForward,
}

/// One entry in the session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    /// Strictly increasing ordinal, unique within the session.
    pub seq: u64,
    pub speaker: Speaker,
    pub kind: UtteranceKind,
    pub text: String,
    /// `false` while the recognizer is still revising the hypothesis.
    pub is_final: bool,
    /// When the utterance started.
    pub timestamp: DateTime<Utc>,
}

/// Full record of everything said in a session.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Utterance>,
    next_seq: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Utterance] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seq that will be assigned to the next new utterance.
    pub const fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Append a finalized interviewer utterance and return its seq.
    pub fn push_ai(&mut self, kind: UtteranceKind, text: impl Into<String>) -> u64 {
        self.push(Speaker::Ai, kind, text.into(), true)
    }

    /// Record a partial candidate hypothesis.
    ///
    /// Rewrites the open candidate utterance in place if one exists,
    /// otherwise starts a new one. Returns the utterance's seq.
    pub fn update_user_partial(&mut self, text: impl Into<String>) -> u64 {
        let text = text.into();
        if let Some(open) = self.open_user_entry_mut() {
            open.text = text;
            return open.seq;
        }
        self.push(Speaker::User, UtteranceKind::Answer, text, false)
    }

    /// Seal the open candidate utterance with its final text.
    ///
    /// Starts (and immediately seals) a new utterance if none is open.
    /// Returns the utterance's seq.
    pub fn commit_user_final(&mut self, text: impl Into<String>) -> u64 {
        let text = text.into();
        if let Some(open) = self.open_user_entry_mut() {
            open.text = text;
            open.is_final = true;
            return open.seq;
        }
        self.push(Speaker::User, UtteranceKind::Answer, text, true)
    }

    /// The candidate utterance still being revised, if any.
    pub fn open_user_partial(&self) -> Option<&Utterance> {
        self.last_user_entry().filter(|u| !u.is_final)
    }

    /// Candidate text spoken since the given seq, joined for evaluation.
    ///
    /// Includes the open partial hypothesis, so a mid-answer evaluation
    /// sees everything heard so far.
    pub fn user_text_since(&self, seq: u64) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if entry.seq >= seq && entry.speaker == Speaker::User && !entry.text.is_empty() {
                parts.push(&entry.text);
            }
        }
        parts.join("\n")
    }

    /// Immutable copy handed to the report generator at finalization.
    pub fn freeze(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            entries: self.entries.clone(),
        }
    }

    fn push(&mut self, speaker: Speaker, kind: UtteranceKind, text: String, is_final: bool) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Utterance {
            seq,
            speaker,
            kind,
            text,
            is_final,
            timestamp: Utc::now(),
        });
        seq
    }

    fn last_user_entry(&self) -> Option<&Utterance> {
        self.entries.iter().rev().find(|u| u.speaker == Speaker::User)
    }

    fn open_user_entry_mut(&mut self) -> Option<&mut Utterance> {
        self.entries
            .iter_mut()
            .rev()
            .find(|u| u.speaker == Speaker::User)
            .filter(|u| !u.is_final)
    }
}

/// Frozen transcript passed across the report port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSnapshot {
    pub entries: Vec<Utterance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seqs_strictly_increase_across_speakers() {
        let mut t = Transcript::new();
        let a = t.push_ai(UtteranceKind::Opening, "hello");
        let b = t.update_user_partial("I think");
        let c = t.push_ai(UtteranceKind::Interruption, "let me stop you");
        assert!(a < b && b < c);
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn partial_rewrites_in_place_until_committed() {
        let mut t = Transcript::new();
        let first = t.update_user_partial("I");
        let second = t.update_user_partial("I would use");
        assert_eq!(first, second);
        assert_eq!(t.len(), 1);
        assert_eq!(t.open_user_partial().unwrap().text, "I would use");

        let sealed = t.commit_user_final("I would use a hash map");
        assert_eq!(sealed, first);
        assert!(t.open_user_partial().is_none());
        assert_eq!(t.entries()[0].text, "I would use a hash map");
        assert!(t.entries()[0].is_final);

        // The next partial opens a fresh utterance.
        let next = t.update_user_partial("also");
        assert!(next > sealed);
    }

    #[test]
    fn partial_survives_an_interleaved_ai_entry() {
        let mut t = Transcript::new();
        t.update_user_partial("so the main thing");
        t.push_ai(UtteranceKind::Interruption, "focus on the question");
        let seq = t.update_user_partial("so the main thing is caching");
        assert_eq!(seq, 0);
        let committed = t.commit_user_final("so the main thing is caching");
        assert_eq!(committed, 0);
    }

    #[test]
    fn commit_without_open_partial_creates_final_entry() {
        let mut t = Transcript::new();
        let seq = t.commit_user_final("short answer");
        assert_eq!(seq, 0);
        assert!(t.entries()[0].is_final);
    }

    #[test]
    fn user_text_since_joins_answers_and_open_partial() {
        let mut t = Transcript::new();
        t.push_ai(UtteranceKind::Opening, "q0");
        let mark = t.next_seq();
        t.commit_user_final("first part");
        t.push_ai(UtteranceKind::Probe, "why?");
        t.update_user_partial("because of");
        assert_eq!(t.user_text_since(mark), "first part\nbecause of");
    }

    #[test]
    fn freeze_is_detached_from_later_edits() {
        let mut t = Transcript::new();
        t.update_user_partial("draft");
        let snapshot = t.freeze();
        t.commit_user_final("final");
        assert_eq!(snapshot.entries[0].text, "draft");
        assert_eq!(t.entries()[0].text, "final");
    }
}
