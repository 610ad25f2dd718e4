use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::metrics::{CharMetric, CharMetrics};

/// Characters per "word" in the WPM convention
const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Completed,
}

/// How a single target position should be shown to the typist
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharStatus {
    Untyped,
    Correct,
    Incorrect,
}

/// One race against a fixed target text.
///
/// Two error measures are kept on purpose. `correct_chars`/`errors` compare
/// the current input with the target and change as the typist corrects
/// mistakes. The first-attempt ledger records, per target index, whether the
/// character typed the first time input reached that index was wrong; an
/// entry is written once and never touched again, so `accuracy` reflects
/// first-try skill rather than corrected text.
#[derive(Debug, Clone)]
pub struct TypingSession {
    target: Vec<char>,
    input: Vec<char>,
    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    first_attempt_mistakes: BTreeMap<usize, bool>,
    completed: bool,
    correct_chars: usize,
    errors: usize,
}

impl TypingSession {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.chars().collect(),
            input: Vec::new(),
            started_at: None,
            ended_at: None,
            first_attempt_mistakes: BTreeMap::new(),
            completed: false,
            correct_chars: 0,
            errors: 0,
        }
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn input_text(&self) -> String {
        self.input.iter().collect()
    }

    /// Ledger of first attempts: index -> `true` when the first try was a mistake
    pub fn first_attempt_mistakes(&self) -> &BTreeMap<usize, bool> {
        &self.first_attempt_mistakes
    }

    pub fn correct_chars(&self) -> usize {
        self.correct_chars
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn phase(&self) -> SessionPhase {
        if self.completed {
            SessionPhase::Completed
        } else if self.started_at.is_some() {
            SessionPhase::InProgress
        } else {
            SessionPhase::NotStarted
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Record the start time, only the first time it is called
    pub fn start_at(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn add_input(&mut self, c: char) {
        if self.completed {
            return;
        }
        self.start();

        // The ledger index is the length before the append.
        let idx = self.input.len();
        if idx < self.target.len() {
            self.first_attempt_mistakes
                .entry(idx)
                .or_insert(c != self.target[idx]);
        }

        self.input.push(c);

        if self.input.len() >= self.target.len() {
            self.complete();
        }
    }

    pub fn backspace(&mut self) {
        if self.completed {
            return;
        }
        self.input.pop();
    }

    /// Drop trailing whitespace, then the word before it
    pub fn backspace_word(&mut self) {
        if self.completed || self.input.is_empty() {
            return;
        }

        while self.input.last().is_some_and(|c| c.is_whitespace()) {
            self.input.pop();
        }
        while self.input.last().is_some_and(|c| !c.is_whitespace()) {
            self.input.pop();
        }
    }

    pub fn complete(&mut self) {
        self.complete_at(Instant::now());
    }

    /// Finish the race, even before the whole target was typed. Does nothing
    /// if the race never started or already finished.
    pub fn complete_at(&mut self, now: Instant) {
        if self.completed || self.started_at.is_none() {
            return;
        }
        self.ended_at = Some(now);
        self.completed = true;
        self.calculate_stats();

        debug!(
            typed = self.input.len(),
            target = self.target.len(),
            errors = self.errors,
            accuracy = self.accuracy(),
            "race completed"
        );
    }

    /// Recount `correct_chars` and `errors` from the current input. Characters
    /// typed past the end of the target count as errors.
    pub fn calculate_stats(&mut self) {
        let (correct, wrong) = self
            .input
            .iter()
            .zip(&self.target)
            .fold((0, 0), |(correct, wrong), (typed, expected)| {
                if typed == expected {
                    (correct + 1, wrong)
                } else {
                    (correct, wrong + 1)
                }
            });

        self.correct_chars = correct;
        self.errors = wrong + self.input.len().saturating_sub(self.target.len());
    }

    /// Time spent racing so far, or in total once completed
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) if self.completed => end.saturating_duration_since(start),
            (Some(start), _) => now.saturating_duration_since(start),
            (None, _) => Duration::ZERO,
        }
    }

    pub fn wpm(&self) -> f64 {
        self.wpm_at(Instant::now())
    }

    pub fn wpm_at(&self, now: Instant) -> f64 {
        if !self.has_started() {
            return 0.0;
        }

        let minutes = self.elapsed_at(now).as_secs_f64() / 60.0;
        if minutes == 0.0 {
            return 0.0;
        }

        (self.input.len() as f64 / CHARS_PER_WORD) / minutes
    }

    /// Percentage of attempted positions that were right on the first try
    pub fn accuracy(&self) -> f64 {
        if self.input.is_empty() || self.first_attempt_mistakes.is_empty() {
            return 100.0;
        }

        let total = self.first_attempt_mistakes.len();
        let clean = self
            .first_attempt_mistakes
            .values()
            .filter(|mistake| !**mistake)
            .count();

        clean as f64 / total as f64 * 100.0
    }

    /// Accuracy of the text as it currently stands, corrections included
    pub fn live_accuracy(&self) -> f64 {
        if self.input.is_empty() {
            return 100.0;
        }

        let matching = self
            .input
            .iter()
            .zip(&self.target)
            .filter(|(typed, expected)| typed == expected)
            .count();

        matching as f64 / self.input.len() as f64 * 100.0
    }

    /// Per-character attempts and first-try mistakes for this race, keyed by
    /// the target character with its case preserved
    pub fn session_stats(&self) -> CharMetrics {
        self.first_attempt_mistakes
            .iter()
            .filter_map(|(&idx, &mistake)| self.target.get(idx).map(|&c| (c, mistake)))
            .fold(BTreeMap::new(), |mut stats, (c, mistake)| {
                let entry: &mut CharMetric = stats.entry(c).or_default();
                entry.attempts += 1;
                if mistake {
                    entry.mistakes += 1;
                }
                stats
            })
    }

    /// Live status of target position `idx` against the current input
    pub fn position_status(&self, idx: usize) -> CharStatus {
        match (self.input.get(idx), self.target.get(idx)) {
            (Some(typed), Some(expected)) if typed == expected => CharStatus::Correct,
            (Some(_), _) => CharStatus::Incorrect,
            (None, _) => CharStatus::Untyped,
        }
    }

    /// Status of target position `idx` on the typist's first attempt
    pub fn first_attempt_status(&self, idx: usize) -> CharStatus {
        match self.first_attempt_mistakes.get(&idx) {
            Some(true) => CharStatus::Incorrect,
            Some(false) => CharStatus::Correct,
            None => CharStatus::Untyped,
        }
    }
}
