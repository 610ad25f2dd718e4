use std::collections::BTreeMap;
use std::ops::AddAssign;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Cumulative first-try outcome counts for one character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharMetric {
    pub attempts: u64,
    pub mistakes: u64,
}

impl CharMetric {
    /// Percentage of attempts typed right the first time
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        (self.attempts.saturating_sub(self.mistakes)) as f64 / self.attempts as f64 * 100.0
    }
}

impl AddAssign for CharMetric {
    fn add_assign(&mut self, other: Self) {
        self.attempts += other.attempts;
        self.mistakes += other.mistakes;
    }
}

pub type CharMetrics = BTreeMap<char, CharMetric>;

/// Canonical bucket key: `'A'` and `'a'` share a bucket
pub fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Fold one finished race's stats into the running totals.
///
/// Must be called once per completed race.
pub fn merge(mut existing: CharMetrics, session: &CharMetrics) -> CharMetrics {
    merge_into(&mut existing, session);
    existing
}

pub fn merge_into(existing: &mut CharMetrics, session: &CharMetrics) {
    for (&c, &metric) in session {
        *existing.entry(fold_case(c)).or_default() += metric;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterReportRow {
    pub character: char,
    pub attempts: u64,
    pub mistakes: u64,
    pub accuracy: f64,
}

impl CharacterReportRow {
    pub fn display_char(&self) -> String {
        match self.character {
            ' ' => "SPC".to_string(),
            c => c.to_uppercase().to_string(),
        }
    }
}

/// Rows for the metrics screen, worst accuracy first, then most attempted.
///
/// Keys are folded again here so records written with case-preserved keys
/// still land in one row per letter.
pub fn report(metrics: &CharMetrics) -> Vec<CharacterReportRow> {
    let mut folded = CharMetrics::new();
    merge_into(&mut folded, metrics);

    folded
        .into_iter()
        .map(|(character, m)| CharacterReportRow {
            character,
            attempts: m.attempts,
            mistakes: m.mistakes,
            accuracy: m.accuracy(),
        })
        .sorted_by(|a, b| {
            a.accuracy
                .total_cmp(&b.accuracy)
                .then_with(|| b.attempts.cmp(&a.attempts))
                .then_with(|| a.character.cmp(&b.character))
        })
        .collect()
}
