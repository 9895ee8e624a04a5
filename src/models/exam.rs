use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Difficulty, Question};

/// A generated exam paper.
///
/// An exam is a frozen artifact: it stores full copies of the questions
/// selected at assembly time, in tier order, along with the per-tier counts
/// that were requested. Later edits to the question bank do not affect it.
/// Regenerating an exam keeps its code and creation time but replaces the
/// entire question selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    /// Allocated identifier, unique across exams (e.g., `DT007`).
    pub code: String,
    /// Code of the subject the exam was assembled for.
    pub subject: String,
    /// Snapshot copies of the selected questions, concatenated in tier order.
    pub questions: Vec<Question>,
    /// The per-tier counts requested when the exam was assembled.
    pub tier_counts: TierCounts,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-tier question counts.
///
/// Doubles as the assembly request (how many questions to draw per tier) and
/// as the record of what an exam contains. Tiers with a count of zero are
/// skipped during assembly.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub very_hard: usize,
}

impl TierCounts {
    pub fn get(&self, tier: Difficulty) -> usize {
        match tier {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::VeryHard => self.very_hard,
        }
    }

    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard + self.very_hard
    }

    /// Counts questions per tier.
    pub fn tally<'a>(questions: impl IntoIterator<Item = &'a Question>) -> Self {
        let mut counts = Self::default();
        for question in questions {
            match question.difficulty {
                Difficulty::Easy => counts.easy += 1,
                Difficulty::Medium => counts.medium += 1,
                Difficulty::Hard => counts.hard += 1,
                Difficulty::VeryHard => counts.very_hard += 1,
            }
        }
        counts
    }
}
