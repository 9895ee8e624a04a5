//! Stratified exam assembly.
//!
//! An exam is drawn from the question bank one difficulty tier at a time:
//! each tier's questions are sampled uniformly without replacement, the
//! per-tier draws are concatenated in tier order, and a code is allocated
//! for the result. Assembly is all-or-nothing: every requested tier must be
//! satisfied in full, or the whole request fails with the complete list of
//! shortages and nothing is produced.

mod code;

pub use code::{allocate_code, CODE_PREFIX, CODE_SPACE};

use std::collections::HashSet;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::models::{Difficulty, Exam, Question, TierCounts};

/// A tier that could not supply the requested number of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortage {
    pub tier: Difficulty,
    pub requested: usize,
    pub available: usize,
}

impl Shortage {
    /// How many questions the tier is short by.
    pub fn deficit(&self) -> usize {
        self.requested - self.available
    }
}

/// Why an exam could not be assembled.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// One or more tiers cannot supply the requested counts. All short tiers
    /// are reported together, not just the first one found.
    #[error("insufficient questions: {}", describe_shortages(.shortages))]
    InsufficientQuestions { shortages: Vec<Shortage> },

    /// Every code in the namespace is taken.
    #[error("all {} exam codes are in use", CODE_SPACE)]
    NamespaceExhausted,
}

/// Draw `count` questions of one subject and tier, uniformly at random and
/// without replacement.
///
/// The pool is left untouched; selected questions are cloned out. Fewer
/// eligible questions than requested is a [`Shortage`], never a partial draw.
pub fn draw_questions<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[Question],
    subject: &str,
    tier: Difficulty,
    count: usize,
) -> Result<Vec<Question>, Shortage> {
    let mut eligible: Vec<&Question> = pool
        .iter()
        .filter(|q| q.subject == subject && q.difficulty == tier)
        .collect();

    if eligible.len() < count {
        return Err(Shortage {
            tier,
            requested: count,
            available: eligible.len(),
        });
    }

    eligible.shuffle(rng);
    eligible.truncate(count);
    Ok(eligible.into_iter().cloned().collect())
}

/// Assemble a new exam for a subject from the question pool.
///
/// Tiers are drawn in [`Difficulty::ALL`] order and concatenated; tiers with
/// a requested count of zero are skipped. A code is allocated only after
/// every tier has been satisfied.
pub fn assemble_exam<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[Question],
    existing_codes: &HashSet<String>,
    subject: &str,
    counts: TierCounts,
) -> Result<Exam, AssemblyError> {
    let questions = draw_all_tiers(rng, pool, subject, counts)?;
    let code = allocate_code(existing_codes)?;
    let now = Utc::now();

    Ok(Exam {
        code,
        subject: subject.to_string(),
        questions,
        tier_counts: counts,
        created_at: now,
        updated_at: now,
    })
}

/// Rebuild an existing exam with a fresh random selection.
///
/// The exam keeps its code and creation time; the previous selection is
/// discarded outright, never merged with the new draw.
pub fn regenerate_exam<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[Question],
    exam: &Exam,
    counts: TierCounts,
) -> Result<Exam, AssemblyError> {
    let questions = draw_all_tiers(rng, pool, &exam.subject, counts)?;

    Ok(Exam {
        code: exam.code.clone(),
        subject: exam.subject.clone(),
        questions,
        tier_counts: counts,
        created_at: exam.created_at,
        updated_at: Utc::now(),
    })
}

/// Count the eligible questions per tier for a subject.
pub fn available_by_tier(pool: &[Question], subject: &str) -> TierCounts {
    TierCounts::tally(pool.iter().filter(|q| q.subject == subject))
}

fn draw_all_tiers<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[Question],
    subject: &str,
    counts: TierCounts,
) -> Result<Vec<Question>, AssemblyError> {
    let mut questions = Vec::with_capacity(counts.total());
    let mut shortages = Vec::new();

    for tier in Difficulty::ALL {
        let count = counts.get(tier);
        if count == 0 {
            continue;
        }
        match draw_questions(rng, pool, subject, tier, count) {
            Ok(mut drawn) => questions.append(&mut drawn),
            Err(shortage) => shortages.push(shortage),
        }
    }

    if !shortages.is_empty() {
        return Err(AssemblyError::InsufficientQuestions { shortages });
    }

    Ok(questions)
}

fn describe_shortages(shortages: &[Shortage]) -> String {
    shortages
        .iter()
        .map(|s| {
            format!(
                "{} requested {}, available {}",
                s.tier.as_str(),
                s.requested,
                s.available
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}
