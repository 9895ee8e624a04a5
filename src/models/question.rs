use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single exam question in the bank.
///
/// Questions are tagged with a subject and a difficulty tier, which together
/// determine their eligibility for stratified exam assembly. Exams hold
/// snapshot copies, so editing or deleting a question never changes an exam
/// that was already generated from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its subject.
    pub code: String,
    /// Code of the subject this question belongs to. Not validated against
    /// the subject collection; may dangle after a subject is deleted.
    pub subject: String,
    pub text: String,
    pub difficulty: Difficulty,
    /// Optional knowledge-area tag, drawn from the subject's declared areas.
    pub knowledge_area: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The difficulty tier of a question.
///
/// Exams are assembled per tier, and questions appear in the generated paper
/// grouped in this order: Easy, Medium, Hard, VeryHard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    /// All tiers in assembly order.
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::VeryHard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::VeryHard => "very_hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "very_hard" | "very-hard" => Some(Self::VeryHard),
            _ => None,
        }
    }
}

/// Input for creating a new question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestionInput {
    pub code: String,
    pub subject: String,
    pub text: String,
    pub difficulty: Difficulty,
    pub knowledge_area: Option<String>,
}

/// Input for updating an existing question. All fields are optional for partial updates.
///
/// The question code and subject are the identifier and cannot be changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuestionInput {
    pub text: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub knowledge_area: Option<String>,
}

/// Filter criteria for listing questions.
///
/// All criteria are optional and combine with AND. `search` is a
/// case-insensitive substring match over the question code and text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub subject: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub knowledge_area: Option<String>,
    pub search: Option<String>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        if let Some(subject) = &self.subject {
            if &question.subject != subject {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if question.difficulty != difficulty {
                return false;
            }
        }
        if let Some(area) = &self.knowledge_area {
            if question.knowledge_area.as_ref() != Some(area) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !question.code.to_lowercase().contains(&needle)
                && !question.text.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}
