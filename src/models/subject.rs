use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An academic subject that questions and exams belong to.
///
/// Subjects have an independent lifecycle: deleting a subject does not
/// cascade to its questions or exams. References from those records are
/// by subject code and may dangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Identifier, unique across subjects (e.g., `MATH101`).
    pub code: String,
    pub name: String,
    pub credits: u32,
    /// Knowledge areas questions of this subject can be tagged with.
    pub knowledge_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectInput {
    pub code: String,
    pub name: String,
    pub credits: u32,
    #[serde(default)]
    pub knowledge_areas: Vec<String>,
}

/// Input for updating an existing subject. All fields are optional for partial updates.
///
/// The subject code is the identifier and cannot be changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubjectInput {
    pub name: Option<String>,
    pub credits: Option<u32>,
    pub knowledge_areas: Option<Vec<String>>,
}
