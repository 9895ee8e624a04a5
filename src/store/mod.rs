use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::*;

const SUBJECTS_KEY: &str = "subjects";
const QUESTIONS_KEY: &str = "questions";
const EXAMS_KEY: &str = "exams";

/// Where collections live: one JSON document per collection key.
enum Backend {
    /// A `<key>.json` file per collection inside the data directory.
    Dir(PathBuf),
    /// Collections held in memory, for tests.
    Memory(HashMap<String, String>),
}

/// Persistent storage for the exam bank.
///
/// Collections are whole JSON documents under string keys. A collection that
/// is missing or fails to parse loads as empty; unexpected I/O failures are
/// reported as errors.
pub struct Store {
    backend: Arc<Mutex<Backend>>,
}

impl Store {
    /// Opens a store rooted at the given directory, creating it if needed.
    pub fn open(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self {
            backend: Arc::new(Mutex::new(Backend::Dir(dir))),
        })
    }

    /// Opens the store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "exambank")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Self::open(dirs.data_dir().to_path_buf())
    }

    pub fn open_memory() -> Self {
        Self {
            backend: Arc::new(Mutex::new(Backend::Memory(HashMap::new()))),
        }
    }

    // ============================================================
    // Subject operations
    // ============================================================

    pub fn get_all_subjects(&self) -> Result<Vec<Subject>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let mut subjects: Vec<Subject> = load(&backend, SUBJECTS_KEY)?;
        subjects.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(subjects)
    }

    pub fn get_subject(&self, code: &str) -> Result<Option<Subject>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let subjects: Vec<Subject> = load(&backend, SUBJECTS_KEY)?;
        Ok(subjects.into_iter().find(|s| s.code == code))
    }

    pub fn create_subject(&self, input: CreateSubjectInput) -> Result<Subject> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut subjects: Vec<Subject> = load(&backend, SUBJECTS_KEY)?;

        if subjects.iter().any(|s| s.code == input.code) {
            anyhow::bail!("Subject {} already exists", input.code);
        }

        let now = Utc::now();
        let subject = Subject {
            code: input.code,
            name: input.name,
            credits: input.credits,
            knowledge_areas: input.knowledge_areas,
            created_at: now,
            updated_at: now,
        };

        subjects.push(subject.clone());
        save(&mut backend, SUBJECTS_KEY, &subjects)?;

        Ok(subject)
    }

    pub fn update_subject(&self, code: &str, input: UpdateSubjectInput) -> Result<Option<Subject>> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut subjects: Vec<Subject> = load(&backend, SUBJECTS_KEY)?;

        let Some(position) = subjects.iter().position(|s| s.code == code) else {
            return Ok(None);
        };

        let existing = subjects[position].clone();
        let updated = Subject {
            code: existing.code,
            name: input.name.unwrap_or(existing.name),
            credits: input.credits.unwrap_or(existing.credits),
            knowledge_areas: input.knowledge_areas.unwrap_or(existing.knowledge_areas),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        subjects[position] = updated.clone();
        save(&mut backend, SUBJECTS_KEY, &subjects)?;

        Ok(Some(updated))
    }

    /// Deletes a subject. Questions and exams referencing it are left alone.
    pub fn delete_subject(&self, code: &str) -> Result<bool> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut subjects: Vec<Subject> = load(&backend, SUBJECTS_KEY)?;

        let before = subjects.len();
        subjects.retain(|s| s.code != code);
        if subjects.len() == before {
            return Ok(false);
        }

        save(&mut backend, SUBJECTS_KEY, &subjects)?;
        Ok(true)
    }

    // ============================================================
    // Question operations
    // ============================================================

    pub fn get_all_questions(&self) -> Result<Vec<Question>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let mut questions: Vec<Question> = load(&backend, QUESTIONS_KEY)?;
        questions.sort_by(|a, b| a.subject.cmp(&b.subject).then_with(|| a.code.cmp(&b.code)));
        Ok(questions)
    }

    pub fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let questions: Vec<Question> = load(&backend, QUESTIONS_KEY)?;

        let mut matched: Vec<Question> = questions
            .into_iter()
            .filter(|q| filter.matches(q))
            .collect();
        matched.sort_by(|a, b| a.subject.cmp(&b.subject).then_with(|| a.code.cmp(&b.code)));

        Ok(matched)
    }

    pub fn get_question(&self, subject: &str, code: &str) -> Result<Option<Question>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let questions: Vec<Question> = load(&backend, QUESTIONS_KEY)?;
        Ok(questions
            .into_iter()
            .find(|q| q.subject == subject && q.code == code))
    }

    pub fn create_question(&self, input: CreateQuestionInput) -> Result<Question> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut questions: Vec<Question> = load(&backend, QUESTIONS_KEY)?;

        if questions
            .iter()
            .any(|q| q.subject == input.subject && q.code == input.code)
        {
            anyhow::bail!(
                "Question {} already exists in subject {}",
                input.code,
                input.subject
            );
        }

        let now = Utc::now();
        let question = Question {
            code: input.code,
            subject: input.subject,
            text: input.text,
            difficulty: input.difficulty,
            knowledge_area: input.knowledge_area,
            created_at: now,
            updated_at: now,
        };

        questions.push(question.clone());
        save(&mut backend, QUESTIONS_KEY, &questions)?;

        Ok(question)
    }

    pub fn update_question(
        &self,
        subject: &str,
        code: &str,
        input: UpdateQuestionInput,
    ) -> Result<Option<Question>> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut questions: Vec<Question> = load(&backend, QUESTIONS_KEY)?;

        let Some(position) = questions
            .iter()
            .position(|q| q.subject == subject && q.code == code)
        else {
            return Ok(None);
        };

        let existing = questions[position].clone();
        let updated = Question {
            code: existing.code,
            subject: existing.subject,
            text: input.text.unwrap_or(existing.text),
            difficulty: input.difficulty.unwrap_or(existing.difficulty),
            knowledge_area: input.knowledge_area.or(existing.knowledge_area),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        questions[position] = updated.clone();
        save(&mut backend, QUESTIONS_KEY, &questions)?;

        Ok(Some(updated))
    }

    /// Deletes a question from the bank. Exams that already include it keep
    /// their snapshot copy.
    pub fn delete_question(&self, subject: &str, code: &str) -> Result<bool> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut questions: Vec<Question> = load(&backend, QUESTIONS_KEY)?;

        let before = questions.len();
        questions.retain(|q| !(q.subject == subject && q.code == code));
        if questions.len() == before {
            return Ok(false);
        }

        save(&mut backend, QUESTIONS_KEY, &questions)?;
        Ok(true)
    }

    // ============================================================
    // Exam operations
    // ============================================================

    pub fn get_all_exams(&self) -> Result<Vec<Exam>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let mut exams: Vec<Exam> = load(&backend, EXAMS_KEY)?;
        exams.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(exams)
    }

    pub fn get_exam(&self, code: &str) -> Result<Option<Exam>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let exams: Vec<Exam> = load(&backend, EXAMS_KEY)?;
        Ok(exams.into_iter().find(|e| e.code == code))
    }

    /// The set of exam codes currently in use, fed to the code allocator.
    pub fn exam_codes(&self) -> Result<HashSet<String>> {
        let backend = self.backend.lock().expect("store lock poisoned");
        let exams: Vec<Exam> = load(&backend, EXAMS_KEY)?;
        Ok(exams.into_iter().map(|e| e.code).collect())
    }

    pub fn add_exam(&self, exam: &Exam) -> Result<()> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut exams: Vec<Exam> = load(&backend, EXAMS_KEY)?;

        if exams.iter().any(|e| e.code == exam.code) {
            anyhow::bail!("Exam {} already exists", exam.code);
        }

        exams.push(exam.clone());
        save(&mut backend, EXAMS_KEY, &exams)?;

        Ok(())
    }

    /// Replaces a stored exam with a regenerated one carrying the same code.
    pub fn replace_exam(&self, exam: &Exam) -> Result<bool> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut exams: Vec<Exam> = load(&backend, EXAMS_KEY)?;

        let Some(position) = exams.iter().position(|e| e.code == exam.code) else {
            return Ok(false);
        };

        exams[position] = exam.clone();
        save(&mut backend, EXAMS_KEY, &exams)?;

        Ok(true)
    }

    pub fn delete_exam(&self, code: &str) -> Result<bool> {
        let mut backend = self.backend.lock().expect("store lock poisoned");
        let mut exams: Vec<Exam> = load(&backend, EXAMS_KEY)?;

        let before = exams.len();
        exams.retain(|e| e.code != code);
        if exams.len() == before {
            return Ok(false);
        }

        save(&mut backend, EXAMS_KEY, &exams)?;
        Ok(true)
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

fn load<T: DeserializeOwned>(backend: &Backend, key: &str) -> Result<Vec<T>> {
    let raw = match backend {
        Backend::Dir(dir) => {
            let path = dir.join(format!("{}.json", key));
            if !path.exists() {
                return Ok(Vec::new());
            }
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        }
        Backend::Memory(map) => match map.get(key) {
            Some(raw) => raw.clone(),
            None => return Ok(Vec::new()),
        },
    };

    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(err) => {
            tracing::warn!("Discarding unreadable {} collection: {}", key, err);
            Ok(Vec::new())
        }
    }
}

fn save<T: Serialize>(backend: &mut Backend, key: &str, items: &[T]) -> Result<()> {
    let raw = serde_json::to_string_pretty(items)?;
    match backend {
        Backend::Dir(dir) => {
            let path = dir.join(format!("{}.json", key));
            std::fs::write(&path, raw)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Backend::Memory(map) => {
            map.insert(key.to_string(), raw);
        }
    }
    Ok(())
}
