//! Plain-text rendering of generated exams.

use crate::models::Exam;

/// Render an exam as plain text.
///
/// Example output:
/// ```text
/// Exam code: DT004
/// Subject: MATH101
///
/// Question 1: State the intermediate value theorem.
/// Question 2: Differentiate f(x) = x^2 sin(x).
/// ```
///
/// Questions appear in stored order, one numbered line each, with no
/// trailing newline.
pub fn render_exam(exam: &Exam) -> String {
    let mut output = format!("Exam code: {}\nSubject: {}\n\n", exam.code, exam.subject);
    let body = exam
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("Question {}: {}", i + 1, q.text))
        .collect::<Vec<_>>()
        .join("\n");
    output.push_str(&body);
    output
}

/// Conventional file name for a saved exam.
pub fn export_file_name(exam: &Exam) -> String {
    format!("Exam_{}_{}.txt", exam.subject, exam.code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Question, TierCounts};
    use chrono::Utc;

    fn make_question(code: &str, text: &str) -> Question {
        Question {
            code: code.to_string(),
            subject: "MATH101".to_string(),
            text: text.to_string(),
            difficulty: Difficulty::Easy,
            knowledge_area: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_exam(questions: Vec<Question>) -> Exam {
        Exam {
            code: "DT000".to_string(),
            subject: "MATH101".to_string(),
            tier_counts: TierCounts::tally(&questions),
            questions,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_header_and_numbered_lines() {
        let exam = make_exam(vec![
            make_question("Q1", "First question"),
            make_question("Q2", "Second question"),
        ]);
        let output = render_exam(&exam);
        assert_eq!(
            output,
            "Exam code: DT000\nSubject: MATH101\n\nQuestion 1: First question\nQuestion 2: Second question"
        );
    }

    #[test]
    fn test_empty_exam_renders_header_only() {
        let exam = make_exam(vec![]);
        assert_eq!(render_exam(&exam), "Exam code: DT000\nSubject: MATH101\n\n");
    }

    #[test]
    fn test_file_name() {
        let exam = make_exam(vec![]);
        assert_eq!(export_file_name(&exam), "Exam_MATH101_DT000.txt");
    }
}
