use chrono::Utc;
use exambank::models::*;
use exambank::store::Store;
use speculate2::speculate;

fn add_subject(store: &Store, code: &str, name: &str) -> Subject {
    store
        .create_subject(CreateSubjectInput {
            code: code.to_string(),
            name: name.to_string(),
            credits: 3,
            knowledge_areas: vec![],
        })
        .expect("Failed to create subject")
}

fn add_question(store: &Store, subject: &str, code: &str, difficulty: Difficulty) -> Question {
    store
        .create_question(CreateQuestionInput {
            code: code.to_string(),
            subject: subject.to_string(),
            text: format!("Text for {}", code),
            difficulty,
            knowledge_area: None,
        })
        .expect("Failed to create question")
}

fn make_exam(code: &str, subject: &str, questions: Vec<Question>) -> Exam {
    Exam {
        code: code.to_string(),
        subject: subject.to_string(),
        tier_counts: TierCounts::tally(&questions),
        questions,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

speculate! {
    describe "subjects" {
        before {
            let store = Store::open_memory();
        }

        it "creates a subject with its fields" {
            let subject = store.create_subject(CreateSubjectInput {
                code: "MATH101".to_string(),
                name: "Calculus".to_string(),
                credits: 4,
                knowledge_areas: vec!["analysis".to_string(), "algebra".to_string()],
            }).expect("Failed to create subject");

            assert_eq!(subject.code, "MATH101");
            assert_eq!(subject.name, "Calculus");
            assert_eq!(subject.credits, 4);
            assert_eq!(subject.knowledge_areas.len(), 2);
        }

        it "rejects a duplicate subject code" {
            add_subject(&store, "MATH101", "Calculus");

            let result = store.create_subject(CreateSubjectInput {
                code: "MATH101".to_string(),
                name: "Calculus again".to_string(),
                credits: 3,
                knowledge_areas: vec![],
            });

            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("already exists"));
        }

        it "returns None for a missing subject" {
            let found = store.get_subject("NOPE").expect("Query failed");
            assert!(found.is_none());
        }

        it "lists subjects ordered by code" {
            add_subject(&store, "PHYS201", "Mechanics");
            add_subject(&store, "MATH101", "Calculus");

            let subjects = store.get_all_subjects().expect("Query failed");

            assert_eq!(subjects.len(), 2);
            assert_eq!(subjects[0].code, "MATH101");
            assert_eq!(subjects[1].code, "PHYS201");
        }

        it "updates only the provided fields" {
            add_subject(&store, "MATH101", "Calculus");

            let updated = store.update_subject("MATH101", UpdateSubjectInput {
                name: Some("Real Analysis".to_string()),
                credits: None,
                knowledge_areas: None,
            }).expect("Query failed").expect("Subject not found");

            assert_eq!(updated.name, "Real Analysis");
            assert_eq!(updated.credits, 3);
        }

        it "returns None when updating a missing subject" {
            let result = store.update_subject("NOPE", UpdateSubjectInput {
                name: Some("Renamed".to_string()),
                credits: None,
                knowledge_areas: None,
            }).expect("Query failed");

            assert!(result.is_none());
        }

        it "deletes a subject but keeps its questions" {
            add_subject(&store, "MATH101", "Calculus");
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);

            assert!(store.delete_subject("MATH101").expect("Delete failed"));

            assert!(store.get_subject("MATH101").expect("Query failed").is_none());
            let questions = store.get_all_questions().expect("Query failed");
            assert_eq!(questions.len(), 1);
        }

        it "returns false when deleting a missing subject" {
            assert!(!store.delete_subject("NOPE").expect("Delete failed"));
        }
    }

    describe "questions" {
        before {
            let store = Store::open_memory();
        }

        it "creates a question in the bank" {
            let question = store.create_question(CreateQuestionInput {
                code: "Q1".to_string(),
                subject: "MATH101".to_string(),
                text: "State Newton's second law".to_string(),
                difficulty: Difficulty::Medium,
                knowledge_area: Some("mechanics".to_string()),
            }).expect("Failed to create question");

            assert_eq!(question.code, "Q1");
            assert_eq!(question.difficulty, Difficulty::Medium);
            assert_eq!(question.knowledge_area, Some("mechanics".to_string()));
        }

        it "rejects a duplicate code within one subject" {
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);

            let result = store.create_question(CreateQuestionInput {
                code: "Q1".to_string(),
                subject: "MATH101".to_string(),
                text: "Different text".to_string(),
                difficulty: Difficulty::Hard,
                knowledge_area: None,
            });

            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("already exists"));
        }

        it "allows the same code in different subjects" {
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);
            add_question(&store, "PHYS201", "Q1", Difficulty::Easy);

            let questions = store.get_all_questions().expect("Query failed");
            assert_eq!(questions.len(), 2);
        }

        it "updates only the provided fields" {
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);

            let updated = store.update_question("MATH101", "Q1", UpdateQuestionInput {
                text: None,
                difficulty: Some(Difficulty::VeryHard),
                knowledge_area: None,
            }).expect("Query failed").expect("Question not found");

            assert_eq!(updated.difficulty, Difficulty::VeryHard);
            assert_eq!(updated.text, "Text for Q1");
        }

        it "finds questions by subject and difficulty" {
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);
            add_question(&store, "MATH101", "Q2", Difficulty::Hard);
            add_question(&store, "PHYS201", "Q3", Difficulty::Easy);

            let filter = QuestionFilter {
                subject: Some("MATH101".to_string()),
                difficulty: Some(Difficulty::Easy),
                ..Default::default()
            };
            let found = store.find_questions(&filter).expect("Query failed");

            assert_eq!(found.len(), 1);
            assert_eq!(found[0].code, "Q1");
        }

        it "searches case-insensitively over code and text" {
            store.create_question(CreateQuestionInput {
                code: "NEWTON1".to_string(),
                subject: "PHYS201".to_string(),
                text: "State Newton's second law".to_string(),
                difficulty: Difficulty::Easy,
                knowledge_area: None,
            }).expect("Failed to create question");
            add_question(&store, "PHYS201", "Q2", Difficulty::Easy);

            let by_text = store.find_questions(&QuestionFilter {
                search: Some("newton's".to_string()),
                ..Default::default()
            }).expect("Query failed");
            assert_eq!(by_text.len(), 1);
            assert_eq!(by_text[0].code, "NEWTON1");

            let by_code = store.find_questions(&QuestionFilter {
                search: Some("q2".to_string()),
                ..Default::default()
            }).expect("Query failed");
            assert_eq!(by_code.len(), 1);
            assert_eq!(by_code[0].code, "Q2");
        }

        it "filters by knowledge area" {
            store.create_question(CreateQuestionInput {
                code: "Q1".to_string(),
                subject: "MATH101".to_string(),
                text: "Integrate by parts".to_string(),
                difficulty: Difficulty::Medium,
                knowledge_area: Some("analysis".to_string()),
            }).expect("Failed to create question");
            add_question(&store, "MATH101", "Q2", Difficulty::Medium);

            let found = store.find_questions(&QuestionFilter {
                knowledge_area: Some("analysis".to_string()),
                ..Default::default()
            }).expect("Query failed");

            assert_eq!(found.len(), 1);
            assert_eq!(found[0].code, "Q1");
        }

        it "deletes a question once" {
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);

            assert!(store.delete_question("MATH101", "Q1").expect("Delete failed"));
            assert!(!store.delete_question("MATH101", "Q1").expect("Delete failed"));
        }
    }

    describe "exams" {
        before {
            let store = Store::open_memory();
        }

        it "stores and retrieves an exam" {
            let question = add_question(&store, "MATH101", "Q1", Difficulty::Easy);
            store.add_exam(&make_exam("DT000", "MATH101", vec![question]))
                .expect("Failed to add exam");

            let found = store.get_exam("DT000").expect("Query failed").expect("Exam not found");

            assert_eq!(found.code, "DT000");
            assert_eq!(found.subject, "MATH101");
            assert_eq!(found.questions.len(), 1);
        }

        it "rejects a duplicate exam code" {
            store.add_exam(&make_exam("DT000", "MATH101", vec![]))
                .expect("Failed to add exam");

            let result = store.add_exam(&make_exam("DT000", "PHYS201", vec![]));

            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("already exists"));
        }

        it "returns the set of codes in use" {
            store.add_exam(&make_exam("DT000", "MATH101", vec![]))
                .expect("Failed to add exam");
            store.add_exam(&make_exam("DT001", "MATH101", vec![]))
                .expect("Failed to add exam");

            let codes = store.exam_codes().expect("Query failed");

            assert_eq!(codes.len(), 2);
            assert!(codes.contains("DT000"));
            assert!(codes.contains("DT001"));
        }

        it "replaces a stored exam in place" {
            let q1 = add_question(&store, "MATH101", "Q1", Difficulty::Easy);
            let q2 = add_question(&store, "MATH101", "Q2", Difficulty::Easy);
            store.add_exam(&make_exam("DT000", "MATH101", vec![q1.clone()]))
                .expect("Failed to add exam");

            let replaced = store.replace_exam(&make_exam("DT000", "MATH101", vec![q1, q2]))
                .expect("Replace failed");

            assert!(replaced);
            let found = store.get_exam("DT000").expect("Query failed").expect("Exam not found");
            assert_eq!(found.questions.len(), 2);
        }

        it "returns false when replacing a missing exam" {
            let replaced = store.replace_exam(&make_exam("DT404", "MATH101", vec![]))
                .expect("Replace failed");
            assert!(!replaced);
        }

        it "keeps snapshot copies when the bank question is removed" {
            let question = add_question(&store, "MATH101", "Q1", Difficulty::Easy);
            store.add_exam(&make_exam("DT000", "MATH101", vec![question]))
                .expect("Failed to add exam");

            assert!(store.delete_question("MATH101", "Q1").expect("Delete failed"));

            let exam = store.get_exam("DT000").expect("Query failed").expect("Exam not found");
            assert_eq!(exam.questions.len(), 1);
            assert_eq!(exam.questions[0].code, "Q1");
            assert!(store.get_all_questions().expect("Query failed").is_empty());
        }

        it "deletes an exam and frees its code" {
            store.add_exam(&make_exam("DT000", "MATH101", vec![]))
                .expect("Failed to add exam");

            assert!(store.delete_exam("DT000").expect("Delete failed"));
            assert!(store.exam_codes().expect("Query failed").is_empty());
        }
    }

    describe "file persistence" {
        before {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
        }

        it "persists collections across reopen" {
            let store = Store::open(dir.path().to_path_buf()).expect("Failed to open store");
            add_subject(&store, "MATH101", "Calculus");
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);
            drop(store);

            let reopened = Store::open(dir.path().to_path_buf()).expect("Failed to reopen store");

            let subject = reopened.get_subject("MATH101").expect("Query failed");
            assert!(subject.is_some());
            let question = reopened.get_question("MATH101", "Q1").expect("Query failed");
            assert!(question.is_some());
        }

        it "treats a corrupt collection file as empty" {
            std::fs::write(dir.path().join("questions.json"), "not valid json")
                .expect("Failed to write file");

            let store = Store::open(dir.path().to_path_buf()).expect("Failed to open store");

            assert!(store.get_all_questions().expect("Query failed").is_empty());

            // A fresh write recovers the collection
            add_question(&store, "MATH101", "Q1", Difficulty::Easy);
            assert_eq!(store.get_all_questions().expect("Query failed").len(), 1);
        }

        it "starts empty when no files exist" {
            let store = Store::open(dir.path().to_path_buf()).expect("Failed to open store");

            assert!(store.get_all_subjects().expect("Query failed").is_empty());
            assert!(store.get_all_questions().expect("Query failed").is_empty());
            assert!(store.get_all_exams().expect("Query failed").is_empty());
        }
    }
}
