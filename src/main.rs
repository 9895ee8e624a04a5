use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exambank::assembly::{self, AssemblyError, Shortage};
use exambank::export;
use exambank::models::{
    CreateQuestionInput, CreateSubjectInput, Difficulty, QuestionFilter, TierCounts,
    UpdateQuestionInput, UpdateSubjectInput,
};
use exambank::store::Store;

#[derive(Parser)]
#[command(name = "exb")]
#[command(about = "Question bank manager and stratified exam paper generator")]
struct Cli {
    /// Data directory override. Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage subjects
    #[command(subcommand)]
    Subject(SubjectCommands),
    /// Manage the question bank
    #[command(subcommand)]
    Question(QuestionCommands),
    /// Generate and manage exam papers
    #[command(subcommand)]
    Exam(ExamCommands),
}

#[derive(Subcommand)]
enum SubjectCommands {
    /// Add a subject
    Add {
        code: String,
        name: String,
        #[arg(long, default_value = "3")]
        credits: u32,
        /// Knowledge area (repeatable)
        #[arg(long = "area")]
        areas: Vec<String>,
    },
    /// List all subjects
    List,
    /// Update a subject
    Update {
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        credits: Option<u32>,
        /// Replace the knowledge areas (repeatable)
        #[arg(long = "area")]
        areas: Option<Vec<String>>,
    },
    /// Remove a subject. Its questions and exams are left in place.
    Remove { code: String },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// Add a question to the bank
    Add {
        /// Subject code the question belongs to
        subject: String,
        /// Question code, unique within the subject
        code: String,
        /// Question text
        text: String,
        /// Difficulty tier: easy, medium, hard, very_hard
        #[arg(long)]
        difficulty: String,
        /// Knowledge area tag
        #[arg(long)]
        area: Option<String>,
    },
    /// List questions, with optional filters
    List {
        #[arg(long)]
        subject: Option<String>,
        /// Filter by tier: easy, medium, hard, very_hard
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        area: Option<String>,
        /// Case-insensitive substring match over code and text
        #[arg(long)]
        search: Option<String>,
    },
    /// Update a question
    Update {
        subject: String,
        code: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        area: Option<String>,
    },
    /// Remove a question. Exams keep their snapshot copies.
    Remove { subject: String, code: String },
    /// Show per-tier availability for a subject
    Census { subject: String },
}

#[derive(Subcommand)]
enum ExamCommands {
    /// Assemble a new exam from the bank
    Create {
        /// Subject code to draw from
        subject: String,
        #[arg(long, default_value = "0")]
        easy: usize,
        #[arg(long, default_value = "0")]
        medium: usize,
        #[arg(long, default_value = "0")]
        hard: usize,
        #[arg(long = "very-hard", default_value = "0")]
        very_hard: usize,
    },
    /// List all exams
    List,
    /// Print one exam in full
    Show { code: String },
    /// Redraw an exam's questions, keeping its code
    Regenerate {
        code: String,
        /// New tier count; defaults to the count the exam was created with
        #[arg(long)]
        easy: Option<usize>,
        #[arg(long)]
        medium: Option<usize>,
        #[arg(long)]
        hard: Option<usize>,
        #[arg(long = "very-hard")]
        very_hard: Option<usize>,
    },
    /// Remove an exam, freeing its code for reuse
    Remove { code: String },
    /// Write an exam to a text file
    Export {
        code: String,
        /// Output path; defaults to Exam_<subject>_<code>.txt
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Initialize tracing to stderr so stdout stays clean for command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "exambank=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let store = match cli.data_dir {
        Some(dir) => Store::open(dir)?,
        None => Store::open_default()?,
    };

    match cli.command {
        Commands::Subject(command) => run_subject(&store, command),
        Commands::Question(command) => run_question(&store, command),
        Commands::Exam(command) => run_exam(&store, command),
    }
}

fn run_subject(store: &Store, command: SubjectCommands) -> anyhow::Result<()> {
    match command {
        SubjectCommands::Add {
            code,
            name,
            credits,
            areas,
        } => {
            let subject = store.create_subject(CreateSubjectInput {
                code,
                name,
                credits,
                knowledge_areas: areas,
            })?;
            println!("Created subject {} ({})", subject.code, subject.name);
        }
        SubjectCommands::List => {
            for subject in store.get_all_subjects()? {
                println!(
                    "{}  {} ({} credits)",
                    subject.code, subject.name, subject.credits
                );
            }
        }
        SubjectCommands::Update {
            code,
            name,
            credits,
            areas,
        } => {
            let updated = store.update_subject(
                &code,
                UpdateSubjectInput {
                    name,
                    credits,
                    knowledge_areas: areas,
                },
            )?;
            match updated {
                Some(subject) => println!("Updated subject {}", subject.code),
                None => anyhow::bail!("Subject {} not found", code),
            }
        }
        SubjectCommands::Remove { code } => {
            if store.delete_subject(&code)? {
                println!("Removed subject {}", code);
            } else {
                anyhow::bail!("Subject {} not found", code);
            }
        }
    }
    Ok(())
}

fn run_question(store: &Store, command: QuestionCommands) -> anyhow::Result<()> {
    match command {
        QuestionCommands::Add {
            subject,
            code,
            text,
            difficulty,
            area,
        } => {
            let difficulty = parse_difficulty(&difficulty)?;
            let question = store.create_question(CreateQuestionInput {
                code,
                subject,
                text,
                difficulty,
                knowledge_area: area,
            })?;
            println!(
                "Created question {} in {} ({})",
                question.code,
                question.subject,
                question.difficulty.as_str()
            );
        }
        QuestionCommands::List {
            subject,
            difficulty,
            area,
            search,
        } => {
            let difficulty = difficulty.as_deref().map(parse_difficulty).transpose()?;
            let filter = QuestionFilter {
                subject,
                difficulty,
                knowledge_area: area,
                search,
            };
            for question in store.find_questions(&filter)? {
                println!(
                    "{}/{}  [{}]  {}",
                    question.subject,
                    question.code,
                    question.difficulty.as_str(),
                    question.text
                );
            }
        }
        QuestionCommands::Update {
            subject,
            code,
            text,
            difficulty,
            area,
        } => {
            let difficulty = difficulty.as_deref().map(parse_difficulty).transpose()?;
            let updated = store.update_question(
                &subject,
                &code,
                UpdateQuestionInput {
                    text,
                    difficulty,
                    knowledge_area: area,
                },
            )?;
            match updated {
                Some(question) => println!("Updated question {}/{}", question.subject, question.code),
                None => anyhow::bail!("Question {}/{} not found", subject, code),
            }
        }
        QuestionCommands::Remove { subject, code } => {
            if store.delete_question(&subject, &code)? {
                println!("Removed question {}/{}", subject, code);
            } else {
                anyhow::bail!("Question {}/{} not found", subject, code);
            }
        }
        QuestionCommands::Census { subject } => {
            let pool = store.get_all_questions()?;
            let counts = assembly::available_by_tier(&pool, &subject);
            for tier in Difficulty::ALL {
                println!("{:<10} {}", tier.as_str(), counts.get(tier));
            }
            println!("{:<10} {}", "total", counts.total());
        }
    }
    Ok(())
}

fn run_exam(store: &Store, command: ExamCommands) -> anyhow::Result<()> {
    match command {
        ExamCommands::Create {
            subject,
            easy,
            medium,
            hard,
            very_hard,
        } => {
            let counts = TierCounts {
                easy,
                medium,
                hard,
                very_hard,
            };
            let pool = store.get_all_questions()?;
            let existing = store.exam_codes()?;

            match assembly::assemble_exam(&mut rand::rng(), &pool, &existing, &subject, counts) {
                Ok(exam) => {
                    store.add_exam(&exam)?;
                    tracing::info!("Assembled exam {} for {}", exam.code, exam.subject);
                    println!(
                        "Created exam {} with {} questions",
                        exam.code,
                        exam.questions.len()
                    );
                }
                Err(AssemblyError::InsufficientQuestions { shortages }) => {
                    eprintln!("Cannot assemble an exam for {}:", subject);
                    print_shortages(&shortages);
                    anyhow::bail!("No exam was created");
                }
                Err(err) => return Err(err.into()),
            }
        }
        ExamCommands::List => {
            for exam in store.get_all_exams()? {
                println!(
                    "{}  {}  {} questions  created {}",
                    exam.code,
                    exam.subject,
                    exam.questions.len(),
                    exam.created_at.format("%Y-%m-%d")
                );
            }
        }
        ExamCommands::Show { code } => {
            let Some(exam) = store.get_exam(&code)? else {
                anyhow::bail!("Exam {} not found", code);
            };
            println!("{}", export::render_exam(&exam));
        }
        ExamCommands::Regenerate {
            code,
            easy,
            medium,
            hard,
            very_hard,
        } => {
            let Some(exam) = store.get_exam(&code)? else {
                anyhow::bail!("Exam {} not found", code);
            };
            let counts = TierCounts {
                easy: easy.unwrap_or(exam.tier_counts.easy),
                medium: medium.unwrap_or(exam.tier_counts.medium),
                hard: hard.unwrap_or(exam.tier_counts.hard),
                very_hard: very_hard.unwrap_or(exam.tier_counts.very_hard),
            };
            let pool = store.get_all_questions()?;

            match assembly::regenerate_exam(&mut rand::rng(), &pool, &exam, counts) {
                Ok(regenerated) => {
                    store.replace_exam(&regenerated)?;
                    tracing::info!("Regenerated exam {}", regenerated.code);
                    println!(
                        "Regenerated exam {} with {} questions",
                        regenerated.code,
                        regenerated.questions.len()
                    );
                }
                Err(AssemblyError::InsufficientQuestions { shortages }) => {
                    eprintln!("Cannot regenerate exam {}:", code);
                    print_shortages(&shortages);
                    anyhow::bail!("The exam was left unchanged");
                }
                Err(err) => return Err(err.into()),
            }
        }
        ExamCommands::Remove { code } => {
            if store.delete_exam(&code)? {
                println!("Removed exam {}", code);
            } else {
                anyhow::bail!("Exam {} not found", code);
            }
        }
        ExamCommands::Export { code, out } => {
            let Some(exam) = store.get_exam(&code)? else {
                anyhow::bail!("Exam {} not found", code);
            };
            let path = out.unwrap_or_else(|| PathBuf::from(export::export_file_name(&exam)));
            std::fs::write(&path, export::render_exam(&exam))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn parse_difficulty(s: &str) -> anyhow::Result<Difficulty> {
    Difficulty::from_str(s).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid difficulty '{}'. Must be: easy, medium, hard, or very_hard",
            s
        )
    })
}

fn print_shortages(shortages: &[Shortage]) {
    for shortage in shortages {
        eprintln!(
            "  {}: requested {}, available {} (short {})",
            shortage.tier.as_str(),
            shortage.requested,
            shortage.available,
            shortage.deficit()
        );
    }
}
