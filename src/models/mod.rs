//! Domain models for the exam bank.
//!
//! # Core Concepts
//!
//! ## The Bank
//!
//! - [`Subject`]: An academic subject with credits and declared knowledge areas.
//! - [`Question`]: A bank entry tagged with a subject code and a [`Difficulty`]
//!   tier. The tier determines which stratum of an exam it can be drawn into.
//!
//! ## Generated Papers
//!
//! - [`Exam`]: A frozen paper holding snapshot copies of the questions selected
//!   at assembly time. Edits to the bank never reach back into an exam.
//! - [`TierCounts`]: Per-tier counts, used both as the assembly request and as
//!   the record of what an exam contains.
//!
//! Records reference subjects by code without referential-integrity
//! enforcement: deleting a subject leaves its questions and exams in place.

mod exam;
mod question;
mod subject;

pub use exam::*;
pub use question::*;
pub use subject::*;
