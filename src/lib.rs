//! Exam question bank and stratified paper generator.
//!
//! The bank holds subjects and difficulty-tiered questions. Exams are
//! assembled by drawing a uniformly random sample per tier, without
//! replacement, and freezing the selection under an allocated exam code.
//! See [`assembly`] for the sampling pipeline and [`store`] for persistence.

pub mod assembly;
pub mod export;
pub mod models;
pub mod store;
