//! Exam code allocation.

use std::collections::HashSet;

use super::AssemblyError;

/// Prefix shared by all exam codes.
pub const CODE_PREFIX: &str = "DT";
/// Number of candidate codes, `DT000` through `DT999`.
pub const CODE_SPACE: usize = 1000;

/// Allocate the first unused exam code.
///
/// Candidates are probed in ascending order (`DT000`, `DT001`, ...), so codes
/// freed by deleted exams are reused lowest-first. Deterministic for a given
/// set of existing codes.
pub fn allocate_code(existing: &HashSet<String>) -> Result<String, AssemblyError> {
    for index in 0..CODE_SPACE {
        let candidate = format!("{}{:03}", CODE_PREFIX, index);
        if !existing.contains(&candidate) {
            return Ok(candidate);
        }
    }
    Err(AssemblyError::NamespaceExhausted)
}
