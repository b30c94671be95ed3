use crate::types::{MachineError, Program};

use std::sync::RwLock;
use tracing::warn;

// Embedded programs
const PROGRAM_TEXTS: [&str; 8] = [
    include_str!("../programs/replace.tm"),
    include_str!("../programs/palindrome.tm"),
    include_str!("../programs/unary-addition.tm"),
    include_str!("../programs/binary-increment.tm"),
    include_str!("../programs/binary-decrement.tm"),
    include_str!("../programs/binary-addition.tm"),
    include_str!("../programs/busy-beaver-2.tm"),
    include_str!("../programs/busy-beaver-3.tm"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Program>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded programs into `PROGRAMS` unless that was already done.
    pub fn load() -> Result<(), MachineError> {
        let mut programs = PROGRAMS
            .write()
            .map_err(|_| MachineError::FileError("Failed to acquire write lock".to_string()))?;
        if !programs.is_empty() {
            return Ok(());
        }

        for (index, text) in PROGRAM_TEXTS.iter().enumerate() {
            match crate::parser::parse(text) {
                Ok(program) => programs.push(program),
                Err(e) => warn!(index, error = %e, "failed to parse embedded program"),
            }
        }

        Ok(())
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        let _ = Self::load();

        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, MachineError> {
        Self::load()?;

        PROGRAMS
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| MachineError::ProgramNotFound(format!("#{index}")))
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Program, MachineError> {
        Self::load()?;

        PROGRAMS
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| MachineError::ProgramNotFound(name.to_string()))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .map(|program| program.name.clone())
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let program = Self::get_program_by_index(index)?;
        let machine = &program.machine;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            n_states: machine.n_states(),
            alphabet: machine.alphabet().iter().collect(),
            blank: machine.blank(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let _ = Self::load();
        let query = query.to_lowercase();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .enumerate()
                    .filter(|(_, program)| program.name.to_lowercase().contains(&query))
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get the source text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAM_TEXTS
            .get(index)
            .copied()
            .ok_or_else(|| MachineError::ProgramNotFound(format!("#{index}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub n_states: usize,
    pub alphabet: String,
    pub blank: char,
}
