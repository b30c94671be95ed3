//! This module provides the `ProgramLoader` struct, responsible for loading machines written
//! in the table notation from files, directories and strings.

use crate::parser::parse;
use crate::types::{MachineError, Program, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of programs in the table notation.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading programs.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed into a `Program`.
    /// * `Err(MachineError::FileError)` if the file cannot be read or exceeds `MAX_PROGRAM_SIZE`.
    /// * `Err(MachineError::ParseError)` if the file content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_program_from_string(&content)
    }

    /// Loads a single program from the provided string content.
    pub fn load_program_from_string(content: &str) -> Result<Program, MachineError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::FileError(format!(
                "Program is {} bytes, the limit is {}",
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        parse(content)
    }

    /// Loads every `.tm` file in `directory`, sorted by path.
    ///
    /// Directories and files with other extensions are skipped. Each element of the result
    /// is either the path and its program, or the error that prevented loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), MachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths = Vec::new();
        let mut results = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(MachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }
        paths.sort();

        results.extend(
            paths
                .into_iter()
                .filter(|path| {
                    !path.is_dir() && path.extension().is_some_and(|ext| ext == PROGRAM_EXTENSION)
                })
                .map(|path| match Self::load_program(&path) {
                    Ok(program) => Ok((path, program)),
                    Err(e) => Err(MachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    ))),
                }),
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const BUSY_BEAVER_2: &str = "name: Busy Beaver 2\nblank: 0\n0011>\n0111<\n1001<\n11x1>\n";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bb2.tm");
        write_file(&file_path, BUSY_BEAVER_2);

        let program = ProgramLoader::load_program(&file_path).unwrap();

        assert_eq!(program.name, "Busy Beaver 2");
        assert_eq!(program.machine.n_states(), 2);
        assert_eq!(program.machine.blank(), '0');
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(MachineError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tm"));

        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_oversized_program_is_rejected() {
        let content = format!("{}\n{}", "#".repeat(MAX_PROGRAM_SIZE), BUSY_BEAVER_2);
        let result = ProgramLoader::load_program_from_string(&content);

        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), BUSY_BEAVER_2);
        write_file(&dir.path().join("invalid.tm"), "This is not a valid program");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");
        fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = ProgramLoader::load_programs(dir.path());

        // Sorted by path: invalid.tm, then valid.tm
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());

        let (path, program) = results[1].as_ref().unwrap();
        assert!(path.ends_with("valid.tm"));
        assert_eq!(program.name, "Busy Beaver 2");
    }

    #[test]
    fn test_load_programs_from_missing_directory() {
        let dir = tempdir().unwrap();
        let results = ProgramLoader::load_programs(&dir.path().join("nowhere"));

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(MachineError::FileError(_))));
    }
}
