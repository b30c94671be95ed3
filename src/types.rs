//! This module defines the core data structures and types used throughout the crate,
//! including states, transitions, execution options and results, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::table::Machine;
use crate::tape::Tape;
use crate::Rule;

/// The default blank symbol used by hand-authored machines.
pub const DEFAULT_BLANK: char = '_';
/// The symbol used in the table notation to denote the halt state.
pub const HALT_SYMBOL: char = 'x';
/// The maximum allowed size for a program text in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The default step ceiling. This is Rado's S(n) bound for all machines up to 4 states.
pub const DEFAULT_STEP_LIMIT: usize = 107;
/// The alphabet used by the busy beaver search.
pub const BINARY_ALPHABET: [char; 2] = ['0', '1'];
/// The blank symbol of the binary alphabet.
pub const BINARY_BLANK: char = '0';
/// The symbol counted when scoring binary machines.
pub const BINARY_MARK: char = '1';

/// A named machine, as written in the table notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Program {
    /// The name of the program. Empty when the text has no `name:` header.
    pub name: String,
    /// The parsed transition table.
    pub machine: Machine,
}

/// A control state of a machine.
///
/// Non-halting states are numbered `0..n_states`. The ordering places `Halt` before every
/// active state, which is also the order used when enumerating next states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum State {
    /// The sentinel halt state. It has no outgoing transitions.
    Halt,
    /// A non-halting state.
    Active(usize),
}

impl State {
    /// Returns `true` if this is the halt state.
    pub fn is_halt(&self) -> bool {
        matches!(self, State::Halt)
    }

    /// Returns the index of an active state, or `None` for the halt state.
    pub fn index(&self) -> Option<usize> {
        match self {
            State::Halt => None,
            State::Active(i) => Some(*i),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Halt => write!(f, "{HALT_SYMBOL}"),
            State::Active(i) => write!(f, "{i}"),
        }
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// The head offset applied by this movement.
    pub fn offset(&self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }

    /// The character used for this direction in the table notation.
    pub fn as_char(&self) -> char {
        match self {
            Direction::Left => '<',
            Direction::Right => '>',
            Direction::Stay => '-',
        }
    }
}

/// A single cell of a transition table: what to write, where to go, and how to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol written under the head.
    pub write: char,
    /// The state the machine transitions to.
    pub next: State,
    /// The head movement applied after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(write: char, next: State, direction: Direction) -> Self {
        Self {
            write,
            next,
            direction,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.write, self.direction.as_char(), self.next)
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a step and is in an active state.
    Continue,
    /// The machine is in the halt state.
    Halt,
}

/// Options for a single run of the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// The state the machine starts in.
    pub initial_state: usize,
    /// The maximum number of steps taken before giving up.
    pub step_limit: usize,
    /// The symbol counted in the final tape to compute the score.
    pub mark: char,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            initial_state: 0,
            step_limit: DEFAULT_STEP_LIMIT,
            mark: BINARY_MARK,
        }
    }
}

impl RunOptions {
    /// Returns default options with the given step limit.
    pub fn with_limit(step_limit: usize) -> Self {
        Self {
            step_limit,
            ..Self::default()
        }
    }
}

/// The outcome of a complete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The tape as left by the machine.
    pub tape: Tape,
    /// `true` if the run stopped because the halt state was reached, `false` if it ran out of steps.
    pub halted: bool,
    /// The number of occurrences of the mark symbol on the final tape.
    pub score: usize,
    /// The number of steps taken.
    pub steps: usize,
    /// The state the machine stopped in.
    pub state: State,
    /// The final head position.
    pub head: i64,
}

/// Represents various errors that can occur while building or running machines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// No transition is defined for the state and the symbol under the head.
    #[error("No rule defined for state {state} and symbol {symbol:?} at step {step}")]
    UndefinedTransition {
        state: usize,
        symbol: char,
        step: usize,
    },
    /// The transition table violates a structural constraint.
    #[error("Malformed machine: {0}")]
    MalformedMachine(String),
    /// The initial tape contains a symbol outside the machine's alphabet.
    #[error("Tape symbol {0:?} is not in the machine's alphabet")]
    InvalidTapeSymbol(char),
    /// The requested initial state does not exist.
    #[error("Invalid state: {0}")]
    InvalidState(usize),
    /// Indicates an error during the parsing of a table definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A named program does not exist in the library.
    #[error("Program '{0}' not found")]
    ProgramNotFound(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left = Direction::Left;
        let right = Direction::Right;

        let left_json = serde_json::to_string(&left).unwrap();
        let right_json = serde_json::to_string(&right).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(right_json, "\"Right\"");

        let left_deserialized: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, left_deserialized);
    }

    #[test]
    fn test_state_ordering_puts_halt_first() {
        let mut states = vec![State::Active(1), State::Halt, State::Active(0)];
        states.sort();

        assert_eq!(states, vec![State::Halt, State::Active(0), State::Active(1)]);
        assert_eq!(State::Halt.index(), None);
        assert_eq!(State::Active(3).index(), Some(3));
    }

    #[test]
    fn test_transition_display() {
        let transition = Transition::new('1', State::Halt, Direction::Right);
        assert_eq!(transition.to_string(), "1>x");

        let transition = Transition::new('_', State::Active(2), Direction::Left);
        assert_eq!(transition.to_string(), "_<2");
    }

    #[test]
    fn test_run_options_deserialize_with_defaults() {
        let options: RunOptions = serde_json::from_str(r#"{"step_limit": 6}"#).unwrap();

        assert_eq!(options.step_limit, 6);
        assert_eq!(options.initial_state, 0);
        assert_eq!(options.mark, BINARY_MARK);
    }

    #[test]
    fn test_error_display() {
        let error = MachineError::UndefinedTransition {
            state: 0,
            symbol: '1',
            step: 3,
        };

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("state 0"));
        assert!(error_msg.contains("'1'"));
        assert!(error_msg.contains("step 3"));
    }
}
