//! Transition tables.
//!
//! A [`Machine`] stores one cell per (state, symbol) pair in a flat row-major vector, so a
//! lookup is a single index computation. Machines are immutable once built; the execution
//! engine only ever borrows them.

use crate::types::{Direction, MachineError, State, Transition};
use serde::Serialize;
use std::collections::HashSet;

/// A transition table together with its alphabet, blank symbol and number of states.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Machine {
    n_states: usize,
    alphabet: Vec<char>,
    blank: char,
    cells: Vec<Option<Transition>>,
}

impl Machine {
    /// Builds a total machine from its cells, given in row-major (state, symbol) order.
    pub fn new(
        n_states: usize,
        alphabet: Vec<char>,
        blank: char,
        cells: Vec<Transition>,
    ) -> Result<Self, MachineError> {
        let machine = Self {
            n_states,
            alphabet,
            blank,
            cells: cells.into_iter().map(Some).collect(),
        };
        machine.check_shape()?;

        Ok(machine)
    }

    /// Starts building a machine rule by rule.
    pub fn builder(n_states: usize, alphabet: &[char], blank: char) -> MachineBuilder {
        MachineBuilder::new(n_states, alphabet, blank)
    }

    /// Creates a machine from cells known to be well-formed.
    pub(crate) fn from_cells(
        n_states: usize,
        alphabet: Vec<char>,
        blank: char,
        cells: Vec<Option<Transition>>,
    ) -> Self {
        debug_assert_eq!(cells.len(), n_states * alphabet.len());
        Self {
            n_states,
            alphabet,
            blank,
            cells,
        }
    }

    /// The number of non-halting states.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the position of `symbol` in the alphabet.
    pub fn symbol_index(&self, symbol: char) -> Option<usize> {
        self.alphabet.iter().position(|&s| s == symbol)
    }

    /// Looks up the transition for `state` reading `symbol`.
    ///
    /// Returns `None` for unknown states or symbols and for holes in a partial table.
    pub fn transition(&self, state: usize, symbol: char) -> Option<&Transition> {
        if state >= self.n_states {
            return None;
        }
        let index = self.symbol_index(symbol)?;
        self.cells[state * self.alphabet.len() + index].as_ref()
    }

    /// Iterates over every cell as `(state, symbol, transition)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, char, Option<&Transition>)> + '_ {
        let width = self.alphabet.len();
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / width, self.alphabet[i % width], cell.as_ref()))
    }

    /// Returns `true` if every (state, symbol) pair has a transition.
    pub fn is_total(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// The quick halt test: does any cell target the halt state?
    ///
    /// A machine without such a cell can never halt. The converse does not hold; the halting
    /// cell may be unreachable.
    pub fn has_halt_transition(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .any(|transition| transition.next.is_halt())
    }

    /// Validates alphabet, cell count, written symbols and target states.
    fn check_shape(&self) -> Result<(), MachineError> {
        if self.n_states == 0 {
            return Err(malformed("a machine needs at least one state"));
        }
        if self.alphabet.is_empty() {
            return Err(malformed("the alphabet is empty"));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.alphabet.iter().find(|&&s| !seen.insert(s)) {
            return Err(malformed(format!("symbol {dup:?} appears twice in the alphabet")));
        }
        if !seen.contains(&self.blank) {
            return Err(malformed(format!(
                "blank symbol {:?} is not in the alphabet",
                self.blank
            )));
        }

        let expected = self.n_states * self.alphabet.len();
        if self.cells.len() != expected {
            return Err(malformed(format!(
                "expected {expected} cells, found {}",
                self.cells.len()
            )));
        }

        for (state, symbol, transition) in self.cells() {
            let Some(transition) = transition else {
                continue;
            };
            if !seen.contains(&transition.write) {
                return Err(malformed(format!(
                    "cell ({state}, {symbol:?}) writes {:?}, which is not in the alphabet",
                    transition.write
                )));
            }
            if let State::Active(next) = transition.next {
                if next >= self.n_states {
                    return Err(malformed(format!(
                        "cell ({state}, {symbol:?}) targets undefined state {next}"
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_total(&self) -> Result<(), MachineError> {
        let missing = self
            .cells()
            .filter(|(_, _, transition)| transition.is_none())
            .map(|(state, symbol, _)| format!("({state}, {symbol:?})"))
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(malformed(format!("no transition for {}", missing.join(", "))));
        }

        Ok(())
    }
}

fn malformed(msg: impl Into<String>) -> MachineError {
    MachineError::MalformedMachine(msg.into())
}

/// Collects rules for a machine and validates them on [`build`](MachineBuilder::build).
#[derive(Debug, Clone)]
pub struct MachineBuilder {
    n_states: usize,
    alphabet: Vec<char>,
    blank: char,
    cells: Vec<Option<Transition>>,
    error: Option<MachineError>,
}

impl MachineBuilder {
    pub fn new(n_states: usize, alphabet: &[char], blank: char) -> Self {
        Self {
            n_states,
            alphabet: alphabet.to_vec(),
            blank,
            cells: vec![None; n_states * alphabet.len()],
            error: None,
        }
    }

    /// Adds the rule `(state, read) -> (write, next, direction)`.
    ///
    /// Unknown states or symbols and duplicate rules are reported by `build`.
    pub fn rule(
        mut self,
        state: usize,
        read: char,
        write: char,
        next: State,
        direction: Direction,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        let Some(index) = self.alphabet.iter().position(|&s| s == read) else {
            self.error = Some(malformed(format!(
                "rule for state {state} reads {read:?}, which is not in the alphabet"
            )));
            return self;
        };
        if state >= self.n_states {
            self.error = Some(malformed(format!("rule for undefined state {state}")));
            return self;
        }

        let cell = &mut self.cells[state * self.alphabet.len() + index];
        if cell.is_some() {
            self.error = Some(malformed(format!("duplicate rule for ({state}, {read:?})")));
            return self;
        }
        *cell = Some(Transition::new(write, next, direction));

        self
    }

    /// Builds a total machine, rejecting tables with missing cells.
    pub fn build(self) -> Result<Machine, MachineError> {
        let machine = self.build_partial()?;
        machine.check_total()?;

        Ok(machine)
    }

    /// Builds a machine that may have missing cells.
    ///
    /// Running such a machine fails with `UndefinedTransition` when a missing cell is needed.
    pub fn build_partial(self) -> Result<Machine, MachineError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let machine = Machine {
            n_states: self.n_states,
            alphabet: self.alphabet,
            blank: self.blank,
            cells: self.cells,
        };
        machine.check_shape()?;

        Ok(machine)
    }
}
