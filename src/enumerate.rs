//! Lazy enumeration of every transition table of a given size.
//!
//! A table with `n` states over an alphabet `Σ` has `n * |Σ|` cells, and every cell can take
//! one of `|Σ| * (n + 1) * 2` transitions (any symbol, any state or halt, left or right). The
//! space is treated as a mixed-radix number whose digits are the cells in row-major order,
//! the first cell being the most significant digit. Machine `i` of the space is the number
//! `i` written in that base, which makes the order lexicographic and every index addressable.

use crate::table::Machine;
use crate::types::{Direction, MachineError, State, Transition, BINARY_ALPHABET, BINARY_BLANK};
use std::collections::HashSet;
use std::ops::Range;

/// Generated machines only move left or right.
const DIRECTIONS: [Direction; 2] = [Direction::Right, Direction::Left];

/// The space of all total tables with `n_states` states over an alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSpace {
    n_states: usize,
    alphabet: Vec<char>,
    blank: char,
    options: Vec<Transition>,
}

impl MachineSpace {
    pub fn new(n_states: usize, alphabet: &[char], blank: char) -> Result<Self, MachineError> {
        if n_states == 0 {
            return Err(MachineError::MalformedMachine(
                "a machine needs at least one state".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if alphabet.is_empty() || !alphabet.iter().all(|&s| seen.insert(s)) {
            return Err(MachineError::MalformedMachine(format!(
                "invalid alphabet {alphabet:?}"
            )));
        }
        if !seen.contains(&blank) {
            return Err(MachineError::MalformedMachine(format!(
                "blank symbol {blank:?} is not in the alphabet"
            )));
        }

        let states = std::iter::once(State::Halt)
            .chain((0..n_states).map(State::Active))
            .collect::<Vec<_>>();

        let mut options = Vec::with_capacity(alphabet.len() * states.len() * DIRECTIONS.len());
        for &write in alphabet {
            for &next in &states {
                for direction in DIRECTIONS {
                    options.push(Transition::new(write, next, direction));
                }
            }
        }

        Ok(Self {
            n_states,
            alphabet: alphabet.to_vec(),
            blank,
            options,
        })
    }

    /// The space of binary machines used by the busy beaver search.
    pub fn binary(n_states: usize) -> Result<Self, MachineError> {
        Self::new(n_states, &BINARY_ALPHABET, BINARY_BLANK)
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Every transition a single cell can hold, in enumeration order.
    pub fn cell_options(&self) -> &[Transition] {
        &self.options
    }

    /// The number of cells in each table.
    pub fn cell_count(&self) -> usize {
        self.n_states * self.alphabet.len()
    }

    /// The number of machines in the space, or `None` if it does not fit in a `u128`.
    pub fn size(&self) -> Option<u128> {
        let exponent = u32::try_from(self.cell_count()).ok()?;
        (self.options.len() as u128).checked_pow(exponent)
    }

    /// Returns the machine at `index` in enumeration order.
    pub fn machine_at(&self, index: u128) -> Option<Machine> {
        let digits = self.digits_of(index)?;
        Some(self.machine_from_digits(&digits))
    }

    /// Returns the enumeration index of `machine`, or `None` if it is not part of this space.
    pub fn index_of(&self, machine: &Machine) -> Option<u128> {
        if machine.n_states() != self.n_states
            || machine.alphabet() != self.alphabet.as_slice()
            || machine.blank() != self.blank
        {
            return None;
        }

        let base = self.options.len() as u128;
        machine.cells().try_fold(0u128, |index, (_, _, transition)| {
            let digit = self.options.iter().position(|o| Some(o) == transition)?;
            index.checked_mul(base)?.checked_add(digit as u128)
        })
    }

    /// Iterates over the whole space.
    pub fn iter(&self) -> Machines<'_> {
        Machines {
            space: self,
            digits: Some(vec![0; self.cell_count()]),
            index: 0,
            end: self.size(),
        }
    }

    /// Iterates over the machines with indices in `range`.
    pub fn range(&self, range: Range<u128>) -> Machines<'_> {
        let end = match self.size() {
            Some(size) => range.end.min(size),
            None => range.end,
        };

        Machines {
            space: self,
            digits: if range.start < end {
                self.digits_of(range.start)
            } else {
                None
            },
            index: range.start,
            end: Some(end),
        }
    }

    /// Decodes `index` into one option index per cell, most significant first.
    fn digits_of(&self, mut index: u128) -> Option<Vec<usize>> {
        if self.size().is_some_and(|size| index >= size) {
            return None;
        }

        let base = self.options.len() as u128;
        let mut digits = vec![0; self.cell_count()];
        for digit in digits.iter_mut().rev() {
            *digit = (index % base) as usize;
            index /= base;
        }

        Some(digits)
    }

    fn machine_from_digits(&self, digits: &[usize]) -> Machine {
        let cells = digits.iter().map(|&d| Some(self.options[d])).collect();
        Machine::from_cells(self.n_states, self.alphabet.clone(), self.blank, cells)
    }
}

impl<'a> IntoIterator for &'a MachineSpace {
    type Item = Machine;
    type IntoIter = Machines<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A lazy iterator over a [`MachineSpace`].
///
/// Only the current cell assignment is kept; each machine is built when it is yielded.
#[derive(Debug, Clone)]
pub struct Machines<'a> {
    space: &'a MachineSpace,
    digits: Option<Vec<usize>>,
    index: u128,
    end: Option<u128>,
}

impl Machines<'_> {
    /// The enumeration index of the next machine to be yielded.
    pub fn index(&self) -> u128 {
        self.index
    }

    fn advance(&mut self) {
        let base = self.space.options.len();
        self.index += 1;

        if self.end.is_some_and(|end| self.index >= end) {
            self.digits = None;
            return;
        }

        let Some(digits) = self.digits.as_mut() else {
            return;
        };
        for digit in digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }

        // Carried out of the most significant cell.
        self.digits = None;
    }
}

impl Iterator for Machines<'_> {
    type Item = Machine;

    fn next(&mut self) -> Option<Machine> {
        let machine = self.space.machine_from_digits(self.digits.as_ref()?);
        self.advance();

        Some(machine)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.digits.is_none() {
            return (0, Some(0));
        }

        match self.end.map(|end| usize::try_from(end - self.index)) {
            Some(Ok(remaining)) => (remaining, Some(remaining)),
            _ => (usize::MAX, None),
        }
    }
}
