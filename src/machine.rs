//! This module defines the execution engine. An [`Execution`] borrows a [`Machine`], owns its
//! working tape, head and state, and steps the transition table until the machine halts or a
//! step ceiling is reached.

use crate::table::Machine;
use crate::tape::Tape;
use crate::types::{ExecutionResult, MachineError, RunOptions, State, Step};
use tracing::{debug, trace};

/// Receives the machine configuration after every step.
///
/// Observers only see shared references and cannot alter the run.
pub trait Observer {
    fn observe(&mut self, tape: &Tape, head: i64, state: State);
}

impl<F> Observer for F
where
    F: FnMut(&Tape, i64, State),
{
    fn observe(&mut self, tape: &Tape, head: i64, state: State) {
        self(tape, head, state)
    }
}

/// An observer that ignores every step.
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn observe(&mut self, _tape: &Tape, _head: i64, _state: State) {}
}

/// A single run of a machine.
pub struct Execution<'a> {
    machine: &'a Machine,
    input: Tape,
    initial_state: State,
    tape: Tape,
    head: i64,
    state: State,
    step_count: usize,
}

impl<'a> Execution<'a> {
    /// Prepares a run of `machine` on `input`, with the head on the first input symbol.
    ///
    /// # Errors
    ///
    /// * `MachineError::InvalidState` if `initial_state` is not a state of the machine.
    /// * `MachineError::InvalidTapeSymbol` if `input` holds a symbol outside the alphabet.
    pub fn new(
        machine: &'a Machine,
        input: &str,
        initial_state: usize,
    ) -> Result<Self, MachineError> {
        if initial_state >= machine.n_states() {
            return Err(MachineError::InvalidState(initial_state));
        }
        if let Some(symbol) = input.chars().find(|&c| machine.symbol_index(c).is_none()) {
            return Err(MachineError::InvalidTapeSymbol(symbol));
        }

        let input = Tape::from_symbols(input.chars(), machine.blank());
        let initial_state = State::Active(initial_state);

        Ok(Self {
            machine,
            tape: input.clone(),
            input,
            initial_state,
            head: 0,
            state: initial_state,
            step_count: 0,
        })
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if the machine is in an active state after the step.
    /// * `Ok(Step::Halt)` if the step entered the halt state, or the machine had already halted.
    /// * `Err(MachineError::UndefinedTransition)` if the table has no cell for the current
    ///   state and symbol.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        let State::Active(state) = self.state else {
            return Ok(Step::Halt);
        };

        let symbol = self.tape.read(self.head);
        let transition = *self.machine.transition(state, symbol).ok_or_else(|| {
            MachineError::UndefinedTransition {
                state,
                symbol,
                step: self.step_count,
            }
        })?;

        self.tape.write(self.head, transition.write);
        self.head += transition.direction.offset();
        self.state = transition.next;
        self.step_count += 1;

        trace!(
            step = self.step_count,
            state = %self.state,
            head = self.head,
            "step"
        );

        Ok(if self.state.is_halt() {
            Step::Halt
        } else {
            Step::Continue
        })
    }

    /// Steps until the machine halts or `step_limit` steps have been taken in total.
    ///
    /// Returns `true` if the machine halted.
    pub fn run<O: Observer + ?Sized>(
        &mut self,
        step_limit: usize,
        observer: &mut O,
    ) -> Result<bool, MachineError> {
        loop {
            if self.is_halted() {
                return Ok(true);
            }
            if self.step_count >= step_limit {
                return Ok(false);
            }

            self.step()?;
            observer.observe(&self.tape, self.head, self.state);
        }
    }

    /// Consumes the run and produces its result, scoring occurrences of `mark`.
    pub fn into_result(self, mark: char) -> ExecutionResult {
        ExecutionResult {
            score: self.tape.count(mark),
            halted: self.is_halted(),
            steps: self.step_count,
            state: self.state,
            head: self.head,
            tape: self.tape,
        }
    }

    /// Resets the run to its initial configuration.
    pub fn reset(&mut self) {
        self.tape = self.input.clone();
        self.head = 0;
        self.state = self.initial_state;
        self.step_count = 0;
    }

    pub fn machine(&self) -> &Machine {
        self.machine
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn head(&self) -> i64 {
        self.head
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halt()
    }
}

/// Runs `machine` on `input` until it halts or `options.step_limit` steps were taken.
///
/// Running out of steps is not an error; the result reports `halted == false`.
pub fn run(
    machine: &Machine,
    input: &str,
    options: &RunOptions,
) -> Result<ExecutionResult, MachineError> {
    run_with_observer(machine, input, options, &mut NoopObserver)
}

/// Like [`run`], calling `observer` after every step.
pub fn run_with_observer<O: Observer + ?Sized>(
    machine: &Machine,
    input: &str,
    options: &RunOptions,
    observer: &mut O,
) -> Result<ExecutionResult, MachineError> {
    let mut execution = Execution::new(machine, input, options.initial_state)?;
    let halted = execution.run(options.step_limit, observer)?;

    debug!(steps = execution.step_count(), halted, "run finished");

    Ok(execution.into_result(options.mark))
}
