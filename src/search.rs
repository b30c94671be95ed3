//! Busy beaver search.
//!
//! Every binary machine of a given size is run on a blank tape, and the halting machine that
//! leaves the most `1`s wins. Whether a machine halts is undecidable in general, so a machine
//! that has not halted within the step limit simply does not compete. The result is only the
//! true busy beaver when the limit is at least the maximum running time of halting machines
//! of that size.

use crate::enumerate::MachineSpace;
use crate::machine::run;
use crate::table::Machine;
use crate::types::{MachineError, RunOptions, BINARY_MARK, DEFAULT_STEP_LIMIT};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Options for [`search_parallel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Steps each machine may take before it is considered non-halting.
    pub step_limit: usize,
    /// The number of worker threads the index space is split across.
    pub workers: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            workers: 1,
        }
    }
}

/// The outcome of a search over all or part of a machine space.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResult {
    /// The highest score among halting machines.
    pub max_score: usize,
    /// The first machine, in enumeration order, that reached `max_score`.
    ///
    /// The first halting machine wins even with a score of 0, so this is `None` only when no
    /// machine halted. A strict "more than zero" rule would leave it empty in that case.
    pub winner: Option<Machine>,
    /// The enumeration index of `winner`.
    pub winner_index: Option<u128>,
    /// How many halting machines reached `max_score`.
    pub winner_count: u64,
    /// Machines taken from the enumerator.
    pub examined: u128,
    /// Machines skipped by the quick halt test.
    pub skipped: u128,
    /// Machines that halted within the step limit.
    pub halted: u128,
    /// Wall-clock time spent searching.
    pub elapsed: Duration,
}

impl SearchResult {
    /// Records a halting machine with its score.
    fn record(&mut self, index: u128, machine: Machine, score: usize) {
        match self.winner_index {
            Some(_) if score < self.max_score => {}
            Some(_) if score == self.max_score => self.winner_count += 1,
            _ => {
                self.max_score = score;
                self.winner = Some(machine);
                self.winner_index = Some(index);
                self.winner_count = 1;
            }
        }
    }

    /// Combines the results of two disjoint parts of a space.
    ///
    /// The higher score wins. On equal scores the counts are summed and the winner with the
    /// lower enumeration index is kept, so merging shards in any order gives the same result
    /// as a sequential search.
    pub fn merge(mut self, other: SearchResult) -> SearchResult {
        self.examined += other.examined;
        self.skipped += other.skipped;
        self.halted += other.halted;
        self.elapsed = self.elapsed.max(other.elapsed);

        let Some(theirs) = other.winner_index else {
            return self;
        };
        let Some(ours) = self.winner_index else {
            self.take_winner(other);
            return self;
        };

        if other.max_score == self.max_score {
            let count = self.winner_count + other.winner_count;
            if theirs < ours {
                self.take_winner(other);
            }
            self.winner_count = count;
        } else if other.max_score > self.max_score {
            self.take_winner(other);
        }

        self
    }

    fn take_winner(&mut self, other: SearchResult) {
        self.max_score = other.max_score;
        self.winner = other.winner;
        self.winner_index = other.winner_index;
        self.winner_count = other.winner_count;
    }
}

/// Searches every binary machine with `n_states` states.
pub fn search(n_states: usize, step_limit: usize) -> Result<SearchResult, MachineError> {
    let space = MachineSpace::binary(n_states)?;
    info!(n_states, step_limit, size = ?space.size(), "busy beaver search started");

    let result = scan((0u128..).zip(space.iter()), step_limit)?;
    log_finished(&result);

    Ok(result)
}

/// Searches the machines of `space` whose enumeration indices fall in `range`.
///
/// Scores count `1` symbols, whatever the alphabet of the space.
pub fn search_range(
    space: &MachineSpace,
    range: Range<u128>,
    step_limit: usize,
) -> Result<SearchResult, MachineError> {
    let first = range.start;
    scan((first..).zip(space.range(range)), step_limit)
}

/// Searches every binary machine with `n_states` states, splitting the index space into
/// contiguous shards searched on separate threads.
pub fn search_parallel(
    n_states: usize,
    options: &SearchOptions,
) -> Result<SearchResult, MachineError> {
    let space = MachineSpace::binary(n_states)?;
    let size = space.size().ok_or_else(|| {
        MachineError::MalformedMachine(format!("the {n_states}-state space is too large to shard"))
    })?;
    let workers = options.workers.max(1) as u128;
    let chunk = size.div_ceil(workers);

    info!(
        n_states,
        step_limit = options.step_limit,
        size = %size,
        workers = options.workers,
        "parallel busy beaver search started"
    );

    let start = Instant::now();
    let shards = std::thread::scope(|scope| {
        let handles = (0..workers)
            .map(|worker| {
                let range = (worker * chunk).min(size)..((worker + 1) * chunk).min(size);
                let space = &space;
                scope.spawn(move || search_range(space, range, options.step_limit))
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect::<Vec<_>>()
    });

    let mut result = SearchResult::default();
    for shard in shards {
        result = result.merge(shard?);
    }
    result.elapsed = start.elapsed();
    log_finished(&result);

    Ok(result)
}

fn scan<I>(machines: I, step_limit: usize) -> Result<SearchResult, MachineError>
where
    I: Iterator<Item = (u128, Machine)>,
{
    let options = RunOptions {
        initial_state: 0,
        step_limit,
        mark: BINARY_MARK,
    };
    let start = Instant::now();
    let mut result = SearchResult::default();

    for (index, machine) in machines {
        result.examined += 1;
        if is_power_of_ten(result.examined) {
            debug!(examined = %result.examined, max_score = result.max_score, "search progress");
        }

        if !machine.has_halt_transition() {
            result.skipped += 1;
            continue;
        }

        let outcome = run(&machine, "", &options)?;
        if outcome.halted {
            result.halted += 1;
            result.record(index, machine, outcome.score);
        }
    }

    result.elapsed = start.elapsed();

    Ok(result)
}

fn log_finished(result: &SearchResult) {
    info!(
        max_score = result.max_score,
        winner_count = result.winner_count,
        examined = %result.examined,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "busy beaver search finished"
    );
}

fn is_power_of_ten(mut n: u128) -> bool {
    while n >= 10 && n % 10 == 0 {
        n /= 10;
    }
    n == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, State, Transition};

    #[test]
    fn test_one_state_busy_beaver() {
        let result = search(1, 2).unwrap();

        assert_eq!(result.max_score, 1);
        assert_eq!(result.winner_count, 16);
        assert_eq!(result.winner_index, Some(32));
        assert_eq!(result.examined, 64);
        assert_eq!(result.skipped, 16);
        assert_eq!(result.halted, 32);

        let winner = result.winner.unwrap();
        assert_eq!(
            winner.transition(0, '0'),
            Some(&Transition::new('1', State::Halt, Direction::Right))
        );
    }

    #[test]
    fn test_two_state_busy_beaver() {
        let result = search(2, 6).unwrap();

        assert_eq!(result.max_score, 4);
        assert_eq!(result.examined, 20_736);

        let winner = result.winner.unwrap();
        let rerun = run(&winner, "", &RunOptions::with_limit(6)).unwrap();
        assert!(rerun.halted);
        assert_eq!(rerun.score, 4);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = search(2, 6).unwrap();
        let options = SearchOptions {
            step_limit: 6,
            workers: 3,
        };
        let parallel = search_parallel(2, &options).unwrap();

        assert_eq!(parallel.max_score, sequential.max_score);
        assert_eq!(parallel.winner_index, sequential.winner_index);
        assert_eq!(parallel.winner, sequential.winner);
        assert_eq!(parallel.winner_count, sequential.winner_count);
        assert_eq!(parallel.examined, sequential.examined);
        assert_eq!(parallel.skipped, sequential.skipped);
        assert_eq!(parallel.halted, sequential.halted);
    }

    #[test]
    fn test_more_workers_than_machines() {
        let options = SearchOptions {
            step_limit: 2,
            workers: 100,
        };
        let result = search_parallel(1, &options).unwrap();

        assert_eq!(result.examined, 64);
        assert_eq!(result.max_score, 1);
        assert_eq!(result.winner_count, 16);
    }

    #[test]
    fn test_search_range_covers_shard_only() {
        let space = MachineSpace::binary(1).unwrap();
        let low = search_range(&space, 0..32, 2).unwrap();
        let high = search_range(&space, 32..64, 2).unwrap();

        assert_eq!(low.max_score, 0);
        assert_eq!(low.winner_count, 16);
        assert_eq!(high.max_score, 1);
        assert_eq!(high.winner_index, Some(32));

        let merged = high.merge(low);
        assert_eq!(merged.max_score, 1);
        assert_eq!(merged.winner_count, 16);
        assert_eq!(merged.examined, 64);
    }

    #[test]
    fn test_zero_score_machine_can_win() {
        let space = MachineSpace::binary(1).unwrap();
        // Indices 0..16 halt at once writing '0'.
        let result = search_range(&space, 0..16, 2).unwrap();

        assert_eq!(result.max_score, 0);
        assert_eq!(result.winner_index, Some(0));
        assert_eq!(result.winner, space.machine_at(0));
        assert_eq!(result.winner_count, 16);
    }

    #[test]
    fn test_merge_ties_keep_lowest_index() {
        let space = MachineSpace::binary(1).unwrap();
        let a = search_range(&space, 40..48, 2).unwrap();
        let b = search_range(&space, 32..40, 2).unwrap();

        assert_eq!(a.max_score, b.max_score);
        let merged = a.merge(b);
        assert_eq!(merged.winner_index, Some(32));
        assert_eq!(merged.winner_count, 16);
    }

    #[test]
    fn test_merge_with_empty() {
        let space = MachineSpace::binary(1).unwrap();
        let shard = search_range(&space, 32..40, 2).unwrap();

        let merged = SearchResult::default().merge(shard.clone());
        assert_eq!(merged.winner_index, shard.winner_index);
        assert_eq!(merged.winner_count, shard.winner_count);

        let merged = shard.clone().merge(SearchResult::default());
        assert_eq!(merged.winner_index, shard.winner_index);
    }

    #[test]
    fn test_no_halting_machine_means_no_winner() {
        let space = MachineSpace::binary(1).unwrap();
        // Indices 48..64 write '1' into state 0 on blank, never halting on a blank tape.
        let result = search_range(&space, 48..64, 10).unwrap();

        assert!(result.winner.is_none());
        assert_eq!(result.winner_count, 0);
        assert_eq!(result.halted, 0);
    }

    #[test]
    fn test_invalid_size() {
        assert!(search(0, 10).is_err());
    }

    #[test]
    fn test_is_power_of_ten() {
        assert!(is_power_of_ten(1));
        assert!(is_power_of_ten(10));
        assert!(is_power_of_ten(1000));
        assert!(!is_power_of_ten(0));
        assert!(!is_power_of_ten(20));
        assert!(!is_power_of_ten(101));
    }
}
