//! Random machines drawn from the same option set as the enumerator.

use crate::enumerate::MachineSpace;
use crate::table::Machine;
use crate::types::MachineError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Returns a reproducible generator for the given seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// The outcome of [`find_by_random_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomSearch {
    /// The number of machines drawn.
    pub attempts: u64,
    /// The matching machine, if one was drawn before the attempts ran out.
    pub found: Option<Machine>,
}

/// Draws a total machine whose cells are chosen uniformly from the enumerator's cell options.
pub fn random_machine<R: Rng + ?Sized>(
    n_states: usize,
    alphabet: &[char],
    blank: char,
    rng: &mut R,
) -> Result<Machine, MachineError> {
    let space = MachineSpace::new(n_states, alphabet, blank)?;
    Ok(draw(&space, rng))
}

/// Draws machines from the target's space until one equals `target`, giving up after
/// `max_attempts` draws.
pub fn find_by_random_search<R: Rng + ?Sized>(
    target: &Machine,
    max_attempts: u64,
    rng: &mut R,
) -> Result<RandomSearch, MachineError> {
    let space = MachineSpace::new(target.n_states(), target.alphabet(), target.blank())?;

    for attempt in 1..=max_attempts {
        if draw(&space, rng) == *target {
            debug!(attempts = attempt, "random search found target");
            return Ok(RandomSearch {
                attempts: attempt,
                found: Some(target.clone()),
            });
        }
    }

    debug!(attempts = max_attempts, "random search gave up");
    Ok(RandomSearch {
        attempts: max_attempts,
        found: None,
    })
}

fn draw<R: Rng + ?Sized>(space: &MachineSpace, rng: &mut R) -> Machine {
    let options = space.cell_options();
    let cells = (0..space.cell_count())
        .map(|_| Some(options[rng.gen_range(0..options.len())]))
        .collect();

    Machine::from_cells(
        space.n_states(),
        space.alphabet().to_vec(),
        space.blank(),
        cells,
    )
}
