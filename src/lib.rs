//! This crate provides a deterministic single-tape Turing machine interpreter, a lazy
//! enumerator over every transition table of a given size, and a busy beaver search built
//! on top of both. Machines can also be written in a compact table notation, loaded from
//! disk, taken from a small library of embedded programs, or drawn at random.

pub mod enumerate;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod random;
pub mod search;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the lazy machine enumerator.
pub use enumerate::{MachineSpace, Machines};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the execution engine.
pub use machine::{run, run_with_observer, Execution, NoopObserver, Observer};
/// Re-exports the notation parser and formatter.
pub use parser::{format_table, parse};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports random machine generation.
pub use random::{find_by_random_search, random_machine, seeded_rng, RandomSearch};
/// Re-exports the busy beaver search.
pub use search::{search, search_parallel, search_range, SearchOptions, SearchResult};
/// Re-exports the transition table and its builder.
pub use table::{Machine, MachineBuilder};
pub use tape::Tape;
/// Re-exports the core types shared by every module.
pub use types::{
    Direction, ExecutionResult, MachineError, Program, RunOptions, State, Step, Transition,
    BINARY_ALPHABET, BINARY_BLANK, BINARY_MARK, DEFAULT_BLANK, DEFAULT_STEP_LIMIT,
    HALT_SYMBOL, MAX_PROGRAM_SIZE,
};
