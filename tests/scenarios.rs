//! End-to-end runs of the embedded programs and the busy beaver search.

use beaver::{
    run, search, search_parallel, Execution, Machine, MachineError, ProgramManager, RunOptions,
    SearchOptions, State, Step,
};
use beaver::{Direction::*, State::*};

fn builtin(name: &str) -> Machine {
    ProgramManager::get_program_by_name(name).unwrap().machine
}

#[test]
fn binary_increment_adds_one() {
    let result = run(&builtin("Binary Increment"), "1100", &RunOptions::default()).unwrap();

    assert!(result.halted);
    assert_eq!(result.tape.content(), "1101");
    assert_eq!(result.steps, 6);
}

#[test]
fn palindrome_is_erased() {
    let result = run(&builtin("Palindrome"), "1001", &RunOptions::default()).unwrap();

    assert!(result.halted);
    assert_eq!(result.tape.content(), "");
    assert_eq!(result.steps, 15);
}

#[test]
fn non_palindrome_leaves_symbols() {
    let result = run(&builtin("Palindrome"), "1101", &RunOptions::default()).unwrap();

    assert!(result.halted);
    assert!(!result.tape.content().is_empty());
    assert_eq!(result.tape.content(), "0");
}

#[test]
fn one_state_busy_beaver_scores_one() {
    let result = search(1, 2).unwrap();

    assert_eq!(result.max_score, 1);
    assert!(result.winner.is_some());
}

#[test]
fn missing_cell_fails_when_first_needed() {
    let machine = Machine::builder(2, &['0', '1'], '0')
        .rule(0, '0', '1', Active(1), Right)
        .rule(1, '0', '0', Active(0), Left)
        .rule(1, '1', '1', State::Halt, Right)
        .build_partial()
        .unwrap();

    let error = run(&machine, "", &RunOptions::default()).unwrap_err();
    assert_eq!(
        error,
        MachineError::UndefinedTransition {
            state: 0,
            symbol: '1',
            step: 2
        }
    );

    let mut execution = Execution::new(&machine, "", 0).unwrap();
    assert_eq!(execution.step(), Ok(Step::Continue));
    assert_eq!(execution.step(), Ok(Step::Continue));
    assert!(execution.step().is_err());
    assert_eq!(execution.step_count(), 2);
    assert_eq!(execution.state(), Active(0));
}

#[test]
fn missing_cell_is_fine_when_never_needed() {
    let machine = Machine::builder(1, &['0', '1'], '0')
        .rule(0, '0', '1', State::Halt, Right)
        .build_partial()
        .unwrap();

    let result = run(&machine, "", &RunOptions::default()).unwrap();
    assert!(result.halted);
    assert_eq!(result.score, 1);
}

#[test]
fn binary_addition_sums_operands() {
    let machine = builtin("Binary Addition");
    let options = RunOptions::with_limit(1000);

    let result = run(&machine, "01_10", &options).unwrap();
    assert!(result.halted);
    assert_eq!(result.tape.content(), "11_00");
    assert_eq!(result.steps, 24);

    let result = run(&machine, "001_011", &options).unwrap();
    assert_eq!(result.tape.content(), "100_000");
    assert_eq!(result.steps, 44);
}

#[test]
fn two_state_busy_beaver() {
    let result = search(2, 6).unwrap();

    assert_eq!(result.max_score, 4);
    assert_eq!(result.winner_index, Some(18_978));
    assert_eq!(result.winner_count, 4);
    assert_eq!(result.examined, 20_736);
    assert_eq!(result.skipped, 4_096);
    assert_eq!(result.halted, 9_784);

    let parallel = search_parallel(
        2,
        &SearchOptions {
            step_limit: 6,
            workers: 4,
        },
    )
    .unwrap();
    assert_eq!(parallel.winner, result.winner);
    assert_eq!(parallel.winner_count, result.winner_count);
}

#[test]
fn search_winner_matches_library_champion() {
    let champion = builtin("Busy Beaver 2");
    let winner = search(2, 6).unwrap().winner.unwrap();

    let expected = run(&champion, "", &RunOptions::with_limit(6)).unwrap();
    let actual = run(&winner, "", &RunOptions::with_limit(6)).unwrap();
    assert_eq!(actual.score, expected.score);
}
