//! This module provides the parser for the compact table notation, utilizing the `pest` crate.
//! Each rule is one line of five characters, `<state><read><next><write><move>`, optionally
//! preceded by `name:`, `alphabet:` and `blank:` headers. See `grammar.pest`.

use crate::{
    table::Machine,
    types::{Direction, MachineError, Program, State, DEFAULT_BLANK, HALT_SYMBOL},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the table notation defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TableParser;

/// Parses the given input string into a `Program`.
///
/// The number of states is one more than the highest state mentioned. Without an `alphabet:`
/// header the alphabet is every symbol read or written, in order of first appearance,
/// followed by the blank symbol if no rule mentions it.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and the table is total.
/// * `Err(MachineError::ParseError)` if there are syntax errors or duplicate rules.
/// * `Err(MachineError::MalformedMachine)` if the table is missing cells or has no rules.
pub fn parse(input: &str) -> Result<Program, MachineError> {
    let root = TableParser::parse(Rule::program, input.trim())
        .map_err(|e| MachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| MachineError::MalformedMachine("empty program".to_string()))?;

    parse_program(root)
}

/// Renders a program in the table notation.
///
/// The output always carries `alphabet:` and `blank:` headers, so parsing it yields an equal
/// program. Machines with more than ten states or with whitespace symbols, and names holding
/// `#` or line breaks, cannot be written in the notation.
pub fn format_table(program: &Program) -> Result<String, MachineError> {
    let machine = &program.machine;
    if machine.n_states() > 10 {
        return Err(MachineError::MalformedMachine(format!(
            "the notation supports at most 10 states, found {}",
            machine.n_states()
        )));
    }
    if machine.alphabet().iter().any(|s| s.is_whitespace()) {
        return Err(MachineError::MalformedMachine(
            "whitespace symbols cannot be written in the notation".to_string(),
        ));
    }
    if program.name.contains(&['#', '\n', '\r'][..]) {
        return Err(MachineError::MalformedMachine(format!(
            "program name {:?} cannot be written in the notation",
            program.name
        )));
    }

    let mut out = String::new();
    if !program.name.is_empty() {
        out.push_str(&format!("name: {}\n", program.name));
    }
    out.push_str(&format!(
        "alphabet: {}\n",
        machine.alphabet().iter().collect::<String>()
    ));
    out.push_str(&format!("blank: {}\n", machine.blank()));

    let mut previous = None;
    for (state, symbol, transition) in machine.cells() {
        let Some(t) = transition else {
            continue;
        };
        if previous != Some(state) {
            out.push('\n');
            previous = Some(state);
        }
        out.push_str(&format!(
            "{state}{symbol}{}{}{}\n",
            t.next,
            t.write,
            t.direction.as_char()
        ));
    }

    Ok(out)
}

/// Parses the top-level structure of a program from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Program, MachineError> {
    let mut name: Option<String> = None;
    let mut alphabet: Option<Vec<char>> = None;
    let mut blank: Option<char> = None;
    let mut rules: Vec<ParsedRule> = Vec::new();
    let mut seen = HashSet::new();
    let mut cells = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let kind = p.as_rule();

        check_unique_header(kind, span, &mut seen)?;

        match kind {
            Rule::name => name = Some(parse_inner_string(p, span)?.trim().to_string()),
            Rule::alphabet => alphabet = Some(parse_inner_string(p, span)?.chars().collect()),
            Rule::blank => blank = Some(parse_symbol(&parse_inner_string(p, span)?)),
            Rule::transition => {
                let parsed = parse_transition(p)?;

                // Prevent duplicated transition rule
                if !cells.insert((parsed.state, parsed.read)) {
                    return Err(parse_error(
                        &format!(
                            "Duplicate transition rule for state {} and symbol {:?}",
                            parsed.state, parsed.read
                        ),
                        span,
                    ));
                }

                rules.push(parsed);
            }
            _ => {} // Skip other rules
        }
    }

    if rules.is_empty() {
        return Err(MachineError::MalformedMachine(
            "Missing transition rules".to_string(),
        ));
    }

    let blank = blank.unwrap_or(DEFAULT_BLANK);
    let alphabet = alphabet.unwrap_or_else(|| infer_alphabet(&rules, blank));
    let n_states = rules
        .iter()
        .flat_map(|r| [Some(r.state), r.next.index()])
        .flatten()
        .max()
        .map_or(0, |highest| highest + 1);

    let machine = rules
        .iter()
        .fold(Machine::builder(n_states, &alphabet, blank), |builder, r| {
            builder.rule(r.state, r.read, r.write, r.next, r.direction)
        })
        .build()?;

    Ok(Program {
        name: name.unwrap_or_default(),
        machine,
    })
}

/// Parses a single rule from a `Pair<Rule::transition>`.
fn parse_transition(pair: Pair<Rule>) -> Result<ParsedRule, MachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let state = parse_state_index(next_pair(&mut pairs, span)?)?;
    let read = parse_symbol(next_pair(&mut pairs, span)?.as_str());
    let next = parse_next_state(next_pair(&mut pairs, span)?)?;
    let write = parse_symbol(next_pair(&mut pairs, span)?.as_str());
    let direction = parse_direction(next_pair(&mut pairs, span)?)?;

    Ok(ParsedRule {
        state,
        read,
        write,
        next,
        direction,
    })
}

fn parse_state_index(pair: Pair<Rule>) -> Result<usize, MachineError> {
    let span = pair.as_span();
    pair.as_str()
        .parse::<usize>()
        .map_err(|_| parse_error(&format!("Invalid state: {}", pair.as_str()), span))
}

/// Parses a target state, where `x` denotes the halt state.
fn parse_next_state(pair: Pair<Rule>) -> Result<State, MachineError> {
    if pair.as_str().starts_with(HALT_SYMBOL) {
        return Ok(State::Halt);
    }

    parse_state_index(pair).map(State::Active)
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports '<' or 'L' for Left, '>' or 'R' for Right, and '-' or 'S' for Stay.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, MachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        "-" | "S" => Ok(Direction::Stay),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

/// Collects the alphabet from the rules in order of first appearance.
fn infer_alphabet(rules: &[ParsedRule], blank: char) -> Vec<char> {
    let mut alphabet = Vec::new();
    let symbols = rules
        .iter()
        .flat_map(|r| [r.read, r.write])
        .chain(std::iter::once(blank));

    for symbol in symbols {
        if !alphabet.contains(&symbol) {
            alphabet.push(symbol);
        }
    }

    alphabet
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses a single character symbol.
fn parse_symbol(input: &str) -> char {
    input.chars().next().unwrap_or(DEFAULT_BLANK)
}

/// Takes the next inner pair of a rule, failing if the rule is incomplete.
fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    span: Span,
) -> Result<Pair<'i, Rule>, MachineError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Incomplete transition rule", span))
}

/// Extracts the inner string content from a header `Pair`.
fn parse_inner_string(pair: Pair<Rule>, span: Span) -> Result<String, MachineError> {
    Ok(next_pair(&mut pair.into_inner(), span)?.as_str().to_string())
}

/// Checks if a header has already been declared.
fn check_unique_header(
    kind: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), MachineError> {
    if !matches!(kind, Rule::name | Rule::alphabet | Rule::blank) {
        return Ok(());
    };

    if !seen.insert(kind) {
        return Err(parse_error(
            &format!("Duplicate \"{kind:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// A helper struct to temporarily hold a parsed rule.
struct ParsedRule {
    state: usize,
    read: char,
    write: char,
    next: State,
    direction: Direction,
}
