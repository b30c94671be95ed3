use beaver::{
    format_table, run, run_with_observer, search_parallel, seeded_rng, Machine, MachineSpace,
    Program, ProgramLoader, ProgramManager, RunOptions, SearchOptions, State, Tape,
    DEFAULT_STEP_LIMIT,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a machine on an input tape
    Run {
        /// The program file to execute, in the table notation
        #[clap(short, long, conflicts_with = "builtin", required_unless_present = "builtin")]
        program: Option<PathBuf>,

        /// The name of an embedded program
        #[clap(short, long)]
        builtin: Option<String>,

        /// The initial tape content
        #[clap(short, long, default_value = "")]
        input: String,

        /// The maximum number of steps
        #[clap(short, long, default_value_t = DEFAULT_STEP_LIMIT)]
        limit: usize,

        /// Print each step of the execution
        #[clap(short = 'd', long)]
        debug: bool,
    },

    /// Find the busy beaver among all binary machines with the given number of states
    Search {
        #[clap(short, long)]
        states: usize,

        /// Steps a machine may take before it is considered non-halting
        #[clap(short, long, default_value_t = DEFAULT_STEP_LIMIT)]
        limit: usize,

        /// Worker threads
        #[clap(short, long, default_value_t = 1)]
        workers: usize,

        /// Print the result as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print machines of a machine space in enumeration order
    Enumerate {
        #[clap(short, long)]
        states: usize,

        /// The alphabet; its first symbol is the blank
        #[clap(short, long, default_value = "01")]
        alphabet: String,

        /// The index of the first machine
        #[clap(long, default_value_t = 0)]
        start: u128,

        /// How many machines to print
        #[clap(short, long, default_value_t = 10)]
        count: usize,
    },

    /// Print a random machine
    Random {
        #[clap(short, long)]
        states: usize,

        /// The alphabet; its first symbol is the blank
        #[clap(short, long, default_value = "01")]
        alphabet: String,

        /// Seed for reproducible output
        #[clap(long)]
        seed: Option<u64>,
    },

    /// List the embedded programs
    List {
        /// Only list programs whose name contains this text
        query: Option<String>,

        /// Print the source of each listed program
        #[clap(long)]
        source: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Run {
            program,
            builtin,
            input,
            limit,
            debug,
        } => {
            let program = match (program, builtin) {
                (Some(path), _) => ProgramLoader::load_program(&path)?,
                (None, Some(name)) => ProgramManager::get_program_by_name(&name)?,
                (None, None) => return Err("either --program or --builtin is required".into()),
            };
            run_program(&program, &input, limit, debug)
        }
        Command::Search {
            states,
            limit,
            workers,
            json,
        } => {
            let options = SearchOptions {
                step_limit: limit,
                workers,
            };
            let result = search_parallel(states, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!("States:   {states}");
            println!("Examined: {}", result.examined);
            println!("Skipped:  {}", result.skipped);
            println!("Halted:   {}", result.halted);
            println!("Elapsed:  {:?}", result.elapsed);
            match (result.winner, result.winner_index) {
                (Some(machine), Some(index)) => {
                    println!("Score:    {}", result.max_score);
                    println!("Winners:  {}", result.winner_count);
                    println!();
                    print_machine(format!("Machine {index}"), machine)
                }
                _ => {
                    println!("No machine halted within {limit} steps.");
                    Ok(())
                }
            }
        }
        Command::Enumerate {
            states,
            alphabet,
            start,
            count,
        } => {
            let space = machine_space(states, &alphabet)?;
            let end = start.saturating_add(count as u128);

            for (index, machine) in (start..).zip(space.range(start..end)) {
                print_machine(format!("Machine {index}"), machine)?;
                println!();
            }
            Ok(())
        }
        Command::Random {
            states,
            alphabet,
            seed,
        } => {
            let space = machine_space(states, &alphabet)?;
            let seed = seed.unwrap_or_else(rand::random);
            let machine = beaver::random_machine(
                space.n_states(),
                space.alphabet(),
                space.blank(),
                &mut seeded_rng(seed),
            )?;

            print_machine(format!("Random (seed {seed})"), machine)
        }
        Command::List { query, source } => {
            for index in ProgramManager::search_programs(query.as_deref().unwrap_or_default()) {
                let info = ProgramManager::get_program_info(index)?;
                println!(
                    "{:<20} states: {}  alphabet: {}  blank: {}",
                    info.name, info.n_states, info.alphabet, info.blank
                );
                if source {
                    println!("\n{}", ProgramManager::get_program_text_by_index(index)?);
                }
            }
            Ok(())
        }
    }
}

fn run_program(
    program: &Program,
    input: &str,
    limit: usize,
    debug: bool,
) -> Result<(), Box<dyn Error>> {
    let options = RunOptions::with_limit(limit);

    let result = if debug {
        let mut step = 0;
        let mut print_step = |tape: &Tape, head: i64, state: State| {
            step += 1;
            println!("Step: {step}, State: {state}, Head: {head}");
            println!("{}\n", tape.render(head));
        };
        run_with_observer(&program.machine, input, &options, &mut print_step)?
    } else {
        run(&program.machine, input, &options)?
    };

    println!("{}", result.tape);
    println!(
        "halted: {}, steps: {}, score: {}",
        result.halted, result.steps, result.score
    );

    Ok(())
}

fn machine_space(states: usize, alphabet: &str) -> Result<MachineSpace, Box<dyn Error>> {
    let symbols = alphabet.chars().collect::<Vec<_>>();
    let blank = *symbols.first().ok_or("the alphabet must not be empty")?;

    Ok(MachineSpace::new(states, &symbols, blank)?)
}

fn print_machine(name: String, machine: Machine) -> Result<(), Box<dyn Error>> {
    print!("{}", format_table(&Program { name, machine })?);
    Ok(())
}
