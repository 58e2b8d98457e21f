use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{value_t, values_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use chaff::config::{SolverConfig, SolverConfigUpdate};
use chaff::counting::CountingSolver;
use chaff::dimacs::DimacsParser;
use chaff::{Solver, Verdict};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("CHAFF_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is chaff {}", env!("CHAFF_VERSION"));
    info!(
        "  {} build - {}",
        env!("CHAFF_PROFILE"),
        env!("CHAFF_RUSTC_VERSION")
    );
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("chaff")
        .version(env!("CHAFF_VERSION"))
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from configuration file'")
        .arg(
            Arg::from_usage("[config-option] -C --config-option")
                .value_name("OPTION>=<VALUE")
                .help("Specify a single config option, see 'chaff -C help' for a list of options.")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::from_usage("[engine] --engine=[ENGINE] 'Select the propagation engine'")
                .possible_values(&["watch", "counting"])
                .default_value("watch")
                .case_insensitive(true),
        )
        .arg_from_usage(
            "--trace 'Print decisions, conflicts and backtracks to stderr while solving'",
        )
        .get_matches();

    let config_options = values_t!(matches, "config-option", String).unwrap_or_default();

    if config_options.iter().any(|option| option == "help") {
        print!("{}", SolverConfig::help());
        return Ok(0);
    }

    init_logging();
    banner();

    let mut config_update = SolverConfigUpdate::new();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut config_contents)?;

        config_update.merge(toml::from_str(&config_contents)?);
    }

    for config_option in config_options {
        config_update.merge(toml::from_str(&config_option)?);
    }

    let trace = matches.is_present("trace");

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    let engine = value_t!(matches, "engine", String)?.to_ascii_lowercase();

    let verdict = match &engine[..] {
        "counting" => {
            let mut solver = CountingSolver::new();
            solver.config(&config_update)?;
            if trace {
                solver.write_trace(io::stderr());
            }

            let formula = DimacsParser::parse(file)?;
            info!(
                "Parsed formula with {} variables and {} clauses",
                formula.var_count(),
                formula.len()
            );
            solver.load(formula.var_count(), &formula)?;

            solver.try_solve()?
        }
        _ => {
            let mut solver = Solver::new();
            solver.config(&config_update)?;
            if trace {
                solver.write_trace(io::stderr());
            }
            solver.add_dimacs_cnf(file)?;

            solver.try_solve()?
        }
    };

    match verdict {
        Verdict::Sat(model) => {
            println!("s SATISFIABLE");
            print!("v");
            for lit in model {
                print!(" {}", lit);
            }
            println!(" 0");
            Ok(10)
        }
        Verdict::Unsat => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
    }
}
