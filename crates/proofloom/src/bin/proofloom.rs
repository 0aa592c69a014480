//! Command line front end: run a strategy schedule on a JSON problem

use clap::Parser;
use proofloom::{parse_schedule, Options, Portfolio, Problem};
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::process::exit;

const DEFAULT_SCHEDULE: &str = "lrs+21_1_300,dis+20_3:1_flr=on_300,ott+0_1_si=on_300";

#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// Problem file in JSON format
    path: PathBuf,

    /// Comma-separated strategy codes
    #[clap(short, long, default_value = DEFAULT_SCHEDULE)]
    schedule: String,

    /// Extra option as name=value, may be repeated
    #[clap(short, long = "option", value_name = "NAME=VALUE")]
    options: Vec<String>,

    /// Global time limit in deciseconds
    #[clap(short, long)]
    time_limit: Option<u32>,

    /// Treat the schedule as a fallback schedule
    #[clap(long)]
    fallback: bool,

    /// Print per-strategy statistics as JSON
    #[clap(long)]
    stats: bool,
}

impl Args {
    fn problem_name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }

    fn base_options(&self) -> proofloom::Result<Options> {
        let mut options = Options::default();
        for assignment in &self.options {
            let (name, value) = assignment.split_once('=').ok_or_else(|| proofloom::ProverError::InvalidOptionValue {
                option: assignment.clone(),
                value: String::new(),
            })?;
            options.set(name.trim(), value.trim())?;
        }
        if let Some(limit) = self.time_limit {
            options.time_limit = limit;
        }
        Ok(options)
    }
}

fn run(args: &Args) -> proofloom::Result<i32> {
    let options = args.base_options()?;
    let problem = Problem::from_file(&args.path)?;
    let portfolio = Portfolio::new(options, parse_schedule(&args.schedule)).fallback(args.fallback);
    let result = portfolio.run(problem)?;

    let stdout = stdout();
    let mut out = stdout.lock();
    result.write_status(&mut out, args.problem_name())?;
    if let Some(winner) = &result.winner {
        writeln!(out, "% Winning strategy: {}", winner)?;
    }
    if args.stats {
        writeln!(out, "{}", serde_json::to_string_pretty(&result.statistics)?)?;
    }
    Ok(result.exit_code)
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}
