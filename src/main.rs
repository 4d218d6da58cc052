use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::{debug, error, info};

use bonus_tally::finalize::{Finalizer, FlushReport};
use bonus_tally::logging;
use bonus_tally::recording::common::Observation;
use bonus_tally::recording::session::Session;
use bonus_tally::recording::summary::{Summarizer, WritePolicy};
use bonus_tally::repl;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of double or nothing rounds to evaluate; prompted for when
    /// omitted.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub rounds: Option<u32>,

    /// Initial bet scalar applied to every result.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub bet: u32,

    /// How records are combined with an existing summary file.
    #[arg(long, value_enum, default_value_t = WritePolicy::Append)]
    pub policy: WritePolicy,

    /// Directory the summary file is written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout();

    let rounds = match args.rounds {
        Some(rounds) => rounds,
        None => match repl::prompt_rounds(&mut input, &mut output)? {
            Some(rounds) => rounds,
            None => anyhow::bail!("input ended before a round count was supplied"),
        },
    };

    let summarizer = Summarizer::new(&args.out_dir, rounds, args.policy);
    let first_observation = match args.policy {
        WritePolicy::Append => Observation(summarizer.existing_observations()?).next(),
        WritePolicy::Overwrite => Observation(1),
    };
    debug!(
        path = %summarizer.path().display(),
        first = first_observation.0,
        "session starting"
    );

    let session = Arc::new(Mutex::new(Session::new(rounds, args.bet, first_observation)));
    let finalizer = Arc::new(Finalizer::new(Arc::clone(&session), summarizer));

    // The listener flushes whatever has accumulated and exits; if the
    // normal quit path already wrote, run() is a no-op and we just exit.
    let interrupt_finalizer = Arc::clone(&finalizer);
    ctrlc::set_handler(move || {
        info!("interrupt received");
        println!("Exiting the program...");
        match interrupt_finalizer.run() {
            Ok(Some(report)) => {
                print_report(&report);
                std::process::exit(0);
            }
            Ok(None) => std::process::exit(0),
            Err(err) => {
                error!(%err, "summary write failed on interrupt");
                eprintln!("{err:#}");
                std::process::exit(1);
            }
        }
    })?;

    repl::run(&mut input, &mut output, &session)?;

    if let Some(report) = finalizer.run()? {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &FlushReport) {
    println!(
        "Data summarized and saved to {} in the current directory.",
        report.filename
    );
    println!("Session net result: {} b", i64::from(report.net));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = Args::parse_from(["bonus_tally"]);
        assert_eq!(args.rounds, None);
        assert_eq!(args.bet, 1);
        assert_eq!(args.policy, WritePolicy::Append);
        assert_eq!(args.out_dir, PathBuf::from("."));
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "bonus_tally",
            "--rounds",
            "5",
            "--bet",
            "2",
            "--policy",
            "overwrite",
            "--out-dir",
            "/tmp/sheets",
        ]);
        assert_eq!(args.rounds, Some(5));
        assert_eq!(args.bet, 2);
        assert_eq!(args.policy, WritePolicy::Overwrite);
        assert_eq!(args.out_dir, PathBuf::from("/tmp/sheets"));
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        assert!(Args::try_parse_from(["bonus_tally", "--rounds", "0"]).is_err());
        assert!(Args::try_parse_from(["bonus_tally", "--bet", "0"]).is_err());
    }
}
