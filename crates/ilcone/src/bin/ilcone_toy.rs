use std::{env, process, time::Instant};

use env_logger::Env;
use ilcone::{
    available_analyses, toy_dijet_event, traits::ReadWrite, AnalysisHandler, IlconeResult,
    RunInfo,
};
use log::{info, warn};

const DEFAULT_SQRT_S: f64 = 1960.0;
const SEED: u64 = 0;

fn usage() {
    eprintln!(
        "Usage: ilcone-toy <n_events> [sqrt_s] [output] [analysis ...]\n\
         Generates toy dijet events at sqrt_s (default {DEFAULT_SQRT_S} GeV), runs the named\n\
         analyses (default: every analysis which supports sqrt_s) and writes the results to\n\
         output, or prints them when output is \"-\" or missing.\n\
         analyses: {}\n\
         Set ILCONE_LOG to change the log level (default info).",
        available_analyses().join(" | ")
    );
}

struct Args {
    n_events: usize,
    sqrt_s: f64,
    output: Option<String>,
    analyses: Vec<String>,
}

fn parse_args() -> Option<Args> {
    let mut args = env::args().skip(1);
    let n_events = args.next()?.parse().ok()?;
    let sqrt_s = match args.next() {
        Some(raw) => raw.parse().ok()?,
        None => DEFAULT_SQRT_S,
    };
    let output = args.next().filter(|raw| raw != "-");
    let mut analyses: Vec<String> = args.collect();
    if analyses.is_empty() {
        analyses = available_analyses()
            .into_iter()
            .map(str::to_string)
            .collect();
    }
    Some(Args {
        n_events,
        sqrt_s,
        output,
        analyses,
    })
}

fn main() -> IlconeResult<()> {
    env_logger::init_from_env(Env::default().filter_or("ILCONE_LOG", "info"));
    let Some(args) = parse_args() else {
        usage();
        process::exit(2);
    };

    let mut handler = AnalysisHandler::new(RunInfo::new(args.sqrt_s));
    let added = handler.add_analyses(&args.analyses)?;
    if added == 0 {
        warn!("No analysis supports sqrt(s) = {} GeV", args.sqrt_s);
    }
    info!(
        "Running {} over {} toy events at sqrt(s) = {} GeV",
        handler.analysis_names().join(", "),
        args.n_events,
        args.sqrt_s
    );

    let mut rng = fastrand::Rng::with_seed(SEED);
    let start = Instant::now();
    for _ in 0..args.n_events {
        handler.analyze(&toy_dijet_event(&mut rng, args.sqrt_s));
    }
    for name in handler.analysis_names() {
        info!(
            "{}: {} of {} events vetoed",
            name,
            handler.n_vetoed(name).unwrap_or_default(),
            handler.n_events()
        );
    }
    let results = handler.finalize();
    info!(
        "Processed {} events in {:.3} s",
        args.n_events,
        start.elapsed().as_secs_f64()
    );

    match args.output {
        Some(path) => {
            results.save(&path)?;
            info!("Wrote {} histograms to {}", results.len(), path);
        }
        None => println!("{}", results),
    }
    Ok(())
}
