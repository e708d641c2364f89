extern crate clap;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};

use clap::{App, Arg};
use simple_error::SimpleError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nearlit::*;

fn output_matches_as_text(result: &GroupedResult<SourcePosition>) {
    for entry in result.iter() {
        println!("- query: {}", entry.query);
        for association in entry.associations.iter() {
            println!("\tapproximate match in: {} (normalized: {})", association.position(), association.word());
        }
    }
}

fn output_matches_as_json(result: &GroupedResult<SourcePosition>) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(&result.to_report())?);
    Ok(())
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = App::new("nearlit")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("Finds near-duplicate string literals (likely typos) in extracted source code literals")
                    .arg(Arg::with_name("distance")
                        .long("distance")
                        .short("d")
                        .help("Maximum Damerau-Levenshtein distance at which two literals are reported as approximate matches")
                        .takes_value(true)
                        .default_value("2"))
                    .arg(Arg::with_name("json")
                        .long("json")
                        .short("j")
                        .help("Output json instead of text"))
                    .arg(Arg::with_name("single-thread")
                        .long("single-thread")
                        .help("Query the index using a single thread only"))
                    .arg(Arg::with_name("dedup-by-query")
                        .long("dedup-by-query")
                        .help("Retain distinct queries even if they produce exactly the same matches (by default only the first one is reported)"))
                    .arg(Arg::with_name("keep-placeholders")
                        .long("keep-placeholders")
                        .help("Do not skip short string format placeholders such as %d or %-5s"))
                    .arg(Arg::with_name("debug")
                        .long("debug")
                        .short("D")
                        .help("Debug logging (RUST_LOG overrides this)"))
                    .arg(Arg::with_name("files")
                        .help("Candidate lists, one literal<TAB>file:line:column record per line. Reads standard input if omitted or -")
                        .takes_value(true)
                        .multiple(true))
                    .get_matches();

    init_logging(args.is_present("debug"));

    let distance = args.value_of("distance").unwrap_or("2");
    let radius: DistanceType = distance.parse().map_err(|e| SimpleError::with(&format!("invalid distance {:?}", distance), e))?;
    let mut params = MatchParameters::default().with_radius(radius);
    if args.is_present("single-thread") {
        params = params.with_single_thread();
    }
    if args.is_present("dedup-by-query") {
        params = params.with_dedup(DedupStrategy::QueryAndMatchSet);
    }

    let mut filter = if args.is_present("keep-placeholders") {
        CandidateFilter::keep_placeholders()
    } else {
        CandidateFilter::new()?
    };

    let files: Vec<&str> = match args.values_of("files") {
        Some(files) => files.collect(),
        None => vec!["-"],
    };
    let mut candidates = Vec::new();
    for filename in files {
        match filename {
            "-" | "STDIN" | "stdin" => {
                info!("reading candidates from standard input");
                let stdin = io::stdin();
                candidates.extend(read_candidates(stdin.lock(), &mut filter)?);
            }
            _ => {
                let f = File::open(filename).map_err(|e| SimpleError::with(&format!("unable to open {}", filename), e))?;
                let more = read_candidates(BufReader::new(f), &mut filter)
                    .map_err(|e| SimpleError::new(format!("{}: {}", filename, e)))?;
                candidates.extend(more);
            }
        }
    }

    info!("starting query with Damerau-Levenshtein distance {}", radius);
    let queries: Vec<&str> = candidates.iter().map(|(literal, _)| literal.as_str()).collect();
    let tree = build_index(candidates.iter().map(|(literal, position)| (literal.as_str(), position.clone())));
    let result = collect_matches(&tree, &queries, &params);
    info!("indexed {} distinct literals, found {} groups of approximate matches", tree.len(), result.len());

    if args.is_present("json") {
        output_matches_as_json(&result)?;
    } else {
        output_matches_as_text(&result);
    }
    Ok(())
}
