use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Builder;

use dslab_cpu_sched::algorithm::Algorithm;
use dslab_cpu_sched::request::Request;
use dslab_cpu_sched::response::Response;
use dslab_cpu_sched::scheduler::simulate;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Simulates CPU scheduling of processes described in a request file and reports the results.
struct Args {
    /// Path to YAML or JSON file with processes and processors
    #[arg(short, long)]
    request: PathBuf,

    /// Scheduling algorithm (FCFS, SPN, SRTN, RR, HRRN), overrides the one from request file.
    /// Use "all" to compare all algorithms.
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Time quantum for round robin, overrides the one from request file
    #[arg(short = 'q', long)]
    time_quantum: Option<u64>,

    /// Path to produced JSON file with per-tick trace (single algorithm only)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn print_results(algorithm: Algorithm, response: &Response) {
    println!("\n{}", algorithm);
    println!(
        "{:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
        "process", "arrival", "workload", "waiting", "TT", "NTT"
    );
    for result in response.results.iter() {
        println!(
            "{:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8.2}",
            result.id,
            result.arrival_time,
            result.workload,
            result.waiting_time,
            result.turnaround_time,
            result.normalized_turnaround_time
        );
    }
    let summary = response.summary();
    println!(
        "avg waiting {:.2}, avg TT {:.2}, avg NTT {:.2}, makespan {}, power {:.2}",
        summary.average_waiting_time,
        summary.average_turnaround_time,
        summary.average_normalized_turnaround_time,
        summary.makespan,
        summary.total_power
    );
}

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    let mut request = Request::from_file(&args.request).unwrap_or_else(|e| panic!("{}", e));
    if args.time_quantum.is_some() {
        request.time_quantum = args.time_quantum;
    }

    let algorithms = match args.algorithm.as_deref() {
        Some("all") => Algorithm::ALL.to_vec(),
        Some(name) => vec![name.parse().unwrap_or_else(|e| panic!("{}", e))],
        None => vec![request.algorithm],
    };
    if args.output.is_some() && algorithms.len() > 1 {
        panic!("Trace output is supported for a single algorithm only");
    }

    for algorithm in algorithms {
        request.algorithm = algorithm;
        if algorithm.requires_time_quantum() && request.time_quantum.is_none() {
            log::warn!("skipping {}: no time quantum specified", algorithm);
            continue;
        }
        let response = simulate(&request).unwrap_or_else(|e| panic!("Invalid request: {}", e));
        print_results(algorithm, &response);
        if let Some(output) = &args.output {
            response
                .save_to_file(output)
                .unwrap_or_else(|e| panic!("Can't write trace to {}: {}", output.display(), e));
        }
    }
}
