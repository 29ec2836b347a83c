//! Kuhn poker solver binary.
//!
//! Usage:
//!   cargo run --release --bin solve_kuhn -- [OPTIONS]
//!
//! Options:
//!   --iterations <N>     Number of CFR iterations (default: 10000)
//!   --variant <NAME>     Regret matching variant: vanilla | plus (default: vanilla)
//!   --linear             Weight the strategy average linearly by iteration
//!   --expl-every <N>     Evaluate exploitability every N iterations (default: 100)
//!   --output <FILE>      Output file (default: solution.json)

use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use layered_cfr::cfr::{
    AverageStrategy, AveragingScheme, IterationRecord, RegretMatchingVariant, Solver,
    SolverConfig,
};
use layered_cfr::games::kuhn;

/// Everything written to the output file.
#[derive(Serialize)]
struct Solution {
    config: SolverConfig,
    iterations: u64,
    game_value: [f64; 2],
    exploitability: f64,
    records: Vec<IterationRecord>,
    strategy: AverageStrategy,
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut iterations: u64 = 10_000;
    let mut variant = RegretMatchingVariant::Vanilla;
    let mut averaging = AveragingScheme::Uniform;
    let mut expl_every: u64 = 100;
    let mut output_file = "solution.json".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--iterations" | "-i" => {
                i += 1;
                if i < args.len() {
                    iterations = args[i].parse().unwrap_or(iterations);
                }
            }
            "--variant" | "-v" => {
                i += 1;
                if i < args.len() {
                    match RegretMatchingVariant::parse(&args[i]) {
                        Some(v) => variant = v,
                        None => {
                            eprintln!("Unknown variant: {}", args[i]);
                            return ExitCode::FAILURE;
                        }
                    }
                }
            }
            "--linear" | "-l" => {
                averaging = AveragingScheme::Linear;
            }
            "--expl-every" | "-e" => {
                i += 1;
                if i < args.len() {
                    expl_every = args[i].parse().unwrap_or(expl_every);
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--help" | "-h" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    println!("=================================================");
    println!("  Kuhn Poker Layered CFR Solver");
    println!("=================================================");
    println!();
    println!("Iterations: {}", iterations);
    println!("Variant: {:?}", variant);
    println!("Averaging: {:?}", averaging);
    println!("Exploitability every: {}", expl_every);
    println!("Output: {}", output_file);
    println!();

    let config = SolverConfig::default()
        .with_variant(variant)
        .with_averaging(averaging)
        .with_exploitability_every(expl_every);

    let mut solver = match Solver::new(&kuhn::game(), config.clone()) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("Error building solver: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tree = solver.tree();
    println!(
        "Game tree: {} nodes, {} layers, {} information sets",
        tree.num_nodes(),
        tree.num_layers(),
        tree.num_infosets()
    );
    println!();

    let bar = ProgressBar::new(iterations);
    if let Ok(style) =
        ProgressStyle::with_template("{bar:40} {pos}/{len} iterations ({eta} left)")
    {
        bar.set_style(style);
    }

    let start_time = Instant::now();
    let mut records = Vec::with_capacity(iterations as usize);
    let chunk = expl_every.min(iterations);

    while solver.iteration() < iterations {
        let step = chunk.min(iterations - solver.iteration());
        match solver.run(step) {
            Ok(batch) => records.extend(batch),
            Err(e) => {
                bar.abandon();
                eprintln!("Error at iteration {}: {}", solver.iteration(), e);
                return ExitCode::FAILURE;
            }
        }
        bar.set_position(solver.iteration());
    }
    bar.finish();

    let elapsed = start_time.elapsed().as_secs_f64();
    let game_value = solver.game_value();
    let exploitability = solver.exploitability();

    println!();
    println!("Training complete!");
    println!("Total time: {:.2}s ({:.0} iterations/second)", elapsed, iterations as f64 / elapsed);
    println!("Game value: {:+.6} (expected -1/18 = {:+.6})", game_value[0], -1.0 / 18.0);
    println!("Exploitability: {:.6}", exploitability);
    println!();

    let strategy = solver.average_strategy();

    println!("=== Average Strategy ===");
    println!();
    for entry in &strategy.entries {
        print!("{:>6} (player {}):", entry.key, entry.player);
        for (action, prob) in entry.actions.iter().zip(&entry.probabilities) {
            print!("  {} {:5.1}%", action, prob * 100.0);
        }
        println!();
    }
    println!();

    let solution = Solution {
        config,
        iterations,
        game_value,
        exploitability,
        records,
        strategy,
    };

    println!("Saving results to {}...", output_file);
    let file = match File::create(&output_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error creating {}: {}", output_file, e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = serde_json::to_writer_pretty(BufWriter::new(file), &solution) {
        eprintln!("Error writing {}: {}", output_file, e);
        return ExitCode::FAILURE;
    }

    println!("Done!");
    ExitCode::SUCCESS
}

fn print_help() {
    println!("Kuhn Poker Layered CFR Solver");
    println!();
    println!("Usage: solve_kuhn [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -i, --iterations <N>     Number of CFR iterations (default: 10000)");
    println!("  -v, --variant <NAME>     Regret matching variant: vanilla | plus");
    println!("  -l, --linear             Weight the strategy average linearly by iteration");
    println!("  -e, --expl-every <N>     Evaluate exploitability every N iterations");
    println!("  -o, --output <FILE>      Output file (default: solution.json)");
    println!("  -h, --help               Show this help");
    println!();
    println!("Examples:");
    println!("  # Vanilla CFR, 10k iterations");
    println!("  solve_kuhn");
    println!();
    println!("  # CFR+ with linear averaging, 100k iterations");
    println!("  solve_kuhn --variant plus --linear --iterations 100000");
}
