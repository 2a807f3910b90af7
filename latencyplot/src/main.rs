use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::debug;
use serde::Serialize;
use latencylib::boundaries::{compute_cache_boundaries, CacheBoundary};
use latencylib::config::CacheHierarchyConfig;
use latencylib::measurements::{Anomalies, MeasurementTable};
use latencylib::plot::PlotModel;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Plots memory access latency against array size, with the cache sizes marked"))]
struct Args {
    /// Benchmark output, three columns: array size (bytes), random and sequential latency (ns)
    #[arg(default_value = "output.csv")]
    input: PathBuf,

    /// Chart image, svg, png, bmp or jpg
    #[arg(short, long, default_value = "latency.png")]
    output: PathBuf,

    /// JSON cache hierarchy to mark instead of the built in one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print a JSON summary
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    rows: usize,
    anomalies: Anomalies,
    masked_points: usize,
    boundaries: &'a [CacheBoundary],
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let boundaries = match &args.config {
        Some(path) => {
            let config = CacheHierarchyConfig::from_path(path).map_err(|e| e.to_string())?;
            if args.debug {
                println!("Parsed cache configuration: {config:?}");
            }
            config.boundaries().map_err(|e| e.to_string())?
        }
        None => compute_cache_boundaries(),
    };
    debug!("Cache boundaries: {boundaries:?}");

    let start = Instant::now();
    let table = MeasurementTable::load(&args.input).map_err(|e| e.to_string())?;
    let loaded = Instant::now();
    let anomalies = table.count_anomalies();
    println!("Negative random access latencies: {}", anomalies.negative_random);
    println!("Negative sequential access latencies: {}", anomalies.negative_sequential);

    let model = PlotModel::new(&table, &boundaries).map_err(|e| e.to_string())?;
    model.render_to(&args.output).map_err(|e| e.to_string())?;
    let rendered = Instant::now();

    if args.json {
        let summary = Summary {
            rows: table.len(),
            anomalies,
            masked_points: model.masked_points(),
            boundaries: &boundaries,
        };
        println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| format!("Couldn't serialise the summary {e}"))?);
    }
    if args.performance {
        println!("Load time: {}s", (loaded - start).as_nanos() as f64 / 1e9);
        println!("Render time: {}s", (rendered - loaded).as_nanos() as f64 / 1e9);
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If timing, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Rows: {}, points left off the log scale: {}", table.len(), model.masked_points());
    }
    Ok(())
}
