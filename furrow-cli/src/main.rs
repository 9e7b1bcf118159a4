//! furrow - points along lines and rows across polygons
//!
//! Usage:
//!   furrow points <features.geojson> [options]   Sample points along a line
//!   furrow rows <features.geojson> [options]     Generate clipped rows
//!   furrow features <features.geojson>           List input features

use std::env;

mod cli;

use cli::{cmd_features, cmd_points, cmd_rows, CliError};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("furrow");

    let result: Result<(), CliError> = match args.get(1).map(String::as_str) {
        Some("points") => cmd_points(&args[2..]),
        Some("rows") => cmd_rows(&args[2..]),
        Some("features") => cmd_features(&args[2..]),
        Some("help" | "--help" | "-h") => {
            print_usage(prog);
            Ok(())
        }
        Some("--version" | "-V") => {
            println!("furrow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(other) => {
            print_usage(prog);
            Err(CliError::Usage(format!("Unknown command: {other}")))
        }
        None => {
            print_usage(prog);
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        log::debug!("command failed: {e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn print_usage(prog: &str) {
    eprintln!("furrow - points along lines and rows across polygons");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} points <features.geojson> [options]");
    eprintln!("  {prog} rows <features.geojson> [options]");
    eprintln!("  {prog} features <features.geojson> [--json]");
    eprintln!();
    eprintln!("Input is a GeoJSON FeatureCollection in EPSG:3857 (or lon/lat with");
    eprintln!("--geographic). Run '{prog} points --help' or '{prog} rows --help' for");
    eprintln!("command options.");
    eprintln!();
    eprintln!("Logging:");
    eprintln!("  RUST_LOG=debug {prog} rows fields.geojson   Trace generation steps");
}
