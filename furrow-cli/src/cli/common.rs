//! Common utilities shared across CLI commands.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use furrow::{FurrowError, Identity, Point, Projection, WebMercator};

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid job file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Feature(String),

    #[error(transparent)]
    Furrow(#[from] FurrowError),
}

/// Output format for generated geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Svg,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "geojson" => Ok(OutputFormat::Json),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(CliError::Usage(format!(
                "Unknown format: {other}. Use 'json' or 'svg'."
            ))),
        }
    }
}

/// Coordinate frame of the input file.
///
/// Web-map feature services hand out EPSG:3857; `--geographic` switches to
/// plain lon/lat. Output is written in the same frame as the input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Frame {
    #[default]
    Display,
    Geographic,
}

impl Projection for Frame {
    fn to_geographic(&self, p: Point) -> Point {
        match self {
            Frame::Display => WebMercator.to_geographic(p),
            Frame::Geographic => Identity.to_geographic(p),
        }
    }

    fn to_display(&self, p: Point) -> Point {
        match self {
            Frame::Display => WebMercator.to_display(p),
            Frame::Geographic => Identity.to_display(p),
        }
    }
}

/// Parse the value following a flag.
pub fn flag_value<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T, CliError> {
    let value = value.ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))?;
    value
        .parse()
        .map_err(|_| CliError::Usage(format!("invalid value for {flag}: '{value}'")))
}

pub fn read_file(path: &str) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.into(), source })
}

/// Write to a file, or to stdout for `-` / no path.
pub fn write_output(output_path: Option<&str>, output: &str) -> Result<(), CliError> {
    match output_path {
        Some("-") | None => {
            println!("{output}");
        }
        Some(path) => {
            fs::write(path, output).map_err(|source| CliError::Write { path: path.into(), source })?;
            eprintln!("Wrote: {path}");
        }
    }
    Ok(())
}
