//! CLI command implementations.
//!
//! This module contains the implementations for the CLI subcommands:
//! - `points` - Sample points along a line feature
//! - `rows` - Lay rows across a polygon feature and clip them
//! - `features` - List the features of an input file

pub mod common;
pub mod config;
pub mod features;
pub mod geojson;
pub mod points;
pub mod rows;
pub mod svg;

pub use common::CliError;
pub use features::cmd_features;
pub use points::cmd_points;
pub use rows::cmd_rows;
