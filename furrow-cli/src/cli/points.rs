//! Points command: sample points along a line feature.

use serde_json::json;

use furrow::{generate_points_on_line, Projection, Shape, StartFrom};

use super::common::{flag_value, read_file, write_output, CliError, Frame, OutputFormat};
use super::config::JobConfig;
use super::geojson::{parse_features, props, select_feature, OutputCollection};
use super::svg::{marks_to_svg, Mark};

/// Execute the points command.
pub fn cmd_points(args: &[String]) -> Result<(), CliError> {
    let mut input_path: Option<&str> = None;
    let mut output_path: Option<&str> = None;
    let mut config_path: Option<&str> = None;
    let mut selector: Option<&str> = None;
    let mut format = OutputFormat::Json;
    let mut frame = Frame::Display;

    // Flags are collected first and applied over the job file afterwards.
    let mut distance: Option<f64> = None;
    let mut count: Option<f64> = None;
    let mut padding_start: Option<f64> = None;
    let mut padding_end: Option<f64> = None;
    let mut end_point = false;
    let mut start_from: Option<StartFrom> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--distance" => {
                i += 1;
                distance = Some(flag_value("--distance", args.get(i))?);
            }
            "-n" | "--count" => {
                i += 1;
                count = Some(flag_value("--count", args.get(i))?);
            }
            "--padding-start" => {
                i += 1;
                padding_start = Some(flag_value("--padding-start", args.get(i))?);
            }
            "--padding-end" => {
                i += 1;
                padding_end = Some(flag_value("--padding-end", args.get(i))?);
            }
            "--end-point" => {
                end_point = true;
            }
            "--from" => {
                i += 1;
                start_from = Some(match args.get(i).map(String::as_str) {
                    Some("start") => StartFrom::Start,
                    Some("end") => StartFrom::End,
                    other => {
                        return Err(CliError::Usage(format!(
                            "--from takes 'start' or 'end', got {other:?}"
                        )));
                    }
                });
            }
            "--feature" => {
                i += 1;
                selector = args.get(i).map(String::as_str);
            }
            "-c" | "--config" => {
                i += 1;
                config_path = args.get(i).map(String::as_str);
            }
            "-o" | "--output" => {
                i += 1;
                output_path = args.get(i).map(String::as_str);
            }
            "-f" | "--format" => {
                i += 1;
                format = flag_value("--format", args.get(i))?;
            }
            "--geographic" => {
                frame = Frame::Geographic;
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(());
            }
            path if !path.starts_with('-') => {
                if input_path.is_none() {
                    input_path = Some(path);
                }
            }
            unknown => {
                eprintln!("Unknown option: {unknown}");
            }
        }
        i += 1;
    }

    let Some(input_path) = input_path else {
        print_usage();
        return Err(CliError::Usage("GeoJSON input file required".to_string()));
    };

    let mut form = match config_path {
        Some(path) => JobConfig::load(path)?.points,
        None => Default::default(),
    };
    form.distance = distance.or(form.distance);
    form.count = count.or(form.count);
    form.padding_start = padding_start.or(form.padding_start);
    form.padding_end = padding_end.or(form.padding_end);
    form.generate_end_point |= end_point;
    if let Some(start_from) = start_from {
        form.start_generate = start_from;
    }

    let features = parse_features(&read_file(input_path)?)?;
    let feature = select_feature(&features, selector, |shape| matches!(shape, Shape::Line(_)))?;
    eprintln!("Sampling along feature {} ({})", feature.id, feature.shape.kind());

    let points = generate_points_on_line(&feature.shape, &form, &frame)?;
    let shown = frame.points_to_display(&points);
    eprintln!("Generated {} points", shown.len());

    let output = match format {
        OutputFormat::Json => {
            let mut out = OutputCollection::new();
            for (index, p) in shown.iter().enumerate() {
                out.push_point(*p, props([("index", json!(index))]));
            }
            out.to_json()?
        }
        OutputFormat::Svg => {
            let mut marks = Vec::with_capacity(shown.len() + 1);
            if let Shape::Line(line) = &feature.shape {
                marks.push(Mark::Path { points: line, highlight: false });
            }
            marks.extend(shown.iter().map(|p| Mark::Dot(*p)));
            marks_to_svg(&marks)
        }
    };

    write_output(output_path, &output)
}

fn print_usage() {
    eprintln!("Usage: furrow points <features.geojson> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -d, --distance <m>       Distance between points, meters");
    eprintln!("  -n, --count <n>          Number of points (spacing when no distance)");
    eprintln!("  --padding-start <m>      Skip this much of the line's start");
    eprintln!("  --padding-end <m>        Skip this much of the line's end");
    eprintln!("  --end-point              Always include the line's last point");
    eprintln!("  --from <start|end>       Which end sampling starts from (default: start)");
    eprintln!("  --feature <id|index>     Feature to use (default: first line)");
    eprintln!("  -c, --config <job.yaml>  Read options from a job file (flags win)");
    eprintln!("  --geographic             Input is lon/lat instead of EPSG:3857");
    eprintln!("  -f, --format <fmt>       Output format: json, svg (default: json)");
    eprintln!("  -o, --output <file>      Output file (default: stdout)");
}
