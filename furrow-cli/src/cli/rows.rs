//! Rows command: lay parallel rows across a polygon feature and clip them.

use serde_json::json;

use furrow::{Line, Point, Projection, RowsSession, ScanDirection, Shape};

use super::common::{flag_value, read_file, write_output, CliError, Frame, OutputFormat};
use super::config::JobConfig;
use super::geojson::{parse_features, props, select_feature, OutputCollection};
use super::svg::{marks_to_svg, Mark};

fn source_rings(shape: &Shape) -> Vec<&[Point]> {
    match shape {
        Shape::Polygon(rings) => rings.iter().map(Vec::as_slice).collect(),
        Shape::MultiPolygon(polygons) => polygons.iter().flatten().map(Vec::as_slice).collect(),
        Shape::Point(_) | Shape::Line(_) => Vec::new(),
    }
}

fn display_line(frame: &Frame, line: &Line) -> Line {
    Line::new(frame.points_to_display(&line.points))
}

/// Execute the rows command.
pub fn cmd_rows(args: &[String]) -> Result<(), CliError> {
    let mut input_path: Option<&str> = None;
    let mut output_path: Option<&str> = None;
    let mut config_path: Option<&str> = None;
    let mut selector: Option<&str> = None;
    let mut format = OutputFormat::Json;
    let mut frame = Frame::Display;
    let mut preview_only = false;

    let mut step: Option<f64> = None;
    let mut angle: Option<f64> = None;
    let mut scale: Option<f64> = None;
    let mut direction: Option<ScanDirection> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-s" | "--step" => {
                i += 1;
                step = Some(flag_value("--step", args.get(i))?);
            }
            "-a" | "--angle" => {
                i += 1;
                angle = Some(flag_value("--angle", args.get(i))?);
            }
            "--scale" => {
                i += 1;
                scale = Some(flag_value("--scale", args.get(i))?);
            }
            "--direction" => {
                i += 1;
                direction = Some(flag_value("--direction", args.get(i))?);
            }
            "--preview" => {
                preview_only = true;
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
        Some(path) => JobConfig::load(path)?.rows,
        None => Default::default(),
    };
    form.step = step.unwrap_or(form.step);
    form.angle = angle.unwrap_or(form.angle);
    form.scale = scale.unwrap_or(form.scale);
    form.direction = direction.unwrap_or(form.direction);

    let features = parse_features(&read_file(input_path)?)?;
    let feature = select_feature(&features, selector, |shape| {
        matches!(shape, Shape::Polygon(_) | Shape::MultiPolygon(_))
    })?;
    eprintln!("Laying rows over feature {} ({})", feature.id, feature.shape.kind());

    let mut session = RowsSession::new(frame);
    session.set_form(form);
    session.select(feature.shape.clone());
    let preview = session.generate_rows()?.to_display(&frame);

    let mut out = OutputCollection::new();
    let closed_box = [preview.bbox[0], preview.bbox[1], preview.bbox[2], preview.bbox[3], preview.bbox[0]];

    let rows: Vec<(Line, bool)> = if preview_only {
        eprintln!("Preview: {} rows at {}°", preview.lines.len(), session.form().angle);
        out.push_ring(&closed_box, props([("role", json!("bbox"))]));
        out.push_point(preview.pivot, props([("role", json!("pivot"))]));
        out.push_point(preview.handle, props([("role", json!("handle"))]));
        for line in &preview.lines {
            out.push_line(line, props([("role", json!("row"))]));
        }
        preview.lines.iter().map(|line| (line.clone(), false)).collect()
    } else {
        let segments = session.save_rows()?;
        eprintln!("Clipped into {} row segments", segments.len());
        let rows: Vec<(Line, bool)> = segments
            .iter()
            .map(|seg| (display_line(&frame, &seg.line), seg.first))
            .collect();
        for (index, (line, first)) in rows.iter().enumerate() {
            out.push_line(line, props([("index", json!(index)), ("first", json!(first))]));
        }
        rows
    };

    let output = match format {
        OutputFormat::Json => out.to_json()?,
        OutputFormat::Svg => {
            let mut marks: Vec<Mark> = source_rings(&feature.shape).into_iter().map(Mark::Outline).collect();
            if preview_only {
                marks.push(Mark::Outline(&closed_box));
                marks.push(Mark::Dot(preview.pivot));
                marks.push(Mark::Dot(preview.handle));
            }
            marks.extend(
                rows.iter()
                    .map(|(line, first)| Mark::Path { points: &line.points, highlight: *first }),
            );
            marks_to_svg(&marks)
        }
    };

    write_output(output_path, &output)
}

fn print_usage() {
    eprintln!("Usage: furrow rows <features.geojson> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --step <m>           Distance between rows, meters (default: 10)");
    eprintln!("  -a, --angle <deg>        Row rotation (default: 0)");
    eprintln!("  --scale <n>              Grow the box about its center, >= 1 (default: 1)");
    eprintln!("  --direction <dir>        left-to-right, right-to-left, top-to-bottom,");
    eprintln!("                           bottom-to-top: marks the first row (default: left-to-right)");
    eprintln!("  --preview                Output the unclipped box, pivot, handle and rows");
    eprintln!("  --feature <id|index>     Feature to use (default: first polygon)");
    eprintln!("  -c, --config <job.yaml>  Read options from a job file (flags win)");
    eprintln!("  --geographic             Input is lon/lat instead of EPSG:3857");
    eprintln!("  -f, --format <fmt>       Output format: json, svg (default: json)");
    eprintln!("  -o, --output <file>      Output file (default: stdout)");
}
