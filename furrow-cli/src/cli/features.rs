//! Features command: list what an input file holds.

use serde::Serialize;

use super::common::{read_file, write_output, CliError};
use super::geojson::parse_features;

/// One feature in JSON output format.
#[derive(Serialize)]
struct JsonFeature<'a> {
    index: usize,
    id: &'a str,
    kind: &'static str,
}

/// Execute the features command.
pub fn cmd_features(args: &[String]) -> Result<(), CliError> {
    let mut input_path: Option<&str> = None;
    let mut json = false;

    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            path if !path.starts_with('-') => {
                if input_path.is_none() {
                    input_path = Some(path);
                }
            }
            unknown => eprintln!("Unknown option: {unknown}"),
        }
    }

    let Some(input_path) = input_path else {
        eprintln!("Usage: furrow features <features.geojson> [--json]");
        return Err(CliError::Usage("GeoJSON input file required".to_string()));
    };

    let features = parse_features(&read_file(input_path)?)?;

    let output = if json {
        let listed: Vec<JsonFeature> = features
            .iter()
            .map(|f| JsonFeature { index: f.index, id: &f.id, kind: f.shape.kind() })
            .collect();
        serde_json::to_string_pretty(&listed)?
    } else {
        features
            .iter()
            .map(|f| format!("{:>4}  {:<16} {}", f.index, f.id, f.shape.kind()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    write_output(None, &output)
}
