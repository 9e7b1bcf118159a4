//! YAML job files.
//!
//! A job file holds the same values as the point and row forms:
//!
//! ```yaml
//! points:
//!   distance: 25
//!   generateEndPoint: true
//! rows:
//!   step: 15
//!   angle: 30
//!   direction: right-to-left
//! ```
//!
//! Missing keys keep the form defaults. Command-line flags override the file.

use serde::Deserialize;

use furrow::{PointsForm, RowsForm};

use super::common::{read_file, CliError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub points: PointsForm,
    pub rows: RowsForm,
}

impl JobConfig {
    pub fn from_yaml(text: &str) -> Result<Self, CliError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &str) -> Result<Self, CliError> {
        let config = Self::from_yaml(&read_file(path)?)?;
        log::debug!("loaded job file {path}: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use furrow::{ScanDirection, StartFrom};

    #[test]
    fn reads_both_forms() {
        let config = JobConfig::from_yaml(
            "points:\n  count: 4\n  startGenerate: end\nrows:\n  step: 15\n  direction: bottom-to-top\n",
        )
        .unwrap();
        assert_eq!(config.points.count, Some(4.0));
        assert_eq!(config.points.start_generate, StartFrom::End);
        assert_eq!(config.rows.step, 15.0);
        assert_eq!(config.rows.scale, 1.0);
        assert_eq!(config.rows.direction, ScanDirection::BottomToTop);
    }

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(JobConfig::from_yaml("{}").unwrap(), JobConfig::default());
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(matches!(JobConfig::from_yaml("rows:\n  step: wide\n"), Err(CliError::Yaml(_))));
    }
}
