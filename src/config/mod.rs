//! Run configuration: an optional JSON file merged with command-line flags,
//! then validated into [`Settings`].
//!
//! JSON shape (every field optional):
//! {
//!   "marker_name": "/schedgen",
//!   "select": { "pattern": "swerve|navX.*Value|schedgen" },
//!   "aggregation": "first",          // first | last | mean | max | min | error
//!   "output_dir": "output_files",
//!   "output": "out.csv",             // single input file only
//!   "max_period": 0.02               // seconds; 0 disables the loop period check
//! }

pub mod select;

pub use select::SelectSpec;

use crate::model::{Aggregation, Selection};
use anyhow::{Context, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MARKER: &str = "/schedgen";
pub const DEFAULT_OUTPUT_DIR: &str = "output_files";
pub const DEFAULT_MAX_PERIOD: f64 = 0.02;

/// Which output a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Scatter plot of the selected series.
    Plot,
    /// Per-generation spreadsheet table.
    Spread,
}

impl Mode {
    fn default_pattern(self) -> &'static str {
        match self {
            Mode::Plot => "swerve.*FL.*angle",
            Mode::Spread => "swerve|navX.*Value|schedgen",
        }
    }

    /// Appended to the input file stem to name the output file.
    pub fn output_suffix(self) -> &'static str {
        match self {
            Mode::Plot => "_plot.html",
            Mode::Spread => "_output.csv",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub marker_name: Option<String>,

    #[serde(default)]
    pub select: Option<SelectSpec>,

    #[serde(default)]
    pub aggregation: Option<Aggregation>,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub max_period: Option<f64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config file {}", path.display()))
    }

    /// Fields set in `overrides` win over fields set here.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            marker_name: overrides.marker_name.or(self.marker_name),
            select: overrides.select.or(self.select),
            aggregation: overrides.aggregation.or(self.aggregation),
            output_dir: overrides.output_dir.or(self.output_dir),
            output: overrides.output.or(self.output),
            max_period: overrides.max_period.or(self.max_period),
        }
    }

    /// Fill defaults for `mode`, compile the selection, and check values.
    pub fn validate_and_build(&self, mode: Mode) -> anyhow::Result<Settings> {
        let marker_name = self
            .marker_name
            .clone()
            .unwrap_or_else(|| DEFAULT_MARKER.to_string());
        if marker_name.trim().is_empty() {
            bail!("marker_name must not be empty");
        }

        let selection = self
            .select
            .clone()
            .unwrap_or_else(|| SelectSpec::Pattern(mode.default_pattern().to_string()))
            .compile()?;

        let max_period = match self.max_period {
            None => Some(DEFAULT_MAX_PERIOD),
            Some(p) if p.is_nan() || p < 0.0 => bail!("max_period must be >= 0, got {}", p),
            Some(p) if p == 0.0 => None,
            Some(p) => Some(p),
        };

        Ok(Settings {
            mode,
            marker_name,
            selection,
            aggregation: self.aggregation.unwrap_or_default(),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            output: self.output.clone(),
            max_period,
        })
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mode: Mode,
    pub marker_name: String,
    pub selection: Selection,
    pub aggregation: Aggregation,
    pub output_dir: PathBuf,
    /// Explicit destination; only meaningful for a single input file.
    pub output: Option<PathBuf>,
    /// Generations longer than this are reported. None disables the check.
    pub max_period: Option<f64>,
}

impl Settings {
    /// `<output_dir>/<input stem><suffix>`, unless an explicit output is set.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        if let Some(out) = &self.output {
            return out.clone();
        }
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "datalog".to_string());
        self.output_dir
            .join(format!("{}{}", stem, self.mode.output_suffix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_depend_on_mode() {
        let plot = ConfigFile::default().validate_and_build(Mode::Plot).unwrap();
        assert!(plot.selection.matches("/swerve/FL/set/angle"));
        assert!(!plot.selection.matches("/schedgen"));

        let spread = ConfigFile::default().validate_and_build(Mode::Spread).unwrap();
        assert_eq!(spread.marker_name, "/schedgen");
        assert!(spread.selection.matches("/schedgen"));
        assert!(spread.selection.matches("/navX/yaw/Value"));
        assert_eq!(spread.aggregation, Aggregation::First);
        assert_eq!(spread.max_period, Some(DEFAULT_MAX_PERIOD));
    }

    #[test]
    fn overrides_win() {
        let file: ConfigFile = serde_json::from_str(
            r#"{"marker_name": "/tick", "aggregation": "mean", "output_dir": "a"}"#,
        )
        .unwrap();
        let flags = ConfigFile {
            aggregation: Some(Aggregation::Max),
            ..Default::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.marker_name.as_deref(), Some("/tick"));
        assert_eq!(merged.aggregation, Some(Aggregation::Max));
        assert_eq!(merged.output_dir, Some(PathBuf::from("a")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<ConfigFile>(r#"{"marker": "/m"}"#).is_err());
    }

    #[test]
    fn max_period_zero_disables_check() {
        let cfg = ConfigFile {
            max_period: Some(0.0),
            ..Default::default()
        };
        assert_eq!(cfg.validate_and_build(Mode::Spread).unwrap().max_period, None);

        let bad = ConfigFile {
            max_period: Some(-1.0),
            ..Default::default()
        };
        assert!(bad.validate_and_build(Mode::Spread).is_err());
    }

    #[test]
    fn output_path_is_derived_from_input_stem() {
        let settings = ConfigFile::default().validate_and_build(Mode::Spread).unwrap();
        assert_eq!(
            settings.output_path_for(Path::new("logs/FRC_2024.csv")),
            PathBuf::from("output_files/FRC_2024_output.csv")
        );

        let plot = ConfigFile {
            output_dir: Some(PathBuf::from("plots")),
            ..Default::default()
        }
        .validate_and_build(Mode::Plot)
        .unwrap();
        assert_eq!(
            plot.output_path_for(Path::new("run.csv")),
            PathBuf::from("plots/run_plot.html")
        );
    }
}
