//! Per-file processing and the sequential batch driver.
//!
//! Errors are file-scoped: a file that fails is reported and the batch moves
//! on to the next one.

use crate::config::{Mode, Settings};
use crate::error::FileError;
use crate::log::row::is_time_ordered;
use crate::log::{LogFile, read_log_file};
use crate::model::{self, AggregateError, filter_rows};
use crate::render::{PlotData, render_scatter_html, table_to_csv, write_output};
use anyhow::{Context, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Rows shown at debug level when plotting.
const TAIL_ROWS: usize = 10;

/// What happened to one successfully processed file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub retained: usize,
    /// Zero for plots, which do not bucket.
    pub generations: usize,
    pub unassignable: usize,
    pub overruns: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<FileSummary>,
    pub failed: Vec<(PathBuf, FileError)>,
}

impl BatchReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A single CSV file, or every `*.csv` file directly inside a directory in
/// name order.
pub fn discover_inputs(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input {} does not exist", input.display());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input).with_context(|| format!("read directory {}", input.display()))? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Discover inputs and process them one after another.
pub fn run(input: &Path, settings: &Settings) -> anyhow::Result<BatchReport> {
    let inputs = discover_inputs(input)?;
    if settings.output.is_some() && (input.is_dir() || inputs.len() > 1) {
        bail!("an explicit output path needs a single input file, not a directory");
    }
    if inputs.is_empty() {
        tracing::warn!("no .csv files found in {}", input.display());
    }
    Ok(run_batch(&inputs, settings))
}

pub fn run_batch(inputs: &[PathBuf], settings: &Settings) -> BatchReport {
    let mut report = BatchReport::default();
    for path in inputs {
        match process_file(path, settings) {
            Ok(summary) => {
                tracing::info!(
                    rows = summary.rows,
                    retained = summary.retained,
                    generations = summary.generations,
                    "{} -> {}",
                    summary.input.display(),
                    summary.output.display()
                );
                report.succeeded.push(summary);
            }
            Err(e) => {
                tracing::error!("{}", e);
                report.failed.push((path.clone(), e));
            }
        }
    }
    report
}

pub fn process_file(path: &Path, settings: &Settings) -> Result<FileSummary, FileError> {
    let file = read_log_file(path)?;
    if !is_time_ordered(&file.rows) {
        tracing::warn!(
            "{}: rows are not in timestamp order; results assume ascending timestamps",
            path.display()
        );
    }

    match settings.mode {
        Mode::Spread => spread(&file, settings),
        Mode::Plot => plot(&file, settings),
    }
}

fn spread(file: &LogFile, settings: &Settings) -> Result<FileSummary, FileError> {
    let path = file.path.as_path();
    let report = model::build_generation_table(
        &file.rows,
        &settings.selection,
        &settings.marker_name,
        settings.aggregation,
    )
    .map_err(|e| aggregate_error(path, e))?;

    if !report.generations.has_markers() {
        tracing::warn!(
            "{}: no {} marker rows; treating the whole file as one generation",
            path.display(),
            settings.marker_name
        );
    }

    if let Some(first) = report.unassignable.first() {
        tracing::warn!(
            "{}: skipped {} row(s) outside every generation (first at timestamp {})",
            path.display(),
            report.unassignable.len(),
            first.timestamp
        );
    }

    let overruns = match settings.max_period {
        Some(max) => report.generations.overruns(max),
        None => Vec::new(),
    };
    if let Some(longest) = overruns.iter().map(|g| g.period()).reduce(f64::max) {
        tracing::warn!(
            "{}: {} generation(s) longer than {}s (longest {:.4}s)",
            path.display(),
            overruns.len(),
            settings.max_period.unwrap_or_default(),
            longest
        );
    }

    let out = settings.output_path_for(path);
    let bytes = table_to_csv(&report.table).map_err(|e| FileError::output_write(&out, e))?;
    write_output(&out, &bytes)?;
    println!("Wrote {}", out.display());

    Ok(FileSummary {
        input: path.to_path_buf(),
        output: out,
        rows: file.rows.len(),
        retained: report.retained,
        generations: report.generations.len(),
        unassignable: report.unassignable.len(),
        overruns: overruns.len(),
    })
}

fn plot(file: &LogFile, settings: &Settings) -> Result<FileSummary, FileError> {
    let path = file.path.as_path();
    let filtered = filter_rows(&file.rows, &settings.selection, &settings.marker_name);

    let skip = filtered.retained.len().saturating_sub(TAIL_ROWS);
    for row in &filtered.retained[skip..] {
        tracing::debug!("{:>12} {:<40} {}", row.timestamp, row.name, row.value.raw);
    }

    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = PlotData::from_rows(title, &filtered.retained, path)?;
    if data.series.is_empty() {
        tracing::warn!("{}: no rows matched the selection", path.display());
    }

    let out = settings.output_path_for(path);
    let html = render_scatter_html(&data).map_err(|source| FileError::Render {
        path: path.to_path_buf(),
        source,
    })?;
    write_output(&out, html.as_bytes())?;
    println!("Wrote {}", out.display());

    Ok(FileSummary {
        input: path.to_path_buf(),
        output: out,
        rows: file.rows.len(),
        retained: filtered.retained.len(),
        generations: 0,
        unassignable: 0,
        overruns: 0,
    })
}

fn aggregate_error(path: &Path, e: AggregateError) -> FileError {
    match e {
        AggregateError::Duplicate { name, key, count } => FileError::DuplicateValue {
            path: path.to_path_buf(),
            name,
            key: key.to_string(),
            count,
        },
        e @ AggregateError::NonNumeric { .. } => FileError::input_format(path, e.to_string()),
    }
}
