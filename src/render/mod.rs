//! Output adapters: HTML scatter plots and CSV generation tables.

pub mod html;
pub mod table;

pub use html::{PlotData, Series, render_scatter_html};
pub use table::table_to_csv;

use crate::error::FileError;
use std::fs;
use std::path::Path;

/// Write `bytes` to `path`, creating missing parent directories first.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), FileError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| FileError::output_write(dir, e))?;
    }
    fs::write(path, bytes).map_err(|e| FileError::output_write(path, e))
}
