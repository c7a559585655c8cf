//! Reading DataLogTool-style CSV exports (`Timestamp,Name,Value`).

pub mod parse;
pub mod row;

pub use parse::read_log_file;
pub use row::{LogFile, LogRow, Value};
