use crate::model::OutputTable;
use std::io;

pub const KEY_COLUMN: &str = "GenerationKey";

/// Serialize a generation table as CSV: `GenerationKey,<name>...`, one line per
/// generation in key order. Missing cells are empty fields.
pub fn table_to_csv(table: &OutputTable) -> io::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(table.names.len() + 1);
    header.push(KEY_COLUMN);
    header.extend(table.names.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for (key, cells) in &table.rows {
        let mut record = Vec::with_capacity(header.len());
        record.push(key.to_string());
        for name in &table.names {
            record.push(cells.get(name).cloned().unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }

    wtr.into_inner().map_err(|e| e.into_error())
}
