//! Flat-file CSV export of the record set
//!
//! A convenience carried over from the batch flavor of the original tool:
//! dump every stored record to one CSV file for offline analysis. Not part
//! of the ingestion core; the store remains the source of truth.

use crate::storage::Store;
use crate::IngestError;
use std::io::Write;
use std::path::Path;

const CSV_HEADER: &str = "id,title,price,rating,availability,category,image";

/// Quotes a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Writes all stored records to a CSV file at `path`
///
/// Returns the number of records exported.
pub fn export_csv(store: &dyn Store, path: &Path) -> Result<u64, IngestError> {
    let records = store.list_all()?;

    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", CSV_HEADER)?;

    for record in &records {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            record.id,
            csv_field(&record.title),
            record.price,
            record.rating,
            csv_field(&record.availability),
            csv_field(&record.category),
            csv_field(&record.image),
        )?;
    }

    tracing::info!("Exported {} records to {}", records.len(), path.display());
    Ok(records.len() as u64)
}
