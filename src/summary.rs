//! Transaction summary table appended to the filled complaint.

use crate::docx::{Cell, Document, Table};
use crate::error::{Error, Result};
use crate::replacements::ReplacementMap;
use crate::style::{SUMMARY_CELL, style_first_run};
use tracing::debug;

/// Column headers of the summary table.
pub const SUMMARY_HEADERS: [&str; 5] = [
    "Bank Name Letter",
    "Account No & IFSC",
    "Transaction ID",
    "Fraud Amount",
    "Transaction Date",
];

/// Placeholders whose values fill the data row, column by column.
pub const SUMMARY_KEYS: [&str; 5] = [
    "{{Bank_Name_letter}}",
    "{{ACC_No_IFSC}}",
    "{{Txn_ID}}",
    "{{Fraud_amount}}",
    "{{Txn_date}}",
];

const COLUMNS: usize = SUMMARY_HEADERS.len();

/// Append the summary table at the end of the document body.
///
/// The table has a header row and one data row taken from `map`; a key
/// missing from `map` leaves its cell empty. Data cells are styled like the
/// transaction details of the letter.
pub fn build_summary_table(doc: &mut Document, map: &ReplacementMap) -> Result<()> {
    let mut table = Table::new(COLUMNS);

    let header = table.add_row(COLUMNS);
    for (cell, label) in header.cells_mut().zip(SUMMARY_HEADERS) {
        cell.set_text(label);
    }

    let data = table.add_row(COLUMNS);
    for (cell, key) in data.cells_mut().zip(SUMMARY_KEYS) {
        cell.set_text(map.get(key).unwrap_or_default());
        style_data_cell(cell)?;
    }

    doc.add_table(table);
    debug!(columns = COLUMNS, "appended summary table");
    Ok(())
}

fn style_data_cell(cell: &mut Cell) -> Result<()> {
    let para = cell
        .first_paragraph_mut()
        .ok_or_else(|| Error::StyleApplication("summary cell has no paragraph".to_string()))?;
    style_first_run(para, &SUMMARY_CELL)
}
