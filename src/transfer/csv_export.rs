use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use super::HEADERS;
use crate::models::Expense;

/// Write expenses as CSV, header first. Returns the number of rows written.
pub(crate) fn write_expenses<W: Write>(writer: W, expenses: &[Expense]) -> Result<usize> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(HEADERS).context("Failed to write CSV header")?;
    for e in expenses {
        csv.write_record([
            e.date.format("%Y-%m-%d").to_string().as_str(),
            e.amount.to_string().as_str(),
            e.category.as_str(),
            e.room.as_str(),
            e.supplier.as_str(),
            e.description.as_str(),
            e.invoice_url.as_deref().unwrap_or(""),
        ])
        .with_context(|| format!("Failed to write expense {:?}", e.id))?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(expenses.len())
}

pub(crate) fn export_to_csv(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_expenses(file, expenses)
}
