use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use super::parse::{parse_amount, parse_date};
use crate::models::Expense;

/// Column positions resolved from the header row.
#[derive(Debug)]
struct ColumnMap {
    date: usize,
    amount: usize,
    category: usize,
    room: usize,
    supplier: usize,
    description: usize,
    invoice_url: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).with_context(|| format!("CSV is missing the '{name}' column"))
        };
        Ok(Self {
            date: require("date")?,
            amount: require("amount")?,
            category: require("category")?,
            room: require("room")?,
            supplier: require("supplier")?,
            description: require("description")?,
            invoice_url: find("invoice_url"),
        })
    }
}

pub(crate) fn read_expenses(path: &Path) -> Result<Vec<Expense>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    parse_expenses(file)
}

/// Parse expenses from CSV with a header row. Columns are matched by name,
/// so their order does not matter. Blank lines are skipped; any other bad
/// row fails the whole parse.
pub(crate) fn parse_expenses<R: Read>(reader: R) -> Result<Vec<Expense>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut expenses = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // Line 1 is the header
        let line = i + 2;
        let record = result.with_context(|| format!("Line {line}: failed to read CSV record"))?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();

        let date = parse_date(&field(columns.date)).with_context(|| format!("Line {line}"))?;
        let amount = parse_amount(&field(columns.amount)).with_context(|| format!("Line {line}"))?;

        let expense = Expense::new(
            date,
            amount,
            field(columns.category),
            field(columns.room),
            field(columns.supplier),
            field(columns.description),
        )
        .with_invoice(columns.invoice_url.map(field));

        expense.validate().with_context(|| format!("Line {line}"))?;
        expenses.push(expense);
    }

    Ok(expenses)
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
