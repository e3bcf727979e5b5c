mod csv_export;
mod csv_import;
mod parse;

pub(crate) use csv_export::export_to_csv;
pub(crate) use csv_import::read_expenses;
pub(crate) use parse::{parse_amount, parse_date};

/// Column order used for export and expected (by name) on import.
pub(crate) const HEADERS: [&str; 7] = [
    "date",
    "amount",
    "category",
    "room",
    "supplier",
    "description",
    "invoice_url",
];
