#![allow(clippy::unwrap_used)]

use super::*;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::io::Write;

fn make_csv_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ── Header resolution ─────────────────────────────────────────

#[test]
fn test_parse_standard_header() {
    let csv = "date,amount,category,room,supplier,description,invoice_url\n\
               2024-03-01,120.50,Plomberie,Cuisine,Leroy Merlin,Robinet,https://x/1.pdf\n";
    let expenses = parse_expenses(csv.as_bytes()).unwrap();
    assert_eq!(expenses.len(), 1);
    let e = &expenses[0];
    assert_eq!(e.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(e.amount, dec!(120.50));
    assert_eq!(e.category, "Plomberie");
    assert_eq!(e.room, "Cuisine");
    assert_eq!(e.supplier, "Leroy Merlin");
    assert_eq!(e.description, "Robinet");
    assert_eq!(e.invoice_url.as_deref(), Some("https://x/1.pdf"));
    assert!(e.id.is_none());
}

#[test]
fn test_parse_reordered_and_case_insensitive_headers() {
    let csv = "Room,Description,Supplier,Category,Amount,Date\n\
               Salon,Peinture,Castorama,Peinture,\"1 234,56\",15/03/2024\n";
    let expenses = parse_expenses(csv.as_bytes()).unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].room, "Salon");
    assert_eq!(expenses[0].amount, dec!(1234.56));
    assert_eq!(expenses[0].date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert!(expenses[0].invoice_url.is_none());
}

#[test]
fn test_missing_required_column() {
    let csv = "date,amount,category,room,description\n2024-03-01,10,A,B,C\n";
    let err = parse_expenses(csv.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("supplier"));
}

// ── Row handling ──────────────────────────────────────────────

#[test]
fn test_blank_invoice_becomes_none() {
    let csv = "date,amount,category,room,supplier,description,invoice_url\n\
               2024-03-01,10,Plomberie,Cuisine,Brico,Joint,\n";
    let expenses = parse_expenses(csv.as_bytes()).unwrap();
    assert!(expenses[0].invoice_url.is_none());
}

#[test]
fn test_skips_empty_rows() {
    let csv = "date,amount,category,room,supplier,description\n\
               2024-03-01,10,Plomberie,Cuisine,Brico,Joint\n\
               ,,,,,\n\
               2024-03-02,20,Electricité,Salon,Brico,Prise\n";
    let expenses = parse_expenses(csv.as_bytes()).unwrap();
    assert_eq!(expenses.len(), 2);
}

#[test]
fn test_bad_amount_reports_line() {
    let csv = "date,amount,category,room,supplier,description\n\
               2024-03-01,10,Plomberie,Cuisine,Brico,Joint\n\
               2024-03-02,abc,Plomberie,Cuisine,Brico,Joint\n";
    let err = parse_expenses(csv.as_bytes()).unwrap_err();
    assert!(format!("{err:#}").contains("Line 3"));
}

#[test]
fn test_non_positive_amount_rejected() {
    let csv = "date,amount,category,room,supplier,description\n\
               2024-03-01,0,Plomberie,Cuisine,Brico,Joint\n";
    assert!(parse_expenses(csv.as_bytes()).is_err());
}

#[test]
fn test_missing_text_field_rejected() {
    let csv = "date,amount,category,room,supplier,description\n\
               2024-03-01,10,Plomberie,,Brico,Joint\n";
    let err = parse_expenses(csv.as_bytes()).unwrap_err();
    assert!(format!("{err:#}").contains("room"));
}

#[test]
fn test_header_only() {
    let csv = "date,amount,category,room,supplier,description\n";
    assert!(parse_expenses(csv.as_bytes()).unwrap().is_empty());
}

// ── Files ─────────────────────────────────────────────────────

#[test]
fn test_read_expenses_from_file() {
    let file = make_csv_file(
        "date,amount,category,room,supplier,description\n\
         2024-01-10,300,Menuiserie,Chambre,Atelier Bois,Placard\n\
         2024-01-11,45.90,Quincaillerie,Chambre,Brico,Vis\n",
    );
    let expenses = read_expenses(file.path()).unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[1].amount, dec!(45.90));
}

#[test]
fn test_read_missing_file() {
    let err = read_expenses(std::path::Path::new("/nonexistent/renotrack.csv")).unwrap_err();
    assert!(err.to_string().contains("Failed to open CSV file"));
}
