use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a user-entered amount. Accepts `1234.56`, `1 234,56 €`,
/// `1,234.56`, `1.234,56`. A lone comma followed by exactly three digits
/// (`1,234`) could be either convention and is rejected.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€' && *c != '"')
        .collect();
    if cleaned.is_empty() {
        anyhow::bail!("Amount is empty");
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Both present: the rightmost one is the decimal separator
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(comma), None) if cleaned.matches(',').count() == 1 => {
            let decimals = &cleaned[comma + 1..];
            if decimals.len() == 3 && decimals.bytes().all(|b| b.is_ascii_digit()) {
                anyhow::bail!(
                    "Ambiguous amount '{s}': write 1234 (or 1,234.00) for thousands, 1.234 for a decimal"
                );
            }
            cleaned.replace(',', ".")
        }
        (Some(_), None) => cleaned.replace(',', ""),
        (None, _) => cleaned,
    };

    Decimal::from_str(&normalized).with_context(|| format!("Failed to parse '{s}' as an amount"))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    anyhow::bail!("Could not parse date: '{s}' (expected YYYY-MM-DD or DD/MM/YYYY)")
}
