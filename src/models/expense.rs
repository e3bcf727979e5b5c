use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::require_text;

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub room: String,
    pub supplier: String,
    pub description: String,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        category: String,
        room: String,
        supplier: String,
        description: String,
    ) -> Self {
        Self {
            id: None,
            date,
            amount,
            category,
            room,
            supplier,
            description,
            invoice_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_invoice(mut self, url: Option<String>) -> Self {
        self.invoice_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Required-field checks applied before a row reaches the store.
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            anyhow::bail!("Amount must be greater than 0 (got {})", self.amount);
        }
        require_text("category", &self.category)?;
        require_text("room", &self.room)?;
        require_text("supplier", &self.supplier)?;
        require_text("description", &self.description)?;
        Ok(())
    }

    /// Case-insensitive substring match over the free-text fields.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.description, &self.supplier, &self.category, &self.room]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
