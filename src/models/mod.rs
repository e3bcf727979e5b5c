mod allocation;
mod budget;
pub mod catalog;
mod expense;

use anyhow::Result;
use rust_decimal::Decimal;

pub use allocation::{AllocationParent, CategoryAllocation, GlobalBudget, RoomAllocation};
pub use budget::{Budget, BudgetKind};
pub use expense::Expense;

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("Missing required field: {field}");
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        anyhow::bail!("{field} cannot be negative (got {value})");
    }
    Ok(())
}
