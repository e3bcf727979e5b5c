//! Spend-vs-budget aggregation. Everything here is pure: inputs are borrowed,
//! never mutated, and each call builds a fresh result.

mod filter;
mod hierarchy;
mod legacy;
mod types;

pub(crate) use filter::ExpenseFilter;
pub(crate) use hierarchy::{compute_budget_stats, compute_flat_budget_stats, select_active_budget};
pub(crate) use legacy::{compute_expense_stats, legacy_view};
pub(crate) use types::{
    percentage, BreakdownRow, BudgetStats, BudgetStatus, CategoryStats, ExpenseStats,
    FlatBudgetStats, RoomStats,
};
