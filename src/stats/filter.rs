use rust_decimal::Decimal;

use super::types::sum_amounts;
use crate::models::Expense;

/// Narrow an expense list the way the expense screen does: free-text search
/// plus exact category and room matches. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExpenseFilter {
    pub(crate) search: Option<String>,
    pub(crate) category: Option<String>,
    pub(crate) room: Option<String>,
}

impl ExpenseFilter {
    pub(crate) fn matches(&self, expense: &Expense) -> bool {
        let search_ok = self
            .search
            .as_deref()
            .map_or(true, |s| expense.matches_search(s));
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| expense.category == c);
        let room_ok = self.room.as_deref().map_or(true, |r| expense.room == r);
        search_ok && category_ok && room_ok
    }

    pub(crate) fn apply<'a>(&self, expenses: &'a [Expense]) -> Vec<&'a Expense> {
        expenses.iter().filter(|e| self.matches(e)).collect()
    }

    pub(crate) fn total(&self, expenses: &[Expense]) -> Decimal {
        sum_amounts(
            expenses
                .iter()
                .filter(|e| self.matches(e))
                .map(|e| e.amount),
        )
    }
}
