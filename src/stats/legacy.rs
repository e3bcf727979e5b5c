use super::types::{percentage, sum_amounts, BudgetStats, ExpenseStats, SpendBucket};
use crate::models::{Budget, BudgetKind, Expense};

/// Fold expenses and flat budgets into per-category and per-room buckets.
///
/// The two maps are independent: every expense lands in both. The overall
/// budget is the amount of the most recently created `global` row, zero if
/// there is none.
pub(crate) fn compute_expense_stats(expenses: &[Expense], budgets: &[Budget]) -> ExpenseStats {
    let mut stats = ExpenseStats::default();

    for budget in budgets {
        let (map, key) = match budget.kind {
            BudgetKind::Category => (&mut stats.by_category, budget.category.as_ref()),
            BudgetKind::Room => (&mut stats.by_room, budget.room.as_ref()),
            BudgetKind::Global => continue,
        };
        if let Some(key) = key {
            let bucket = map.entry(key.clone()).or_default();
            bucket.budget = bucket.budget.saturating_add(budget.amount);
        }
    }

    for expense in expenses {
        for bucket in [
            stats.by_category.entry(expense.category.clone()).or_default(),
            stats.by_room.entry(expense.room.clone()).or_default(),
        ] {
            bucket.spent = bucket.spent.saturating_add(expense.amount);
        }
    }

    stats.total_spent = sum_amounts(expenses.iter().map(|e| e.amount));
    stats.total_budget = latest_global(budgets).map(|b| b.amount).unwrap_or_default();
    stats.remaining_budget = stats.total_budget.saturating_sub(stats.total_spent);
    stats.budget_used_percentage = percentage(stats.total_spent, stats.total_budget);
    stats
}

fn latest_global(budgets: &[Budget]) -> Option<&Budget> {
    budgets
        .iter()
        .filter(|b| b.kind == BudgetKind::Global)
        .fold(None, |best: Option<&Budget>, b| match best {
            Some(cur) if cur.created_at >= b.created_at => Some(cur),
            _ => Some(b),
        })
}

/// Flatten hierarchical stats into the legacy shape so dashboards can render
/// either source the same way.
pub(crate) fn legacy_view(stats: &BudgetStats) -> ExpenseStats {
    let mut view = ExpenseStats {
        total_spent: stats.total_spent,
        total_budget: stats.global_budget.total_amount,
        remaining_budget: stats.total_remaining,
        budget_used_percentage: stats.used_percentage(),
        ..ExpenseStats::default()
    };

    for room in &stats.rooms {
        for category in &room.categories {
            let bucket = view.by_category.entry(category.category.clone()).or_default();
            bucket.spent = bucket.spent.saturating_add(category.spent);
            bucket.budget = bucket.budget.saturating_add(category.allocated);
        }
        view.by_room.insert(
            room.room.clone(),
            SpendBucket {
                spent: room.spent,
                budget: room.allocated,
            },
        );
    }
    view
}
