//! Read-side seam between the store and the aggregator. Loaders fetch the
//! full collections, then hand them to the pure functions in `stats`.

use anyhow::Result;
use tracing::{debug, warn};

use crate::models::{AllocationParent, Budget, CategoryAllocation, Expense, GlobalBudget, RoomAllocation};
use crate::stats::{self, BudgetStats, ExpenseStats, FlatBudgetStats};

pub(crate) trait Repository {
    fn list_expenses(&self) -> Result<Vec<Expense>>;
    fn list_global_budgets(&self) -> Result<Vec<GlobalBudget>>;
    fn list_room_allocations(&self, global_budget_id: Option<i64>) -> Result<Vec<RoomAllocation>>;
    fn list_category_allocations(
        &self,
        parent: Option<AllocationParent>,
    ) -> Result<Vec<CategoryAllocation>>;
    /// Flat budgets of the legacy layout.
    fn list_budgets(&self) -> Result<Vec<Budget>>;
}

/// `Ok(None)` when no global budget has this id.
pub(crate) fn load_budget_stats<R: Repository + ?Sized>(
    repo: &R,
    global_budget_id: i64,
) -> Result<Option<BudgetStats>> {
    let budgets = repo.list_global_budgets()?;
    if !budgets.iter().any(|b| b.id == Some(global_budget_id)) {
        warn!(global_budget_id, "global budget not found");
        return Ok(None);
    }

    let rooms = repo.list_room_allocations(Some(global_budget_id))?;
    let categories = repo.list_category_allocations(None)?;
    let expenses = repo.list_expenses()?;
    debug!(
        global_budget_id,
        rooms = rooms.len(),
        categories = categories.len(),
        expenses = expenses.len(),
        "computing budget stats"
    );

    Ok(stats::compute_budget_stats(
        global_budget_id,
        &budgets,
        &expenses,
        &rooms,
        &categories,
    ))
}

pub(crate) fn load_flat_budget_stats<R: Repository + ?Sized>(
    repo: &R,
    global_budget_id: i64,
) -> Result<Option<FlatBudgetStats>> {
    let budgets = repo.list_global_budgets()?;
    if !budgets.iter().any(|b| b.id == Some(global_budget_id)) {
        warn!(global_budget_id, "global budget not found");
        return Ok(None);
    }

    let categories =
        repo.list_category_allocations(Some(AllocationParent::Global(global_budget_id)))?;
    let expenses = repo.list_expenses()?;
    debug!(
        global_budget_id,
        categories = categories.len(),
        expenses = expenses.len(),
        "computing flat budget stats"
    );

    Ok(stats::compute_flat_budget_stats(
        global_budget_id,
        &budgets,
        &expenses,
        &categories,
    ))
}

/// Stats for the most recently created global budget, if any exists.
pub(crate) fn load_active_budget_stats<R: Repository + ?Sized>(
    repo: &R,
) -> Result<Option<BudgetStats>> {
    let budgets = repo.list_global_budgets()?;
    let Some(active_id) = stats::select_active_budget(&budgets).and_then(|b| b.id) else {
        debug!("no global budget defined");
        return Ok(None);
    };
    load_budget_stats(repo, active_id)
}

pub(crate) fn load_expense_stats<R: Repository + ?Sized>(repo: &R) -> Result<ExpenseStats> {
    let expenses = repo.list_expenses()?;
    let budgets = repo.list_budgets()?;
    debug!(
        expenses = expenses.len(),
        budgets = budgets.len(),
        "computing legacy expense stats"
    );
    Ok(stats::compute_expense_stats(&expenses, &budgets))
}
