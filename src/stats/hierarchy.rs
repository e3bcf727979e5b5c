use rust_decimal::Decimal;

use super::types::{sum_amounts, BudgetStats, CategoryStats, FlatBudgetStats, RoomStats};
use crate::models::{AllocationParent, CategoryAllocation, Expense, GlobalBudget, RoomAllocation};

/// Build room → category statistics for one global budget.
///
/// Returns `None` when `global_budget_id` matches no budget; nothing else is
/// computed in that case. Missing allocations are fine and produce empty
/// breakdowns.
///
/// `total_spent` covers every expense passed in, including expenses whose
/// room has no allocation. Those never show up under a room node.
pub(crate) fn compute_budget_stats(
    global_budget_id: i64,
    budgets: &[GlobalBudget],
    expenses: &[Expense],
    room_allocations: &[RoomAllocation],
    category_allocations: &[CategoryAllocation],
) -> Option<BudgetStats> {
    let global_budget = find_budget(budgets, global_budget_id)?;

    let budget_rooms: Vec<&RoomAllocation> = room_allocations
        .iter()
        .filter(|r| r.global_budget_id == global_budget_id)
        .collect();

    let rooms: Vec<RoomStats> = budget_rooms
        .iter()
        .map(|allocation| room_stats(allocation, expenses, category_allocations))
        .collect();

    // Category allocations subdivide rooms, so only room amounts count here.
    let total_allocated = sum_amounts(budget_rooms.iter().map(|r| r.allocated_amount));
    let total_spent = sum_amounts(expenses.iter().map(|e| e.amount));

    Some(BudgetStats {
        total_allocated,
        total_spent,
        total_remaining: global_budget.total_amount.saturating_sub(total_spent),
        unallocated_amount: global_budget.total_amount.saturating_sub(total_allocated),
        global_budget: global_budget.clone(),
        rooms,
    })
}

/// Single-level variant: categories allocated directly against the global
/// budget, no room dimension.
pub(crate) fn compute_flat_budget_stats(
    global_budget_id: i64,
    budgets: &[GlobalBudget],
    expenses: &[Expense],
    category_allocations: &[CategoryAllocation],
) -> Option<FlatBudgetStats> {
    let global_budget = find_budget(budgets, global_budget_id)?;

    let allocations: Vec<&CategoryAllocation> = category_allocations
        .iter()
        .filter(|c| c.parent == AllocationParent::Global(global_budget_id))
        .collect();
    let all_expenses: Vec<&Expense> = expenses.iter().collect();

    let total_allocated = sum_amounts(allocations.iter().map(|c| c.allocated_amount));
    let total_spent = sum_amounts(expenses.iter().map(|e| e.amount));

    Some(FlatBudgetStats {
        total_allocated,
        total_spent,
        total_remaining: global_budget.total_amount.saturating_sub(total_spent),
        unallocated_amount: global_budget.total_amount.saturating_sub(total_allocated),
        global_budget: global_budget.clone(),
        categories: category_nodes(&allocations, &all_expenses),
    })
}

/// The budget a caller should analyse by default: latest `created_at`,
/// first one wins on ties.
pub(crate) fn select_active_budget(budgets: &[GlobalBudget]) -> Option<&GlobalBudget> {
    budgets.iter().fold(None, |best, b| match best {
        Some(cur) if cur.created_at >= b.created_at => Some(cur),
        _ => Some(b),
    })
}

fn find_budget(budgets: &[GlobalBudget], id: i64) -> Option<&GlobalBudget> {
    budgets.iter().find(|b| b.id == Some(id))
}

fn room_stats(
    allocation: &RoomAllocation,
    expenses: &[Expense],
    category_allocations: &[CategoryAllocation],
) -> RoomStats {
    let room_categories: Vec<&CategoryAllocation> = category_allocations
        .iter()
        .filter(|c| matches!(c.parent, AllocationParent::Room(id) if Some(id) == allocation.id))
        .collect();
    let room_expenses: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.room == allocation.room)
        .collect();

    let spent = sum_amounts(room_expenses.iter().map(|e| e.amount));

    RoomStats::new(
        allocation.room.clone(),
        allocation.allocated_amount,
        spent,
        category_nodes(&room_categories, &room_expenses),
    )
}

/// One node per allocation, then one zero-allocated node per category that
/// has spend but no allocation, in order of first appearance.
fn category_nodes(allocations: &[&CategoryAllocation], expenses: &[&Expense]) -> Vec<CategoryStats> {
    let mut nodes: Vec<CategoryStats> = allocations
        .iter()
        .map(|allocation| {
            let spent = sum_amounts(
                expenses
                    .iter()
                    .filter(|e| e.category == allocation.category)
                    .map(|e| e.amount),
            );
            CategoryStats::new(allocation.category.clone(), allocation.allocated_amount, spent)
        })
        .collect();

    let mut unallocated: Vec<(&str, Decimal)> = Vec::new();
    for expense in expenses {
        if allocations.iter().any(|a| a.category == expense.category) {
            continue;
        }
        match unallocated.iter_mut().find(|(name, _)| *name == expense.category) {
            Some((_, spent)) => *spent = spent.saturating_add(expense.amount),
            None => unallocated.push((expense.category.as_str(), expense.amount)),
        }
    }

    nodes.extend(
        unallocated
            .into_iter()
            .map(|(category, spent)| CategoryStats::new(category.to_string(), Decimal::ZERO, spent)),
    );
    nodes
}
