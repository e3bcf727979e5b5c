use rust_decimal::Decimal;

use super::format::{format_amount, format_percentage, truncate};
use crate::stats::{
    BreakdownRow, BudgetStats, BudgetStatus, CategoryStats, ExpenseStats, FlatBudgetStats,
    RoomStats,
};

const RULE: usize = 72;

pub(crate) fn print_budget_stats(stats: &BudgetStats) {
    let budget = &stats.global_budget;
    println!("{} (budget #{})", budget.name, budget.id.unwrap_or(0));
    println!("{}", "─".repeat(RULE));
    print_totals(
        budget.total_amount,
        stats.total_allocated,
        stats.unallocated_amount,
        stats.total_spent,
        stats.total_remaining,
    );

    if stats.rooms.is_empty() {
        println!();
        println!("No room allocations");
        return;
    }
    for room in &stats.rooms {
        println!();
        print_room(room);
    }
}

pub(crate) fn print_flat_stats(stats: &FlatBudgetStats) {
    let budget = &stats.global_budget;
    println!("{} (budget #{}, by category)", budget.name, budget.id.unwrap_or(0));
    println!("{}", "─".repeat(RULE));
    print_totals(
        budget.total_amount,
        stats.total_allocated,
        stats.unallocated_amount,
        stats.total_spent,
        stats.total_remaining,
    );

    println!();
    if stats.categories.is_empty() {
        println!("No category allocations");
        return;
    }
    for category in &stats.categories {
        print_category(category, "  ");
    }
}

pub(crate) fn print_expense_stats(stats: &ExpenseStats) {
    println!("  Spent:      {}", format_amount(stats.total_spent));
    println!("  Budget:     {}", format_amount(stats.total_budget));
    println!("  Remaining:  {}", format_amount(stats.remaining_budget));
    println!(
        "  Used:       {} ({})",
        format_percentage(stats.budget_used_percentage),
        stats.status().label()
    );

    let by_category = stats.category_breakdown();
    if !by_category.is_empty() {
        println!();
        println!("By category:");
        print_breakdown(&by_category);
    }

    let by_room = stats.room_breakdown();
    if !by_room.is_empty() {
        println!();
        println!("By room:");
        print_breakdown(&by_room);
    }
}

fn print_totals(
    total: Decimal,
    allocated: Decimal,
    unallocated: Decimal,
    spent: Decimal,
    remaining: Decimal,
) {
    let used = crate::stats::percentage(spent, total);
    println!("  Budget:       {}", format_amount(total));
    println!("  Allocated:    {}", format_amount(allocated));
    println!("  Unallocated:  {}", format_amount(unallocated));
    println!("  Spent:        {}", format_amount(spent));
    println!("  Remaining:    {}", format_amount(remaining));
    println!(
        "  Used:         {} ({})",
        format_percentage(used),
        BudgetStatus::from_percentage(used).label()
    );
}

fn print_room(room: &RoomStats) {
    println!(
        "{:<26} {:>15} / {:>15}  {:>7}  {}",
        truncate(&room.room, 26),
        format_amount(room.spent),
        format_amount(room.allocated),
        format_percentage(room.percentage),
        room.status().label(),
    );
    for category in &room.categories {
        print_category(category, "    ");
    }
}

fn print_category(category: &CategoryStats, indent: &str) {
    let width = 26 - indent.len();
    println!(
        "{indent}{:<width$} {:>15} / {:>15}  {:>7}  {}",
        truncate(&category.category, width),
        format_amount(category.spent),
        format_amount(category.allocated),
        format_percentage(category.percentage),
        category.status().label(),
    );
}

fn print_breakdown(rows: &[BreakdownRow]) {
    for row in rows {
        let over = if row.over_budget > Decimal::ZERO {
            format!("  over by {}", format_amount(row.over_budget))
        } else {
            String::new()
        };
        println!(
            "  {:<24} {:>15}  {:>6} of spend  budget {}{over}",
            truncate(&row.name, 24),
            format_amount(row.spent),
            format_percentage(row.share_of_total),
            format_amount(row.budget),
        );
    }
}
