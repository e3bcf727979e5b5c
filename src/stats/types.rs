use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::GlobalBudget;

/// `spent / allocated * 100`, or zero when nothing was allocated. A ratio
/// too large for `Decimal` saturates at `Decimal::MAX` (`MIN` if negative).
pub(crate) fn percentage(spent: Decimal, allocated: Decimal) -> Decimal {
    if allocated <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    spent
        .checked_div(allocated)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if spent.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Saturating sum of amounts.
pub(crate) fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BudgetStatus {
    OnTrack,
    Warning,
    OverBudget,
}

impl BudgetStatus {
    pub(crate) fn from_percentage(pct: Decimal) -> Self {
        if pct > Decimal::ONE_HUNDRED {
            Self::OverBudget
        } else if pct > Decimal::from(80) {
            Self::Warning
        } else {
            Self::OnTrack
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::OnTrack => "on track",
            Self::Warning => "warning",
            Self::OverBudget => "over budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryStats {
    pub(crate) category: String,
    pub(crate) allocated: Decimal,
    pub(crate) spent: Decimal,
    pub(crate) remaining: Decimal,
    pub(crate) percentage: Decimal,
}

impl CategoryStats {
    pub(crate) fn new(category: String, allocated: Decimal, spent: Decimal) -> Self {
        Self {
            category,
            allocated,
            spent,
            remaining: allocated.saturating_sub(spent),
            percentage: percentage(spent, allocated),
        }
    }

    pub(crate) fn status(&self) -> BudgetStatus {
        BudgetStatus::from_percentage(self.percentage)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoomStats {
    pub(crate) room: String,
    pub(crate) allocated: Decimal,
    pub(crate) spent: Decimal,
    pub(crate) remaining: Decimal,
    pub(crate) percentage: Decimal,
    pub(crate) categories: Vec<CategoryStats>,
}

impl RoomStats {
    pub(crate) fn new(
        room: String,
        allocated: Decimal,
        spent: Decimal,
        categories: Vec<CategoryStats>,
    ) -> Self {
        Self {
            room,
            allocated,
            spent,
            remaining: allocated.saturating_sub(spent),
            percentage: percentage(spent, allocated),
            categories,
        }
    }

    pub(crate) fn status(&self) -> BudgetStatus {
        BudgetStatus::from_percentage(self.percentage)
    }

    #[cfg(test)]
    pub(crate) fn category(&self, name: &str) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.category == name)
    }
}

/// Two-level statistics: global budget → rooms → categories.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetStats {
    pub(crate) global_budget: GlobalBudget,
    pub(crate) total_allocated: Decimal,
    pub(crate) total_spent: Decimal,
    pub(crate) total_remaining: Decimal,
    pub(crate) unallocated_amount: Decimal,
    pub(crate) rooms: Vec<RoomStats>,
}

impl BudgetStats {
    #[cfg(test)]
    pub(crate) fn room(&self, name: &str) -> Option<&RoomStats> {
        self.rooms.iter().find(|r| r.room == name)
    }

    pub(crate) fn used_percentage(&self) -> Decimal {
        percentage(self.total_spent, self.global_budget.total_amount)
    }
}

/// Single-level statistics: global budget → categories.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlatBudgetStats {
    pub(crate) global_budget: GlobalBudget,
    pub(crate) total_allocated: Decimal,
    pub(crate) total_spent: Decimal,
    pub(crate) total_remaining: Decimal,
    pub(crate) unallocated_amount: Decimal,
    pub(crate) categories: Vec<CategoryStats>,
}

impl FlatBudgetStats {
    #[cfg(test)]
    pub(crate) fn category(&self, name: &str) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.category == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SpendBucket {
    pub(crate) spent: Decimal,
    pub(crate) budget: Decimal,
}

/// Dual-indexed spend summary: an expense counts once under its category
/// and once under its room.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ExpenseStats {
    pub(crate) total_spent: Decimal,
    pub(crate) total_budget: Decimal,
    pub(crate) remaining_budget: Decimal,
    pub(crate) budget_used_percentage: Decimal,
    pub(crate) by_category: BTreeMap<String, SpendBucket>,
    pub(crate) by_room: BTreeMap<String, SpendBucket>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BreakdownRow {
    pub(crate) name: String,
    pub(crate) spent: Decimal,
    pub(crate) budget: Decimal,
    /// Share of the overall spend, in percent.
    pub(crate) share_of_total: Decimal,
    pub(crate) over_budget: Decimal,
}

impl ExpenseStats {
    pub(crate) fn status(&self) -> BudgetStatus {
        BudgetStatus::from_percentage(self.budget_used_percentage)
    }

    pub(crate) fn category_breakdown(&self) -> Vec<BreakdownRow> {
        breakdown(&self.by_category, self.total_spent)
    }

    pub(crate) fn room_breakdown(&self) -> Vec<BreakdownRow> {
        breakdown(&self.by_room, self.total_spent)
    }
}

fn breakdown(map: &BTreeMap<String, SpendBucket>, total_spent: Decimal) -> Vec<BreakdownRow> {
    let mut rows: Vec<BreakdownRow> = map
        .iter()
        .filter(|(_, b)| b.spent > Decimal::ZERO || b.budget > Decimal::ZERO)
        .map(|(name, b)| BreakdownRow {
            name: name.clone(),
            spent: b.spent,
            budget: b.budget,
            share_of_total: percentage(b.spent, total_spent),
            over_budget: b.spent.saturating_sub(b.budget).max(Decimal::ZERO),
        })
        .collect();
    // BTreeMap iteration is name-ordered and sort_by is stable, so ties stay alphabetical.
    rows.sort_by(|a, b| b.spent.cmp(&a.spent));
    rows
}
