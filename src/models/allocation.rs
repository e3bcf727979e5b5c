use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{require_non_negative, require_text};

/// Root of a budget hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalBudget {
    pub id: Option<i64>,
    pub name: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GlobalBudget {
    pub fn new(name: String, total_amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            total_amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_non_negative("total amount", self.total_amount)
    }
}

/// Portion of a global budget assigned to a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomAllocation {
    pub id: Option<i64>,
    pub global_budget_id: i64,
    pub room: String,
    pub allocated_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomAllocation {
    pub fn new(global_budget_id: i64, room: String, allocated_amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            global_budget_id,
            room,
            allocated_amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("room", &self.room)?;
        require_non_negative("allocated amount", self.allocated_amount)
    }
}

/// What a category allocation hangs off: a room allocation in the
/// hierarchical layout, or the global budget directly in the flat one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationParent {
    Room(i64),
    Global(i64),
}

impl AllocationParent {
    pub fn room_allocation_id(&self) -> Option<i64> {
        match self {
            Self::Room(id) => Some(*id),
            Self::Global(_) => None,
        }
    }

    pub fn global_budget_id(&self) -> Option<i64> {
        match self {
            Self::Global(id) => Some(*id),
            Self::Room(_) => None,
        }
    }
}

impl std::fmt::Display for AllocationParent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Room(id) => write!(f, "room #{id}"),
            Self::Global(id) => write!(f, "budget #{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAllocation {
    pub id: Option<i64>,
    pub parent: AllocationParent,
    pub category: String,
    pub allocated_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryAllocation {
    pub fn new(parent: AllocationParent, category: String, allocated_amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            parent,
            category,
            allocated_amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("category", &self.category)?;
        require_non_negative("allocated amount", self.allocated_amount)
    }
}
