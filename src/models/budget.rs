use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{require_non_negative, require_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    Global,
    Category,
    Room,
}

impl BudgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Category => "category",
            Self::Room => "room",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "global" => Some(Self::Global),
            "category" => Some(Self::Category),
            "room" => Some(Self::Room),
            _ => None,
        }
    }
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flat budget row used when no hierarchical budget has been set up.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: Option<i64>,
    pub kind: BudgetKind,
    pub name: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub room: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(kind: BudgetKind, name: String, amount: Decimal) -> Self {
        Self {
            id: None,
            kind,
            name,
            amount,
            category: None,
            room: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_category(name: String, category: String, amount: Decimal) -> Self {
        Self {
            category: Some(category),
            ..Self::new(BudgetKind::Category, name, amount)
        }
    }

    pub fn for_room(name: String, room: String, amount: Decimal) -> Self {
        Self {
            room: Some(room),
            ..Self::new(BudgetKind::Room, name, amount)
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_non_negative("amount", self.amount)?;
        match self.kind {
            BudgetKind::Category => require_text("category", self.category.as_deref().unwrap_or("")),
            BudgetKind::Room => require_text("room", self.room.as_deref().unwrap_or("")),
            BudgetKind::Global => Ok(()),
        }
    }
}
