mod schema;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::models::*;
use crate::repository::Repository;

const EXPENSE_COLUMNS: &str =
    "id, date, amount, category, room, supplier, description, invoice_url, created_at";
const GLOBAL_BUDGET_COLUMNS: &str = "id, name, total_amount, created_at, updated_at";
const ROOM_ALLOCATION_COLUMNS: &str =
    "id, global_budget_id, room, allocated_amount, created_at, updated_at";
const CATEGORY_ALLOCATION_COLUMNS: &str =
    "id, room_allocation_id, global_budget_id, category, allocated_amount, created_at, updated_at";
const BUDGET_COLUMNS: &str = "id, kind, name, amount, category, room, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            info!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            info!(from = current, to = schema::CURRENT_VERSION, "migrated schema");
        }

        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        expense.validate()?;
        self.conn.execute(
            "INSERT INTO expenses (date, amount, category, room, supplier, description, invoice_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                expense.date,
                expense.amount.to_string(),
                expense.category,
                expense.room,
                expense.supplier,
                expense.description,
                expense.invoice_url,
                expense.created_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, amount = %expense.amount, room = %expense.room, "expense added");
        Ok(id)
    }

    /// Insert every expense in one transaction; nothing is written if any row
    /// fails validation.
    pub(crate) fn insert_expenses_batch(&mut self, expenses: &[Expense]) -> Result<usize> {
        for (i, expense) in expenses.iter().enumerate() {
            expense
                .validate()
                .with_context(|| format!("Expense #{} is invalid", i + 1))?;
        }
        let tx = self.conn.transaction()?;
        for expense in expenses {
            tx.execute(
                "INSERT INTO expenses (date, amount, category, room, supplier, description, invoice_url, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    expense.date,
                    expense.amount.to_string(),
                    expense.category,
                    expense.room,
                    expense.supplier,
                    expense.description,
                    expense.invoice_url,
                    expense.created_at,
                ],
            )?;
        }
        tx.commit()?;
        info!(count = expenses.len(), "expenses imported");
        Ok(expenses.len())
    }

    pub(crate) fn get_expense_by_id(&self, id: i64) -> Result<Option<Expense>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"),
                params![id],
                expense_from_row,
            )
            .optional()?)
    }

    pub(crate) fn update_expense(&self, expense: &Expense) -> Result<()> {
        let id = expense.id.context("Cannot update an expense without an id")?;
        expense.validate()?;
        let changed = self.conn.execute(
            "UPDATE expenses SET date = ?1, amount = ?2, category = ?3, room = ?4,
                    supplier = ?5, description = ?6, invoice_url = ?7
             WHERE id = ?8",
            params![
                expense.date,
                expense.amount.to_string(),
                expense.category,
                expense.room,
                expense.supplier,
                expense.description,
                expense.invoice_url,
                id,
            ],
        )?;
        ensure_found(changed, "Expense", id)?;
        info!(id, "expense updated");
        Ok(())
    }

    pub(crate) fn delete_expense(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        ensure_found(changed, "Expense", id)?;
        info!(id, "expense deleted");
        Ok(())
    }

    // ── Global budgets ────────────────────────────────────────

    pub(crate) fn insert_global_budget(&self, budget: &GlobalBudget) -> Result<i64> {
        budget.validate()?;
        self.conn.execute(
            "INSERT INTO global_budgets (name, total_amount, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                budget.name,
                budget.total_amount.to_string(),
                budget.created_at,
                budget.updated_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, name = %budget.name, total = %budget.total_amount, "global budget created");
        Ok(id)
    }

    pub(crate) fn get_global_budget_by_id(&self, id: i64) -> Result<Option<GlobalBudget>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {GLOBAL_BUDGET_COLUMNS} FROM global_budgets WHERE id = ?1"),
                params![id],
                global_budget_from_row,
            )
            .optional()?)
    }

    pub(crate) fn update_global_budget(&self, budget: &GlobalBudget) -> Result<()> {
        let id = budget.id.context("Cannot update a budget without an id")?;
        budget.validate()?;
        let changed = self.conn.execute(
            "UPDATE global_budgets SET name = ?1, total_amount = ?2, updated_at = ?3 WHERE id = ?4",
            params![budget.name, budget.total_amount.to_string(), Utc::now(), id],
        )?;
        ensure_found(changed, "Global budget", id)?;
        info!(id, "global budget updated");
        Ok(())
    }

    /// Room and category allocations under the budget go with it.
    pub(crate) fn delete_global_budget(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM global_budgets WHERE id = ?1", params![id])?;
        ensure_found(changed, "Global budget", id)?;
        info!(id, "global budget deleted");
        Ok(())
    }

    // ── Room allocations ──────────────────────────────────────

    pub(crate) fn insert_room_allocation(&self, allocation: &RoomAllocation) -> Result<i64> {
        allocation.validate()?;
        self.conn
            .execute(
                "INSERT INTO room_allocations (global_budget_id, room, allocated_amount, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    allocation.global_budget_id,
                    allocation.room,
                    allocation.allocated_amount.to_string(),
                    allocation.created_at,
                    allocation.updated_at,
                ],
            )
            .with_context(|| {
                format!("Failed to allocate to global budget {}", allocation.global_budget_id)
            })?;
        let id = self.conn.last_insert_rowid();
        info!(id, room = %allocation.room, amount = %allocation.allocated_amount, "room allocation created");
        Ok(id)
    }

    pub(crate) fn get_room_allocation_by_id(&self, id: i64) -> Result<Option<RoomAllocation>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ROOM_ALLOCATION_COLUMNS} FROM room_allocations WHERE id = ?1"),
                params![id],
                room_allocation_from_row,
            )
            .optional()?)
    }

    pub(crate) fn update_room_allocation(&self, allocation: &RoomAllocation) -> Result<()> {
        let id = allocation
            .id
            .context("Cannot update a room allocation without an id")?;
        allocation.validate()?;
        let changed = self.conn.execute(
            "UPDATE room_allocations SET room = ?1, allocated_amount = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                allocation.room,
                allocation.allocated_amount.to_string(),
                Utc::now(),
                id
            ],
        )?;
        ensure_found(changed, "Room allocation", id)?;
        info!(id, "room allocation updated");
        Ok(())
    }

    /// Category allocations under the room go with it.
    pub(crate) fn delete_room_allocation(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM room_allocations WHERE id = ?1", params![id])?;
        ensure_found(changed, "Room allocation", id)?;
        info!(id, "room allocation deleted");
        Ok(())
    }

    // ── Category allocations ──────────────────────────────────

    pub(crate) fn insert_category_allocation(&self, allocation: &CategoryAllocation) -> Result<i64> {
        allocation.validate()?;
        self.conn
            .execute(
                "INSERT INTO category_allocations
                    (room_allocation_id, global_budget_id, category, allocated_amount, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    allocation.parent.room_allocation_id(),
                    allocation.parent.global_budget_id(),
                    allocation.category,
                    allocation.allocated_amount.to_string(),
                    allocation.created_at,
                    allocation.updated_at,
                ],
            )
            .with_context(|| format!("Failed to allocate under {}", allocation.parent))?;
        let id = self.conn.last_insert_rowid();
        info!(id, parent = %allocation.parent, category = %allocation.category, "category allocation created");
        Ok(id)
    }

    pub(crate) fn get_category_allocation_by_id(
        &self,
        id: i64,
    ) -> Result<Option<CategoryAllocation>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {CATEGORY_ALLOCATION_COLUMNS} FROM category_allocations WHERE id = ?1"
                ),
                params![id],
                category_allocation_from_row,
            )
            .optional()?)
    }

    pub(crate) fn update_category_allocation(&self, allocation: &CategoryAllocation) -> Result<()> {
        let id = allocation
            .id
            .context("Cannot update a category allocation without an id")?;
        allocation.validate()?;
        let changed = self.conn.execute(
            "UPDATE category_allocations SET category = ?1, allocated_amount = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                allocation.category,
                allocation.allocated_amount.to_string(),
                Utc::now(),
                id
            ],
        )?;
        ensure_found(changed, "Category allocation", id)?;
        info!(id, "category allocation updated");
        Ok(())
    }

    pub(crate) fn delete_category_allocation(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM category_allocations WHERE id = ?1", params![id])?;
        ensure_found(changed, "Category allocation", id)?;
        info!(id, "category allocation deleted");
        Ok(())
    }

    // ── Legacy budgets ────────────────────────────────────────

    pub(crate) fn insert_budget(&self, budget: &Budget) -> Result<i64> {
        budget.validate()?;
        self.conn.execute(
            "INSERT INTO budgets (kind, name, amount, category, room, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                budget.kind.as_str(),
                budget.name,
                budget.amount.to_string(),
                budget.category,
                budget.room,
                budget.created_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(id, kind = %budget.kind, "budget created");
        Ok(id)
    }

    pub(crate) fn delete_budget(&self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        ensure_found(changed, "Budget", id)?;
        info!(id, "budget deleted");
        Ok(())
    }

    fn query_all<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl Repository for Database {
    fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.query_all(
            &format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY date DESC, id DESC"),
            [],
            expense_from_row,
        )
        .context("Failed to load expenses")
    }

    fn list_global_budgets(&self) -> Result<Vec<GlobalBudget>> {
        self.query_all(
            &format!(
                "SELECT {GLOBAL_BUDGET_COLUMNS} FROM global_budgets ORDER BY created_at DESC, id DESC"
            ),
            [],
            global_budget_from_row,
        )
        .context("Failed to load global budgets")
    }

    fn list_room_allocations(&self, global_budget_id: Option<i64>) -> Result<Vec<RoomAllocation>> {
        let rows = match global_budget_id {
            Some(id) => self.query_all(
                &format!(
                    "SELECT {ROOM_ALLOCATION_COLUMNS} FROM room_allocations
                     WHERE global_budget_id = ?1 ORDER BY created_at DESC, id DESC"
                ),
                params![id],
                room_allocation_from_row,
            ),
            None => self.query_all(
                &format!(
                    "SELECT {ROOM_ALLOCATION_COLUMNS} FROM room_allocations ORDER BY created_at DESC, id DESC"
                ),
                [],
                room_allocation_from_row,
            ),
        };
        rows.context("Failed to load room allocations")
    }

    fn list_category_allocations(
        &self,
        parent: Option<AllocationParent>,
    ) -> Result<Vec<CategoryAllocation>> {
        let base = format!("SELECT {CATEGORY_ALLOCATION_COLUMNS} FROM category_allocations");
        let order = "ORDER BY created_at DESC, id DESC";
        let rows = match parent {
            Some(AllocationParent::Room(id)) => self.query_all(
                &format!("{base} WHERE room_allocation_id = ?1 {order}"),
                params![id],
                category_allocation_from_row,
            ),
            Some(AllocationParent::Global(id)) => self.query_all(
                &format!("{base} WHERE global_budget_id = ?1 {order}"),
                params![id],
                category_allocation_from_row,
            ),
            None => self.query_all(&format!("{base} {order}"), [], category_allocation_from_row),
        };
        rows.context("Failed to load category allocations")
    }

    fn list_budgets(&self) -> Result<Vec<Budget>> {
        self.query_all(
            &format!("SELECT {BUDGET_COLUMNS} FROM budgets ORDER BY created_at DESC, id DESC"),
            [],
            budget_from_row,
        )
        .context("Failed to load budgets")
    }
}

fn ensure_found(changed: usize, what: &str, id: i64) -> Result<()> {
    if changed == 0 {
        anyhow::bail!("{what} {id} not found");
    }
    Ok(())
}

/// Amounts are stored as text; anything that does not parse is a hard error.
fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: Some(row.get(0)?),
        date: row.get(1)?,
        amount: decimal_at(row, 2)?,
        category: row.get(3)?,
        room: row.get(4)?,
        supplier: row.get(5)?,
        description: row.get(6)?,
        invoice_url: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn global_budget_from_row(row: &Row<'_>) -> rusqlite::Result<GlobalBudget> {
    Ok(GlobalBudget {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        total_amount: decimal_at(row, 2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn room_allocation_from_row(row: &Row<'_>) -> rusqlite::Result<RoomAllocation> {
    Ok(RoomAllocation {
        id: Some(row.get(0)?),
        global_budget_id: row.get(1)?,
        room: row.get(2)?,
        allocated_amount: decimal_at(row, 3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn category_allocation_from_row(row: &Row<'_>) -> rusqlite::Result<CategoryAllocation> {
    let room_allocation_id: Option<i64> = row.get(1)?;
    let global_budget_id: Option<i64> = row.get(2)?;
    let parent = match (room_allocation_id, global_budget_id) {
        (Some(id), _) => AllocationParent::Room(id),
        (None, Some(id)) => AllocationParent::Global(id),
        (None, None) => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Null,
                "category allocation has no parent".into(),
            ))
        }
    };
    Ok(CategoryAllocation {
        id: Some(row.get(0)?),
        parent,
        category: row.get(3)?,
        allocated_amount: decimal_at(row, 4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let kind_str: String = row.get(1)?;
    let kind = BudgetKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            Type::Text,
            format!("unknown budget kind '{kind_str}'").into(),
        )
    })?;
    Ok(Budget {
        id: Some(row.get(0)?),
        kind,
        name: row.get(2)?,
        amount: decimal_at(row, 3)?,
        category: row.get(4)?,
        room: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests;
