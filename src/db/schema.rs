pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS expenses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT NOT NULL,
    amount      TEXT NOT NULL,
    category    TEXT NOT NULL,
    room        TEXT NOT NULL,
    supplier    TEXT NOT NULL,
    description TEXT NOT NULL,
    invoice_url TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
CREATE INDEX IF NOT EXISTS idx_expenses_room ON expenses(room);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);

CREATE TABLE IF NOT EXISTS global_budgets (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    total_amount TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS room_allocations (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    global_budget_id INTEGER NOT NULL REFERENCES global_budgets(id) ON DELETE CASCADE,
    room             TEXT NOT NULL,
    allocated_amount TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_room_allocations_budget ON room_allocations(global_budget_id);

CREATE TABLE IF NOT EXISTS category_allocations (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    room_allocation_id INTEGER REFERENCES room_allocations(id) ON DELETE CASCADE,
    global_budget_id   INTEGER REFERENCES global_budgets(id) ON DELETE CASCADE,
    category           TEXT NOT NULL,
    allocated_amount   TEXT NOT NULL,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL,
    CHECK ((room_allocation_id IS NULL) <> (global_budget_id IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_category_allocations_room ON category_allocations(room_allocation_id);
CREATE INDEX IF NOT EXISTS idx_category_allocations_budget ON category_allocations(global_budget_id);

CREATE TABLE IF NOT EXISTS budgets (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    kind       TEXT NOT NULL CHECK (kind IN ('global', 'category', 'room')),
    name       TEXT NOT NULL,
    amount     TEXT NOT NULL,
    category   TEXT,
    room       TEXT,
    created_at TEXT NOT NULL
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
