#![allow(clippy::unwrap_used)]

use super::*;
use crate::repository::{
    load_active_budget_stats, load_budget_stats, load_expense_stats, load_flat_budget_stats,
};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn make_expense(day: u32, room: &str, category: &str, amount: Decimal) -> Expense {
    Expense::new(
        date(2024, 3, day),
        amount,
        category.into(),
        room.into(),
        "Brico Dépôt".into(),
        format!("{category} {room}"),
    )
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_empty() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.list_expenses().unwrap().is_empty());
    assert!(db.list_global_budgets().unwrap().is_empty());
    assert!(db.list_room_allocations(None).unwrap().is_empty());
    assert!(db.list_category_allocations(None).unwrap().is_empty());
    assert!(db.list_budgets().unwrap().is_empty());
}

#[test]
fn test_open_file_database_twice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reno.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_expense(&make_expense(1, "Salon", "Peinture", dec!(45)))
            .unwrap();
    }
    // Reopening must not re-run the schema or lose rows
    let db = Database::open(&path).unwrap();
    assert_eq!(db.list_expenses().unwrap().len(), 1);
}

// ── Expense CRUD ──────────────────────────────────────────────

#[test]
fn test_expense_crud() {
    let db = Database::open_in_memory().unwrap();
    let expense = make_expense(4, "Cuisine", "Plomberie", dec!(129.99))
        .with_invoice(Some("https://factures.test/42.pdf".into()));
    let id = db.insert_expense(&expense).unwrap();
    assert!(id > 0);

    let mut fetched = db.get_expense_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.amount, dec!(129.99));
    assert_eq!(fetched.date, date(2024, 3, 4));
    assert_eq!(fetched.invoice_url.as_deref(), Some("https://factures.test/42.pdf"));

    fetched.amount = dec!(140);
    fetched.supplier = "Point P".into();
    db.update_expense(&fetched).unwrap();
    let updated = db.get_expense_by_id(id).unwrap().unwrap();
    assert_eq!(updated.amount, dec!(140));
    assert_eq!(updated.supplier, "Point P");

    db.delete_expense(id).unwrap();
    assert!(db.get_expense_by_id(id).unwrap().is_none());
}

#[test]
fn test_expense_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(db.get_expense_by_id(404).unwrap().is_none());
    assert!(db.delete_expense(404).is_err());

    let mut ghost = make_expense(1, "Salon", "Peinture", dec!(1));
    ghost.id = Some(404);
    assert!(db.update_expense(&ghost).is_err());
}

#[test]
fn test_invalid_expense_rejected() {
    let db = Database::open_in_memory().unwrap();
    assert!(db
        .insert_expense(&make_expense(1, "Salon", "Peinture", Decimal::ZERO))
        .is_err());
    assert!(db
        .insert_expense(&make_expense(1, "", "Peinture", dec!(10)))
        .is_err());
    assert!(db.list_expenses().unwrap().is_empty());
}

#[test]
fn test_update_without_id_fails() {
    let db = Database::open_in_memory().unwrap();
    let expense = make_expense(1, "Salon", "Peinture", dec!(10));
    assert!(db.update_expense(&expense).is_err());
}

#[test]
fn test_expenses_sorted_newest_first() {
    let db = Database::open_in_memory().unwrap();
    db.insert_expense(&make_expense(2, "Salon", "Peinture", dec!(10)))
        .unwrap();
    db.insert_expense(&make_expense(20, "Salon", "Peinture", dec!(20)))
        .unwrap();
    db.insert_expense(&make_expense(9, "Salon", "Peinture", dec!(30)))
        .unwrap();

    let days: Vec<NaiveDate> = db.list_expenses().unwrap().iter().map(|e| e.date).collect();
    assert_eq!(days, vec![date(2024, 3, 20), date(2024, 3, 9), date(2024, 3, 2)]);
}

#[test]
fn test_batch_insert_is_all_or_nothing() {
    let mut db = Database::open_in_memory().unwrap();
    let good = vec![
        make_expense(1, "Salon", "Peinture", dec!(10)),
        make_expense(2, "Cuisine", "Plomberie", dec!(20)),
    ];
    assert_eq!(db.insert_expenses_batch(&good).unwrap(), 2);

    let mixed = vec![
        make_expense(3, "Salon", "Peinture", dec!(10)),
        make_expense(4, "Salon", "Peinture", dec!(-1)),
    ];
    let err = db.insert_expenses_batch(&mixed).unwrap_err();
    assert!(err.to_string().contains("#2"));
    assert_eq!(db.list_expenses().unwrap().len(), 2);
}

#[test]
fn test_decimal_precision_preserved() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_expense(&make_expense(1, "Salon", "Peinture", dec!(0.10)))
        .unwrap();
    db.insert_expense(&make_expense(1, "Salon", "Peinture", dec!(0.20)))
        .unwrap();
    let total: Decimal = db.list_expenses().unwrap().iter().map(|e| e.amount).sum();
    assert_eq!(total, dec!(0.30));
    assert_eq!(db.get_expense_by_id(id).unwrap().unwrap().amount, dec!(0.10));
}

#[test]
fn test_corrupt_amount_is_an_error() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_expense(&make_expense(1, "Salon", "Peinture", dec!(10)))
        .unwrap();
    db.conn
        .execute("UPDATE expenses SET amount = 'dix euros' WHERE id = ?1", params![id])
        .unwrap();
    assert!(db.list_expenses().is_err());
    assert!(db.get_expense_by_id(id).is_err());
}

// ── Hierarchical budgets ──────────────────────────────────────

#[test]
fn test_global_budget_crud() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_global_budget(&GlobalBudget::new("Appartement".into(), dec!(25000)))
        .unwrap();

    let mut budget = db.get_global_budget_by_id(id).unwrap().unwrap();
    assert_eq!(budget.total_amount, dec!(25000));
    let created = budget.created_at;

    budget.total_amount = dec!(30000);
    budget.name = "Appartement Lyon".into();
    db.update_global_budget(&budget).unwrap();
    let updated = db.get_global_budget_by_id(id).unwrap().unwrap();
    assert_eq!(updated.total_amount, dec!(30000));
    assert_eq!(updated.name, "Appartement Lyon");
    assert!(updated.updated_at >= created);

    db.delete_global_budget(id).unwrap();
    assert!(db.get_global_budget_by_id(id).unwrap().is_none());
}

#[test]
fn test_room_allocation_requires_existing_budget() {
    let db = Database::open_in_memory().unwrap();
    let orphan = RoomAllocation::new(77, "Cuisine".into(), dec!(100));
    assert!(db.insert_room_allocation(&orphan).is_err());
}

#[test]
fn test_room_and_category_allocation_crud() {
    let db = Database::open_in_memory().unwrap();
    let budget_id = db
        .insert_global_budget(&GlobalBudget::new("Maison".into(), dec!(10000)))
        .unwrap();
    let room_id = db
        .insert_room_allocation(&RoomAllocation::new(budget_id, "Cuisine".into(), dec!(4000)))
        .unwrap();
    let cat_id = db
        .insert_category_allocation(&CategoryAllocation::new(
            AllocationParent::Room(room_id),
            "Plomberie".into(),
            dec!(1000),
        ))
        .unwrap();

    let mut room = db.get_room_allocation_by_id(room_id).unwrap().unwrap();
    assert_eq!(room.global_budget_id, budget_id);
    room.allocated_amount = dec!(4500);
    db.update_room_allocation(&room).unwrap();
    assert_eq!(
        db.get_room_allocation_by_id(room_id)
            .unwrap()
            .unwrap()
            .allocated_amount,
        dec!(4500)
    );

    let mut cat = db.get_category_allocation_by_id(cat_id).unwrap().unwrap();
    assert_eq!(cat.parent, AllocationParent::Room(room_id));
    cat.category = "Électricité".into();
    db.update_category_allocation(&cat).unwrap();
    let cat = db.get_category_allocation_by_id(cat_id).unwrap().unwrap();
    assert_eq!(cat.category, "Électricité");

    db.delete_category_allocation(cat_id).unwrap();
    assert!(db.get_category_allocation_by_id(cat_id).unwrap().is_none());
    db.delete_room_allocation(room_id).unwrap();
    assert!(db.get_room_allocation_by_id(room_id).unwrap().is_none());
}

#[test]
fn test_list_allocations_filtered_by_parent() {
    let db = Database::open_in_memory().unwrap();
    let b1 = db
        .insert_global_budget(&GlobalBudget::new("A".into(), dec!(1000)))
        .unwrap();
    let b2 = db
        .insert_global_budget(&GlobalBudget::new("B".into(), dec!(1000)))
        .unwrap();
    let r1 = db
        .insert_room_allocation(&RoomAllocation::new(b1, "Salon".into(), dec!(100)))
        .unwrap();
    db.insert_room_allocation(&RoomAllocation::new(b2, "Cave".into(), dec!(100)))
        .unwrap();
    db.insert_category_allocation(&CategoryAllocation::new(
        AllocationParent::Room(r1),
        "Peinture".into(),
        dec!(50),
    ))
    .unwrap();
    db.insert_category_allocation(&CategoryAllocation::new(
        AllocationParent::Global(b2),
        "Isolation".into(),
        dec!(70),
    ))
    .unwrap();

    assert_eq!(db.list_room_allocations(None).unwrap().len(), 2);
    let for_b1 = db.list_room_allocations(Some(b1)).unwrap();
    assert_eq!(for_b1.len(), 1);
    assert_eq!(for_b1[0].room, "Salon");

    assert_eq!(db.list_category_allocations(None).unwrap().len(), 2);
    let in_room = db
        .list_category_allocations(Some(AllocationParent::Room(r1)))
        .unwrap();
    assert_eq!(in_room.len(), 1);
    assert_eq!(in_room[0].category, "Peinture");
    let on_budget = db
        .list_category_allocations(Some(AllocationParent::Global(b2)))
        .unwrap();
    assert_eq!(on_budget.len(), 1);
    assert_eq!(on_budget[0].parent, AllocationParent::Global(b2));
}

#[test]
fn test_delete_budget_cascades() {
    let db = Database::open_in_memory().unwrap();
    let budget_id = db
        .insert_global_budget(&GlobalBudget::new("Maison".into(), dec!(10000)))
        .unwrap();
    let room_id = db
        .insert_room_allocation(&RoomAllocation::new(budget_id, "Cuisine".into(), dec!(4000)))
        .unwrap();
    db.insert_category_allocation(&CategoryAllocation::new(
        AllocationParent::Room(room_id),
        "Plomberie".into(),
        dec!(1000),
    ))
    .unwrap();
    db.insert_category_allocation(&CategoryAllocation::new(
        AllocationParent::Global(budget_id),
        "Peinture".into(),
        dec!(300),
    ))
    .unwrap();

    db.delete_global_budget(budget_id).unwrap();
    assert!(db.list_room_allocations(None).unwrap().is_empty());
    assert!(db.list_category_allocations(None).unwrap().is_empty());
}

#[test]
fn test_delete_room_cascades_to_categories_only() {
    let db = Database::open_in_memory().unwrap();
    let budget_id = db
        .insert_global_budget(&GlobalBudget::new("Maison".into(), dec!(10000)))
        .unwrap();
    let room_id = db
        .insert_room_allocation(&RoomAllocation::new(budget_id, "Cuisine".into(), dec!(4000)))
        .unwrap();
    db.insert_category_allocation(&CategoryAllocation::new(
        AllocationParent::Room(room_id),
        "Plomberie".into(),
        dec!(1000),
    ))
    .unwrap();

    db.delete_room_allocation(room_id).unwrap();
    assert!(db.list_category_allocations(None).unwrap().is_empty());
    assert!(db.get_global_budget_by_id(budget_id).unwrap().is_some());
}

#[test]
fn test_global_budgets_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let mut old = GlobalBudget::new("Ancien".into(), dec!(1));
    old.created_at -= Duration::days(30);
    db.insert_global_budget(&old).unwrap();
    db.insert_global_budget(&GlobalBudget::new("Récent".into(), dec!(2)))
        .unwrap();

    let names: Vec<String> = db
        .list_global_budgets()
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, vec!["Récent", "Ancien"]);
}

// ── Legacy budgets ────────────────────────────────────────────

#[test]
fn test_legacy_budget_insert_list_delete() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_budget(&Budget::for_category(
            "Plomberie".into(),
            "Plomberie".into(),
            dec!(800),
        ))
        .unwrap();
    db.insert_budget(&Budget::new(BudgetKind::Global, "Total".into(), dec!(9000)))
        .unwrap();

    let budgets = db.list_budgets().unwrap();
    assert_eq!(budgets.len(), 2);
    let plumbing = budgets.iter().find(|b| b.id == Some(id)).unwrap();
    assert_eq!(plumbing.kind, BudgetKind::Category);
    assert_eq!(plumbing.category.as_deref(), Some("Plomberie"));
    assert!(plumbing.room.is_none());

    db.delete_budget(id).unwrap();
    assert_eq!(db.list_budgets().unwrap().len(), 1);
    assert!(db.delete_budget(id).is_err());
}

// ── Loaders over the store ────────────────────────────────────

fn seed_kitchen(db: &Database) -> i64 {
    let budget_id = db
        .insert_global_budget(&GlobalBudget::new("Maison".into(), dec!(10000)))
        .unwrap();
    let room_id = db
        .insert_room_allocation(&RoomAllocation::new(budget_id, "Cuisine".into(), dec!(4000)))
        .unwrap();
    db.insert_category_allocation(&CategoryAllocation::new(
        AllocationParent::Room(room_id),
        "Plomberie".into(),
        dec!(1000),
    ))
    .unwrap();
    budget_id
}

#[test]
fn test_load_budget_stats_end_to_end() {
    let db = Database::open_in_memory().unwrap();
    let budget_id = seed_kitchen(&db);
    db.insert_expense(&make_expense(1, "Cuisine", "Plomberie", dec!(600)))
        .unwrap();
    db.insert_expense(&make_expense(2, "Cuisine", "Peinture", dec!(200)))
        .unwrap();

    let stats = load_budget_stats(&db, budget_id).unwrap().unwrap();
    assert_eq!(stats.total_allocated, dec!(4000));
    assert_eq!(stats.total_spent, dec!(800));
    assert_eq!(stats.unallocated_amount, dec!(6000));

    let kitchen = stats.room("Cuisine").unwrap();
    assert_eq!(kitchen.spent, dec!(800));
    assert_eq!(kitchen.percentage, dec!(20));
    assert_eq!(kitchen.category("Plomberie").unwrap().percentage, dec!(60));
    assert_eq!(kitchen.category("Peinture").unwrap().remaining, dec!(-200));
}

#[test]
fn test_load_budget_stats_not_found() {
    let db = Database::open_in_memory().unwrap();
    seed_kitchen(&db);
    assert!(load_budget_stats(&db, 9999).unwrap().is_none());
    assert!(load_flat_budget_stats(&db, 9999).unwrap().is_none());
}

#[test]
fn test_load_active_budget_stats_picks_newest() {
    let db = Database::open_in_memory().unwrap();
    assert!(load_active_budget_stats(&db).unwrap().is_none());

    let mut old = GlobalBudget::new("Ancien".into(), dec!(1000));
    old.created_at -= Duration::days(10);
    db.insert_global_budget(&old).unwrap();
    let newest = db
        .insert_global_budget(&GlobalBudget::new("Actuel".into(), dec!(5000)))
        .unwrap();

    let stats = load_active_budget_stats(&db).unwrap().unwrap();
    assert_eq!(stats.global_budget.id, Some(newest));
    assert_eq!(stats.global_budget.total_amount, dec!(5000));
}

#[test]
fn test_load_flat_budget_stats() {
    let db = Database::open_in_memory().unwrap();
    let budget_id = db
        .insert_global_budget(&GlobalBudget::new("Studio".into(), dec!(3000)))
        .unwrap();
    db.insert_category_allocation(&CategoryAllocation::new(
        AllocationParent::Global(budget_id),
        "Peinture".into(),
        dec!(400),
    ))
    .unwrap();
    db.insert_expense(&make_expense(1, "Salon", "Peinture", dec!(100)))
        .unwrap();

    let stats = load_flat_budget_stats(&db, budget_id).unwrap().unwrap();
    assert_eq!(stats.total_allocated, dec!(400));
    assert_eq!(stats.unallocated_amount, dec!(2600));
    assert_eq!(stats.category("Peinture").unwrap().percentage, dec!(25));
}

#[test]
fn test_load_expense_stats_legacy() {
    let db = Database::open_in_memory().unwrap();
    db.insert_budget(&Budget::new(BudgetKind::Global, "Total".into(), dec!(2000)))
        .unwrap();
    db.insert_budget(&Budget::for_room("Salon".into(), "Salon".into(), dec!(500)))
        .unwrap();
    db.insert_expense(&make_expense(1, "Salon", "Peinture", dec!(250)))
        .unwrap();

    let stats = load_expense_stats(&db).unwrap();
    assert_eq!(stats.total_budget, dec!(2000));
    assert_eq!(stats.total_spent, dec!(250));
    assert_eq!(stats.budget_used_percentage, dec!(12.5));
    assert_eq!(stats.by_room["Salon"].budget, dec!(500));
    assert_eq!(stats.by_category["Peinture"].spent, dec!(250));
}
