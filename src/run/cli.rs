use anyhow::{Context, Result};
use std::path::Path;

use super::format::{format_amount, truncate};
use super::report;
use crate::db::Database;
use crate::models::{
    catalog, AllocationParent, Budget, BudgetKind, CategoryAllocation, Expense, GlobalBudget,
    RoomAllocation,
};
use crate::repository::{self, Repository};
use crate::stats::{self, ExpenseFilter};
use crate::transfer;

/// Flags that take no value.
const SWITCHES: &[&str] = &["--flat"];

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    let Some(command) = args.get(1) else {
        print_usage();
        return Ok(());
    };
    let rest = &args[2..];

    match command.as_str() {
        "add" => cli_add(rest, db),
        "expenses" | "ls" => cli_expenses(rest, db),
        "edit" => cli_edit(rest, db),
        "delete" | "rm" => cli_delete(rest, db),
        "budget" => cli_budget(rest, db),
        "room" => cli_room(rest, db),
        "alloc" => cli_alloc(rest, db),
        "legacy" => cli_legacy(rest, db),
        "stats" => cli_stats(rest, db),
        "summary" | "s" => cli_summary(db),
        "export" => cli_export(rest, db),
        "import" => cli_import(rest, db),
        "catalog" => {
            cli_catalog();
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("renotrack {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("RenoTrack: renovation expense and budget tracker");
    println!();
    println!("Usage: renotrack <command>");
    println!();
    println!("Expenses:");
    println!("  add --amount <n> --category <c> --room <r> --supplier <s> --description <d>");
    println!("      [--date <date>] [--invoice <url>]   Log an expense (date defaults to today)");
    println!("  expenses [--search <text>] [--category <c>] [--room <r>]");
    println!("                                        List expenses, newest first");
    println!("  edit <id> [--amount ..] [--category ..] [--room ..] [--supplier ..]");
    println!("      [--description ..] [--date ..] [--invoice ..]");
    println!("  delete <id>                           Delete an expense");
    println!();
    println!("Budgets:");
    println!("  budget new <name> <amount>            Create a global budget");
    println!("  budget list | edit <id> [--name ..] [--amount ..] | delete <id>");
    println!("  room new <budget-id> <room> <amount>  Allocate part of a budget to a room");
    println!("  room list [--budget <id>] | edit <id> [--room ..] [--amount ..] | delete <id>");
    println!("  alloc new (--room <id> | --budget <id>) <category> <amount>");
    println!("                                        Allocate to a category");
    println!("  alloc list [--room <id> | --budget <id>] | edit <id> [--category ..] [--amount ..]");
    println!("  alloc delete <id>");
    println!("  legacy new <global|category|room> <name> <amount> [--category <c>] [--room <r>]");
    println!("  legacy list | delete <id>             Flat budgets");
    println!();
    println!("Reports:");
    println!("  stats [budget-id] [--flat]            Spend against a global budget (default: latest)");
    println!("  summary                               Spend by category and room");
    println!("  export [path]                         Export expenses to CSV");
    println!("  import <file.csv>                     Import expenses from CSV");
    println!("  catalog                               Suggested categories and rooms");
    println!("  --help, -h                            Show this help");
    println!("  --version, -V                         Show version");
}

// ── Argument helpers ─────────────────────────────────────────

/// Value following `name`, if present.
fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn required<'a>(args: &'a [String], name: &str) -> Result<&'a str> {
    flag(args, name).ok_or_else(|| anyhow::anyhow!("Missing {name}"))
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !SWITCHES.contains(&arg.as_str()) {
                iter.next();
            }
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("Invalid id: '{raw}'"))
}

fn id_arg(args: &[String], usage: &str) -> Result<i64> {
    let pos = positionals(args);
    let raw = pos
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: {usage}"))?;
    parse_id(raw)
}

fn category_value(raw: &str) -> String {
    catalog::canonical(catalog::EXPENSE_CATEGORIES, raw)
        .map_or_else(|| raw.trim().to_string(), str::to_string)
}

fn room_value(raw: &str) -> String {
    catalog::canonical(catalog::ROOMS, raw).map_or_else(|| raw.trim().to_string(), str::to_string)
}

fn filter_from_flags(args: &[String]) -> ExpenseFilter {
    ExpenseFilter {
        search: flag(args, "--search").map(str::to_string),
        category: flag(args, "--category").map(category_value),
        room: flag(args, "--room").map(room_value),
    }
}

// ── Expenses ─────────────────────────────────────────────────

fn cli_add(args: &[String], db: &Database) -> Result<()> {
    let date = match flag(args, "--date") {
        Some(d) => transfer::parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let expense = Expense::new(
        date,
        transfer::parse_amount(required(args, "--amount")?)?,
        category_value(required(args, "--category")?),
        room_value(required(args, "--room")?),
        required(args, "--supplier")?.to_string(),
        required(args, "--description")?.to_string(),
    )
    .with_invoice(flag(args, "--invoice").map(str::to_string));

    let id = db.insert_expense(&expense)?;
    println!(
        "Added expense #{id}: {} ({} / {})",
        format_amount(expense.amount),
        expense.category,
        expense.room
    );
    Ok(())
}

fn cli_expenses(args: &[String], db: &Database) -> Result<()> {
    let filter = filter_from_flags(args);
    let expenses = db.list_expenses()?;
    let shown = filter.apply(&expenses);
    if shown.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!(
        "{:<5} {:<10} {:>15}  {:<16} {:<16} {:<18} Description",
        "ID", "Date", "Amount", "Category", "Room", "Supplier"
    );
    println!("{}", "─".repeat(100));
    for e in &shown {
        println!(
            "{:<5} {:<10} {:>15}  {:<16} {:<16} {:<18} {}",
            e.id.unwrap_or(0),
            e.date.format("%Y-%m-%d"),
            format_amount(e.amount),
            truncate(&e.category, 16),
            truncate(&e.room, 16),
            truncate(&e.supplier, 18),
            truncate(&e.description, 40),
        );
    }
    println!("{}", "─".repeat(100));
    println!(
        "{} expense(s), total {}",
        shown.len(),
        format_amount(filter.total(&expenses))
    );
    Ok(())
}

fn cli_edit(args: &[String], db: &Database) -> Result<()> {
    let id = id_arg(args, "renotrack edit <id> [--amount <n>] [--category <c>] ...")?;
    let mut expense = db
        .get_expense_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Expense {id} not found"))?;

    if let Some(d) = flag(args, "--date") {
        expense.date = transfer::parse_date(d)?;
    }
    if let Some(a) = flag(args, "--amount") {
        expense.amount = transfer::parse_amount(a)?;
    }
    if let Some(c) = flag(args, "--category") {
        expense.category = category_value(c);
    }
    if let Some(r) = flag(args, "--room") {
        expense.room = room_value(r);
    }
    if let Some(s) = flag(args, "--supplier") {
        expense.supplier = s.to_string();
    }
    if let Some(d) = flag(args, "--description") {
        expense.description = d.to_string();
    }
    if let Some(url) = flag(args, "--invoice") {
        expense = expense.with_invoice(Some(url.to_string()));
    }

    db.update_expense(&expense)?;
    println!("Updated expense #{id}");
    Ok(())
}

fn cli_delete(args: &[String], db: &Database) -> Result<()> {
    let id = id_arg(args, "renotrack delete <id>")?;
    db.delete_expense(id)?;
    println!("Deleted expense #{id}");
    Ok(())
}

// ── Global budgets ───────────────────────────────────────────

fn cli_budget(args: &[String], db: &Database) -> Result<()> {
    let Some((sub, rest)) = args.split_first() else {
        anyhow::bail!("Usage: renotrack budget <new|list|edit|delete>");
    };

    match sub.as_str() {
        "new" => {
            let pos = positionals(rest);
            let (Some(name), Some(amount)) = (pos.first(), pos.get(1)) else {
                anyhow::bail!("Usage: renotrack budget new <name> <amount>");
            };
            let budget = GlobalBudget::new(name.to_string(), transfer::parse_amount(amount)?);
            let id = db.insert_global_budget(&budget)?;
            println!(
                "Created budget #{id} '{}' of {}",
                budget.name,
                format_amount(budget.total_amount)
            );
        }
        "list" => {
            let budgets = db.list_global_budgets()?;
            if budgets.is_empty() {
                println!("No global budgets");
                return Ok(());
            }
            let active = stats::select_active_budget(&budgets).and_then(|b| b.id);
            println!("{:<5} {:<28} {:>15}  Created", "ID", "Name", "Total");
            println!("{}", "─".repeat(64));
            for b in &budgets {
                let marker = if b.id == active { "  (active)" } else { "" };
                println!(
                    "{:<5} {:<28} {:>15}  {}{marker}",
                    b.id.unwrap_or(0),
                    truncate(&b.name, 28),
                    format_amount(b.total_amount),
                    b.created_at.format("%Y-%m-%d"),
                );
            }
        }
        "edit" => {
            let id = id_arg(rest, "renotrack budget edit <id> [--name <n>] [--amount <n>]")?;
            let mut budget = db
                .get_global_budget_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Global budget {id} not found"))?;
            if let Some(name) = flag(rest, "--name") {
                budget.name = name.to_string();
            }
            if let Some(amount) = flag(rest, "--amount") {
                budget.total_amount = transfer::parse_amount(amount)?;
            }
            db.update_global_budget(&budget)?;
            println!("Updated budget #{id}");
        }
        "delete" => {
            let id = id_arg(rest, "renotrack budget delete <id>")?;
            db.delete_global_budget(id)?;
            println!("Deleted budget #{id} and its allocations");
        }
        other => anyhow::bail!("Unknown budget command: {other}"),
    }
    Ok(())
}

// ── Room allocations ─────────────────────────────────────────

fn cli_room(args: &[String], db: &Database) -> Result<()> {
    let Some((sub, rest)) = args.split_first() else {
        anyhow::bail!("Usage: renotrack room <new|list|edit|delete>");
    };

    match sub.as_str() {
        "new" => {
            let pos = positionals(rest);
            let (Some(budget_id), Some(room), Some(amount)) = (pos.first(), pos.get(1), pos.get(2))
            else {
                anyhow::bail!("Usage: renotrack room new <budget-id> <room> <amount>");
            };
            let budget_id = parse_id(budget_id)?;
            if db.get_global_budget_by_id(budget_id)?.is_none() {
                anyhow::bail!("Global budget {budget_id} not found");
            }
            let allocation =
                RoomAllocation::new(budget_id, room_value(room), transfer::parse_amount(amount)?);
            let id = db.insert_room_allocation(&allocation)?;
            println!(
                "Allocated {} to {} (room allocation #{id})",
                format_amount(allocation.allocated_amount),
                allocation.room
            );
        }
        "list" => {
            let budget_id = flag(rest, "--budget").map(parse_id).transpose()?;
            let allocations = db.list_room_allocations(budget_id)?;
            if allocations.is_empty() {
                println!("No room allocations");
                return Ok(());
            }
            println!("{:<5} {:<8} {:<24} {:>15}", "ID", "Budget", "Room", "Allocated");
            println!("{}", "─".repeat(55));
            for a in &allocations {
                println!(
                    "{:<5} {:<8} {:<24} {:>15}",
                    a.id.unwrap_or(0),
                    a.global_budget_id,
                    truncate(&a.room, 24),
                    format_amount(a.allocated_amount),
                );
            }
        }
        "edit" => {
            let id = id_arg(rest, "renotrack room edit <id> [--room <r>] [--amount <n>]")?;
            let mut allocation = db
                .get_room_allocation_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Room allocation {id} not found"))?;
            if let Some(room) = flag(rest, "--room") {
                allocation.room = room_value(room);
            }
            if let Some(amount) = flag(rest, "--amount") {
                allocation.allocated_amount = transfer::parse_amount(amount)?;
            }
            db.update_room_allocation(&allocation)?;
            println!("Updated room allocation #{id}");
        }
        "delete" => {
            let id = id_arg(rest, "renotrack room delete <id>")?;
            db.delete_room_allocation(id)?;
            println!("Deleted room allocation #{id} and its categories");
        }
        other => anyhow::bail!("Unknown room command: {other}"),
    }
    Ok(())
}

// ── Category allocations ─────────────────────────────────────

fn parent_from_flags(args: &[String]) -> Result<Option<AllocationParent>> {
    match (flag(args, "--room"), flag(args, "--budget")) {
        (Some(_), Some(_)) => anyhow::bail!("Use either --room or --budget, not both"),
        (Some(room), None) => Ok(Some(AllocationParent::Room(parse_id(room)?))),
        (None, Some(budget)) => Ok(Some(AllocationParent::Global(parse_id(budget)?))),
        (None, None) => Ok(None),
    }
}

fn cli_alloc(args: &[String], db: &Database) -> Result<()> {
    let Some((sub, rest)) = args.split_first() else {
        anyhow::bail!("Usage: renotrack alloc <new|list|edit|delete>");
    };

    match sub.as_str() {
        "new" => {
            let usage = "renotrack alloc new (--room <id> | --budget <id>) <category> <amount>";
            let parent = parent_from_flags(rest)?
                .ok_or_else(|| anyhow::anyhow!("Usage: {usage}"))?;
            let pos = positionals(rest);
            let (Some(category), Some(amount)) = (pos.first(), pos.get(1)) else {
                anyhow::bail!("Usage: {usage}");
            };
            let allocation = CategoryAllocation::new(
                parent,
                category_value(category),
                transfer::parse_amount(amount)?,
            );
            let id = db.insert_category_allocation(&allocation)?;
            println!(
                "Allocated {} to {} under {parent} (category allocation #{id})",
                format_amount(allocation.allocated_amount),
                allocation.category
            );
        }
        "list" => {
            let allocations = db.list_category_allocations(parent_from_flags(rest)?)?;
            if allocations.is_empty() {
                println!("No category allocations");
                return Ok(());
            }
            println!("{:<5} {:<12} {:<24} {:>15}", "ID", "Parent", "Category", "Allocated");
            println!("{}", "─".repeat(59));
            for a in &allocations {
                println!(
                    "{:<5} {:<12} {:<24} {:>15}",
                    a.id.unwrap_or(0),
                    a.parent.to_string(),
                    truncate(&a.category, 24),
                    format_amount(a.allocated_amount),
                );
            }
        }
        "edit" => {
            let id = id_arg(rest, "renotrack alloc edit <id> [--category <c>] [--amount <n>]")?;
            let mut allocation = db
                .get_category_allocation_by_id(id)?
                .ok_or_else(|| anyhow::anyhow!("Category allocation {id} not found"))?;
            if let Some(category) = flag(rest, "--category") {
                allocation.category = category_value(category);
            }
            if let Some(amount) = flag(rest, "--amount") {
                allocation.allocated_amount = transfer::parse_amount(amount)?;
            }
            db.update_category_allocation(&allocation)?;
            println!("Updated category allocation #{id}");
        }
        "delete" => {
            let id = id_arg(rest, "renotrack alloc delete <id>")?;
            db.delete_category_allocation(id)?;
            println!("Deleted category allocation #{id}");
        }
        other => anyhow::bail!("Unknown alloc command: {other}"),
    }
    Ok(())
}

// ── Legacy flat budgets ──────────────────────────────────────

fn cli_legacy(args: &[String], db: &Database) -> Result<()> {
    let Some((sub, rest)) = args.split_first() else {
        anyhow::bail!("Usage: renotrack legacy <new|list|delete>");
    };

    match sub.as_str() {
        "new" => {
            let usage = "renotrack legacy new <global|category|room> <name> <amount> \
                         [--category <c>] [--room <r>]";
            let pos = positionals(rest);
            let (Some(kind), Some(name), Some(amount)) = (pos.first(), pos.get(1), pos.get(2))
            else {
                anyhow::bail!("Usage: {usage}");
            };
            let kind = BudgetKind::parse(kind)
                .ok_or_else(|| anyhow::anyhow!("Unknown budget kind: {kind}"))?;
            let name = name.to_string();
            let amount = transfer::parse_amount(amount)?;
            let budget = match kind {
                BudgetKind::Global => Budget::new(kind, name, amount),
                BudgetKind::Category => {
                    Budget::for_category(name, category_value(required(rest, "--category")?), amount)
                }
                BudgetKind::Room => Budget::for_room(name, room_value(required(rest, "--room")?), amount),
            };
            let id = db.insert_budget(&budget)?;
            println!("Created {kind} budget #{id} '{}'", budget.name);
        }
        "list" => {
            let budgets = db.list_budgets()?;
            if budgets.is_empty() {
                println!("No flat budgets");
                return Ok(());
            }
            println!("{:<5} {:<9} {:<24} {:>15}  Target", "ID", "Kind", "Name", "Amount");
            println!("{}", "─".repeat(72));
            for b in &budgets {
                let target = b.category.as_deref().or(b.room.as_deref()).unwrap_or("");
                println!(
                    "{:<5} {:<9} {:<24} {:>15}  {target}",
                    b.id.unwrap_or(0),
                    b.kind.as_str(),
                    truncate(&b.name, 24),
                    format_amount(b.amount),
                );
            }
        }
        "delete" => {
            let id = id_arg(rest, "renotrack legacy delete <id>")?;
            db.delete_budget(id)?;
            println!("Deleted flat budget #{id}");
        }
        other => anyhow::bail!("Unknown legacy command: {other}"),
    }
    Ok(())
}

// ── Reports ──────────────────────────────────────────────────

fn cli_stats(args: &[String], db: &Database) -> Result<()> {
    let flat = args.iter().any(|a| a == "--flat");
    let id = match positionals(args).first() {
        Some(raw) => parse_id(raw)?,
        None => {
            let budgets = db.list_global_budgets()?;
            stats::select_active_budget(&budgets)
                .and_then(|b| b.id)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "No global budget defined. Create one with: renotrack budget new <name> <amount>"
                    )
                })?
        }
    };

    if flat {
        let stats = repository::load_flat_budget_stats(db, id)?
            .ok_or_else(|| anyhow::anyhow!("Global budget {id} not found"))?;
        report::print_flat_stats(&stats);
    } else {
        let stats = repository::load_budget_stats(db, id)?
            .ok_or_else(|| anyhow::anyhow!("Global budget {id} not found"))?;
        report::print_budget_stats(&stats);
    }
    Ok(())
}

fn cli_summary(db: &Database) -> Result<()> {
    let stats = match repository::load_active_budget_stats(db)? {
        Some(budget_stats) => {
            println!("RenoTrack: {}", budget_stats.global_budget.name);
            stats::legacy_view(&budget_stats)
        }
        None => {
            println!("RenoTrack");
            repository::load_expense_stats(db)?
        }
    };
    println!("{}", "─".repeat(40));
    report::print_expense_stats(&stats);
    Ok(())
}

fn cli_export(args: &[String], db: &Database) -> Result<()> {
    let output_path = positionals(args)
        .first()
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let today = chrono::Local::now().format("%Y-%m-%d");
            format!("{home}/renotrack-export-{today}.csv")
        });

    let filter = filter_from_flags(args);
    let expenses = db.list_expenses()?;
    let selected: Vec<Expense> = filter.apply(&expenses).into_iter().cloned().collect();
    if selected.is_empty() {
        println!("No expenses to export");
        return Ok(());
    }

    let count = transfer::export_to_csv(Path::new(&output_path), &selected)?;
    println!("Exported {count} expenses to {output_path}");
    Ok(())
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    let Some(file_path) = positionals(args).first().map(|a| shellexpand(a)) else {
        anyhow::bail!("Usage: renotrack import <file.csv>");
    };
    let path = Path::new(&file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let expenses = transfer::read_expenses(path)?;
    println!("Parsed {} expenses", expenses.len());
    let count = db.insert_expenses_batch(&expenses)?;
    println!("Imported {count} expenses");
    Ok(())
}

fn cli_catalog() {
    println!("Categories:");
    for c in catalog::EXPENSE_CATEGORIES {
        println!("  {c}");
    }
    println!();
    println!("Rooms:");
    for r in catalog::ROOMS {
        println!("  {r}");
    }
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
