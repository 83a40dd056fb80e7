use chrono::{Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::board::TaskBoard;
use crate::categories;
use crate::config::Config;
use crate::error::BoardResult;
use crate::models::{TaskDraft, TaskPatch, TaskStatus};
use crate::report::{build_report, DateRange, Report};
use crate::storage::TaskStore;
use crate::summary::{summarize_or_fallback, GeminiSummarizer};
use crate::timing::{execution_time, format_duration, wait_time};

/// Loads the board, applies `op` and saves only if `op` succeeded.
fn with_board<T>(store: &TaskStore, op: impl FnOnce(&mut TaskBoard) -> BoardResult<T>) -> BoardResult<T> {
    let mut board = TaskBoard::new(store.load_or_default());
    let out = op(&mut board)?;
    store.save(board.tasks())?;
    Ok(out)
}

/// Adds a new pending task and returns its id.
pub fn cmd_add(
    store: &TaskStore,
    title: String,
    category: String,
    quantity: f64,
    description: Option<String>,
    silent: bool,
) -> BoardResult<u64> {
    let draft = TaskDraft { title, category, quantity, description };
    let id = with_board(store, |b| b.create(draft, Utc::now()))?;
    if !silent { println!("Task added (id = {})", id); }
    Ok(id)
}

/// Edits an existing task's details.
pub fn cmd_edit(store: &TaskStore, id: u64, patch: TaskPatch, silent: bool) -> BoardResult<()> {
    with_board(store, |b| b.edit(id, patch, Utc::now()))?;
    if !silent { println!("Task {} updated.", id); }
    Ok(())
}

/// Moves a task to another column.
pub fn cmd_move(store: &TaskStore, id: u64, status: TaskStatus, silent: bool) -> BoardResult<()> {
    with_board(store, |b| b.move_task(id, status, Utc::now()))?;
    if !silent { println!("Task {} moved to {}.", id, status.label()); }
    Ok(())
}

/// Removes a task from the board by ID.
pub fn cmd_remove(store: &TaskStore, id: u64, silent: bool) -> BoardResult<()> {
    let removed = with_board(store, |b| b.delete(id))?;
    if !silent { println!("Task {} ({}) removed.", id, removed.title); }
    Ok(())
}

/// Lists tasks column by column, with wait and execution times.
pub fn cmd_list(store: &TaskStore, status: Option<TaskStatus>) {
    let board = TaskBoard::new(store.load_or_default());
    let now = Utc::now();
    let columns: Vec<TaskStatus> = match status {
        Some(s) => vec![s],
        None => TaskStatus::ALL.to_vec(),
    };
    if columns.iter().all(|s| board.by_status(*s).next().is_none()) {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Qty").add_attribute(Attribute::Bold),
            Cell::new("Created").add_attribute(Attribute::Bold),
            Cell::new("Wait").add_attribute(Attribute::Bold),
            Cell::new("Exec").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for s in columns {
        let color = status_color(s);
        for t in board.by_status(s) {
            table.add_row(vec![
                Cell::new(t.id),
                Cell::new(&t.title),
                Cell::new(&t.category),
                Cell::new(format!("{} {}", t.quantity, t.unit)).set_alignment(CellAlignment::Right),
                Cell::new(t.created_at.with_timezone(&Local).format("%d %b %H:%M")),
                Cell::new(format_duration(wait_time(t, now))),
                Cell::new(execution_time(t, now).map(format_duration).unwrap_or_else(|| "-".into())),
                Cell::new(s.label()).fg(color),
            ]);
        }
    }
    println!("{table}");

    let critical = board.critical_tasks(now, 3);
    if !critical.is_empty() {
        println!("Longest waiting:");
        for (t, waited) in critical {
            println!("  #{} {} ({}) - {}", t.id, t.title, t.status.label(), format_duration(waited));
        }
    }
}

/// Prints the consolidated report and KPIs for the range.
pub fn cmd_report(store: &TaskStore, from: Option<String>, to: Option<String>) -> BoardResult<()> {
    let report = load_report(store, from, to)?;
    print_report(&report);
    Ok(())
}

/// Prints the report followed by an executive summary from the AI service.
pub async fn cmd_summary(store: &TaskStore, config: &Config, from: Option<String>, to: Option<String>) -> BoardResult<()> {
    let report = load_report(store, from, to)?;
    print_report(&report);
    if report.items.is_empty() {
        println!("Nothing completed in this period; no summary generated.");
        return Ok(());
    }
    let summarizer = GeminiSummarizer::new(config.api_key.clone(), config.model.clone());
    println!("\n{}", summarize_or_fallback(&summarizer, &report.items, report.range).await);
    Ok(())
}

/// Lists the known categories and their units.
pub fn cmd_categories() {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["ID", "Category", "Unit"]);
    for c in categories::all() {
        table.add_row(vec![c.id.to_string(), c.name.to_string(), c.unit.to_string()]);
    }
    println!("{table}");
}

fn load_report(store: &TaskStore, from: Option<String>, to: Option<String>) -> BoardResult<Report> {
    let range = DateRange::parse(from.as_deref(), to.as_deref(), Local::now().date_naive())?;
    let tasks = store.load_or_default();
    Ok(build_report(&tasks, range, &Local))
}

fn print_report(report: &Report) {
    println!("Report {} to {}", report.range.start, report.range.end);
    if report.items.is_empty() {
        println!("No completed tasks in this period.");
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Category").add_attribute(Attribute::Bold),
                Cell::new("Unit").add_attribute(Attribute::Bold),
                Cell::new("Total").add_attribute(Attribute::Bold),
                Cell::new("Tasks").add_attribute(Attribute::Bold),
            ]);
        for item in &report.items {
            table.add_row(vec![
                Cell::new(&item.category),
                Cell::new(item.unit),
                Cell::new(format!("{:.2}", item.total_quantity)).set_alignment(CellAlignment::Right),
                Cell::new(item.task_count).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }

    let k = &report.kpis;
    let mut kpis = Table::new();
    kpis.load_preset(UTF8_FULL).set_header(vec!["KPI", "Value"]);
    kpis.add_row(vec!["Drilled (m)".to_string(), k.drilling_meters_label()]);
    kpis.add_row(vec!["Logged / mapped (m)".to_string(), k.logging_meters_label()]);
    kpis.add_row(vec!["Completed tasks".to_string(), k.completed_count.to_string()]);
    kpis.add_row(vec!["Avg cycle (h)".to_string(), k.avg_cycle_hours_label()]);
    kpis.add_row(vec!["Created in range".to_string(), k.created_count.to_string()]);
    println!("{kpis}");
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Pending => Color::Yellow,
        TaskStatus::InProgress => Color::DarkYellow,
        TaskStatus::Done => Color::Green,
    }
}
