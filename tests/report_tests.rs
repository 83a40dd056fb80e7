use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use drillboard::board::TaskBoard;
use drillboard::models::{MeasureUnit, TaskDraft, TaskStatus};
use drillboard::report::{build_report, ConsolidatedReportItem, DateRange};

fn site() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn at(d: u32, h: u32) -> DateTime<Utc> {
    site().with_ymd_and_hms(2025, 1, d, h, 0, 0).unwrap().with_timezone(&Utc)
}

fn draft(category: &str, quantity: f64) -> TaskDraft {
    TaskDraft {
        title: format!("{category} {quantity}"),
        category: category.into(),
        quantity,
        description: None,
    }
}

#[test]
fn test_period_scenario() {
    let mut board = TaskBoard::default();
    let a = board.create(draft("Perforación PQ", 50.0), at(4, 7)).unwrap();
    let b = board.create(draft("Perforación PQ", 30.0), at(9, 7)).unwrap();
    let c = board.create(draft("Muestreo", 4.0), at(5, 7)).unwrap();
    board.move_task(a, TaskStatus::Done, at(5, 18)).unwrap();
    board.move_task(b, TaskStatus::InProgress, at(9, 8)).unwrap();
    board.move_task(b, TaskStatus::Done, at(10, 18)).unwrap();
    board.move_task(c, TaskStatus::Done, at(5, 12)).unwrap();

    let report = build_report(board.tasks(), DateRange::new(day(1), day(15)), &site());
    assert_eq!(
        report.items,
        vec![
            ConsolidatedReportItem {
                category: "Perforación PQ".into(),
                unit: MeasureUnit::Meters,
                total_quantity: 80.0,
                task_count: 2,
            },
            ConsolidatedReportItem {
                category: "Muestreo".into(),
                unit: MeasureUnit::Units,
                total_quantity: 4.0,
                task_count: 1,
            },
        ]
    );
    assert_eq!(report.kpis.drilling_meters_label(), "80.00");
    assert_eq!(report.kpis.created_count, 3);
}

#[test]
fn test_pending_counts_as_created_only() {
    let mut board = TaskBoard::default();
    board.create(draft("perf_hq", 20.0), at(1, 9)).unwrap();

    let report = build_report(board.tasks(), DateRange::new(day(1), day(31)), &site());
    assert!(report.items.is_empty());
    assert_eq!(report.kpis.created_count, 1);
    assert_eq!(report.kpis.completed_count, 0);
}

#[test]
fn test_reopened_task_leaves_report() {
    let mut board = TaskBoard::default();
    let id = board.create(draft("log_geotech", 15.0), at(2, 9)).unwrap();
    board.move_task(id, TaskStatus::Done, at(3, 9)).unwrap();
    let range = DateRange::new(day(1), day(31));
    assert_eq!(build_report(board.tasks(), range, &site()).kpis.logging_meters, 15.0);

    board.move_task(id, TaskStatus::InProgress, at(4, 9)).unwrap();
    let report = build_report(board.tasks(), range, &site());
    assert!(report.items.is_empty());
    assert_eq!(report.kpis.logging_meters, 0.0);
}

#[test]
fn test_completion_outside_range_is_excluded() {
    let mut board = TaskBoard::default();
    let id = board.create(draft("perf_nq", 12.0), at(14, 9)).unwrap();
    // 00:30 local on the 16th
    board.move_task(id, TaskStatus::Done, at(15, 23) + Duration::minutes(90)).unwrap();

    let report = build_report(board.tasks(), DateRange::new(day(1), day(15)), &site());
    assert!(report.items.is_empty());
    assert_eq!(report.kpis.created_count, 1);
}

#[test]
fn test_average_cycle_time() {
    let mut board = TaskBoard::default();
    let a = board.create(draft("rig_move", 3.0), at(2, 6)).unwrap();
    let b = board.create(draft("rig_move", 5.0), at(2, 6)).unwrap();
    board.move_task(a, TaskStatus::Done, at(2, 8)).unwrap();
    board.move_task(b, TaskStatus::Done, at(2, 9) + Duration::minutes(10)).unwrap();

    let report = build_report(board.tasks(), DateRange::new(day(1), day(31)), &site());
    // (2h + 3h10m) / 2 = 2h35m -> 2.6
    assert_eq!(report.kpis.avg_cycle_hours_label(), "2.6");
    assert_eq!(report.items[0].total_quantity, 8.0);
    assert_eq!(report.items[0].unit, MeasureUnit::Hours);
}
