//! Period report: completed work grouped by (category, unit) plus KPIs.
//!
//! Everything here is a pure function of the task list, the date range and
//! the time zone used to turn calendar days into instants. Running it twice
//! on the same input yields the same report.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::categories::{is_drilling, is_logging};
use crate::error::{BoardError, BoardResult};
use crate::models::{MeasureUnit, Task, TaskStatus};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DateRange {
        DateRange { start, end }
    }

    /// First through last day of the month containing `today`.
    pub fn current_month(today: NaiveDate) -> DateRange {
        let start = today.with_day(1).unwrap_or(today);
        let (y, m) = if today.month() == 12 {
            (today.year() + 1, 1)
        } else {
            (today.year(), today.month() + 1)
        };
        let end = NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or(today);
        DateRange { start, end }
    }

    /// Parses `YYYY-MM-DD` bounds. A missing bound falls back to the
    /// current month's.
    pub fn parse(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> BoardResult<DateRange> {
        let month = DateRange::current_month(today);
        let start = from.map(parse_date).transpose()?.unwrap_or(month.start);
        let end = to.map(parse_date).transpose()?.unwrap_or(month.end);
        Ok(DateRange { start, end })
    }

    /// Instants bounding the range in `tz`: 00:00:00.000 of the first day
    /// through 23:59:59.999 of the last, both inclusive.
    ///
    /// A start skipped by a DST jump moves forward to the first wall-clock
    /// time that exists; an end that repeats takes its later reading.
    pub fn bounds<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start.and_time(NaiveTime::MIN);
        let end = self.end.and_time(NaiveTime::MIN) + Duration::milliseconds(86_399_999);
        let start = resolve(start, Duration::minutes(1), |n| tz.from_local_datetime(n).earliest());
        let end = resolve(end, Duration::minutes(-1), |n| tz.from_local_datetime(n).latest());
        (start, end)
    }
}

pub fn parse_date(s: &str) -> BoardResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| BoardError::InvalidDate(s.to_string()))
}

/// Wall-clock time as an instant. When `naive` falls in a DST gap, walks in
/// `step`s until it reaches a time that exists. Gaps start and end on whole
/// minutes and never span a full day.
fn resolve<Tz, F>(naive: NaiveDateTime, step: Duration, pick: F) -> DateTime<Utc>
where
    Tz: TimeZone,
    F: Fn(&NaiveDateTime) -> Option<DateTime<Tz>>,
{
    (0..=24 * 60)
        .find_map(|i| pick(&(naive + step * i)))
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Totals for one (category, unit) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedReportItem {
    pub category: String,
    pub unit: MeasureUnit,
    pub total_quantity: f64,
    pub task_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kpis {
    /// Meters completed in drilling categories.
    pub drilling_meters: f64,
    /// Meters completed in logging/mapping categories.
    pub logging_meters: f64,
    pub completed_count: usize,
    /// Mean creation-to-completion time in hours, one decimal. Zero when no
    /// task qualifies.
    pub avg_cycle_hours: f64,
    /// Tasks created in the range, whatever their status.
    pub created_count: usize,
}

impl Kpis {
    pub fn drilling_meters_label(&self) -> String {
        format!("{:.2}", self.drilling_meters)
    }

    pub fn logging_meters_label(&self) -> String {
        format!("{:.2}", self.logging_meters)
    }

    pub fn avg_cycle_hours_label(&self) -> String {
        if self.completed_count == 0 {
            "0".to_string()
        } else {
            format!("{:.1}", self.avg_cycle_hours)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub range: DateRange,
    /// Sorted by total quantity, largest first.
    pub items: Vec<ConsolidatedReportItem>,
    pub kpis: Kpis,
}

/// Builds the report for `range`, interpreting calendar days in `tz`.
pub fn build_report<Tz: TimeZone>(tasks: &[Task], range: DateRange, tz: &Tz) -> Report {
    let (start, end) = range.bounds(tz);
    let in_range = |t: DateTime<Utc>| t >= start && t <= end;

    let completed: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .filter(|t| t.completed_at.is_some_and(in_range))
        .collect();

    let mut items: Vec<ConsolidatedReportItem> = Vec::new();
    let mut index: HashMap<(&str, MeasureUnit), usize> = HashMap::new();
    for t in &completed {
        let slot = *index.entry((t.category.as_str(), t.unit)).or_insert_with(|| {
            items.push(ConsolidatedReportItem {
                category: t.category.clone(),
                unit: t.unit,
                total_quantity: 0.0,
                task_count: 0,
            });
            items.len() - 1
        });
        items[slot].total_quantity += t.quantity;
        items[slot].task_count += 1;
    }
    // Stable: equal totals keep first-seen order.
    items.sort_by(|a, b| b.total_quantity.total_cmp(&a.total_quantity));

    let meters = |pred: fn(&str) -> bool| -> f64 {
        completed
            .iter()
            .filter(|t| t.unit == MeasureUnit::Meters && pred(&t.category))
            .map(|t| t.quantity)
            .sum()
    };

    let cycle_ms: i64 = completed
        .iter()
        .filter_map(|t| t.completed_at.map(|c| (c - t.created_at).num_milliseconds()))
        .sum();
    let avg_cycle_hours = if completed.is_empty() {
        0.0
    } else {
        let hours = cycle_ms as f64 / completed.len() as f64 / 3_600_000.0;
        (hours * 10.0).round() / 10.0
    };

    let kpis = Kpis {
        drilling_meters: meters(is_drilling),
        logging_meters: meters(is_logging),
        completed_count: completed.len(),
        avg_cycle_hours,
        created_count: tasks.iter().filter(|t| in_range(t.created_at)).count(),
    };

    Report { range, items, kpis }
}
