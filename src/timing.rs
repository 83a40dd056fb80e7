//! Elapsed-time labels for task cards. Everything takes `now` explicitly so
//! the board's refresh tick stays outside the core.

use chrono::{DateTime, Duration, Utc};

use crate::models::Task;

/// Time from creation until the task was started, or until `now` if it has
/// not started yet.
pub fn wait_time(task: &Task, now: DateTime<Utc>) -> Duration {
    task.started_at.unwrap_or(now) - task.created_at
}

/// Time spent executing: start until completion (or `now` while running).
/// `None` for tasks that never started.
pub fn execution_time(task: &Task, now: DateTime<Utc>) -> Option<Duration> {
    task.started_at
        .map(|start| task.completed_at.unwrap_or(now) - start)
}

/// Compact label: `2d 3h`, `5h 12m` or `40m`. Negative spans read as `0m`.
pub fn format_duration(d: Duration) -> String {
    let d = d.max(Duration::zero());
    let days = d.num_days();
    let hours = d.num_hours() % 24;
    let minutes = d.num_minutes() % 60;
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasureUnit, TaskStatus};
    use chrono::TimeZone;

    fn task(started: Option<i64>, completed: Option<i64>) -> Task {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        Task {
            id: 1,
            title: "t".into(),
            category: "Muestreo".into(),
            quantity: 1.0,
            unit: MeasureUnit::Units,
            description: None,
            status: TaskStatus::Pending,
            created_at: base,
            updated_at: base,
            started_at: started.map(|m| base + Duration::minutes(m)),
            completed_at: completed.map(|m| base + Duration::minutes(m)),
        }
    }

    #[test]
    fn wait_runs_until_start_or_now() {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let now = base + Duration::minutes(300);
        assert_eq!(wait_time(&task(None, None), now), Duration::minutes(300));
        assert_eq!(wait_time(&task(Some(30), None), now), Duration::minutes(30));
    }

    #[test]
    fn execution_needs_a_start() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 5, 0, 0).unwrap();
        assert_eq!(execution_time(&task(None, None), now), None);
        assert_eq!(execution_time(&task(Some(60), None), now), Some(Duration::minutes(240)));
        assert_eq!(execution_time(&task(Some(60), Some(90)), now), Some(Duration::minutes(30)));
    }

    #[test]
    fn labels() {
        assert_eq!(format_duration(Duration::minutes(40)), "40m");
        assert_eq!(format_duration(Duration::minutes(5 * 60 + 12)), "5h 12m");
        assert_eq!(format_duration(Duration::hours(51)), "2d 3h");
        assert_eq!(format_duration(Duration::minutes(-5)), "0m");
    }
}
