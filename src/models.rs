use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// Lifecycle state of a task on the board.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[serde(rename = "POR_HACER")]
    Pending,
    #[serde(rename = "EN_PROGRESO")]
    InProgress,
    #[serde(rename = "COMPLETADO")]
    Done,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Done];

    /// One step forward on the board, or `None` from `Done`.
    pub fn next(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Pending => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::Done),
            TaskStatus::Done => None,
        }
    }

    /// One step back on the board, or `None` from `Pending`.
    pub fn previous(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Pending => None,
            TaskStatus::InProgress => Some(TaskStatus::Pending),
            TaskStatus::Done => Some(TaskStatus::InProgress),
        }
    }

    /// Column title shown on the board.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Por Hacer",
            TaskStatus::InProgress => "En Progreso",
            TaskStatus::Done => "Completado",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "pending" | "todo" | "por-hacer" => Ok(TaskStatus::Pending),
            "in-progress" | "progress" | "started" | "en-progreso" => Ok(TaskStatus::InProgress),
            "done" | "completed" | "completado" => Ok(TaskStatus::Done),
            _ => Err(BoardError::InvalidStatus(s.to_string())),
        }
    }
}

/// Measurement unit a category's quantity is expressed in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureUnit {
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "hrs")]
    Hours,
    #[serde(rename = "und")]
    Units,
    #[serde(rename = "%")]
    Percentage,
}

impl MeasureUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            MeasureUnit::Meters => "m",
            MeasureUnit::Hours => "hrs",
            MeasureUnit::Units => "und",
            MeasureUnit::Percentage => "%",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A unit of field work tracked on the board.
///
/// Field names and timestamp encoding (epoch milliseconds) match the JSON
/// snapshots written by the browser version of the board.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub id: u64,
    pub title: String,
    /// Category name as listed in the registry when the task was written.
    pub category: String,
    /// Non-negative amount in `unit`.
    pub quantity: f64,
    /// Unit resolved from the category at creation/edit time. Stored so that
    /// later registry changes never rewrite history.
    pub unit: MeasureUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    /// Category id or name.
    pub category: String,
    pub quantity: f64,
    pub description: Option<String>,
}

/// Field changes applied by an edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    /// Category id or name.
    pub category: Option<String>,
    pub quantity: Option<f64>,
    /// `Some("")` clears the description.
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Empty or whitespace-only descriptions are stored as absent.
pub(crate) fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

pub(crate) fn clamp_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() { quantity.max(0.0) } else { 0.0 }
}
