use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::categories;
use crate::error::{BoardError, BoardResult};
use crate::models::{clamp_quantity, normalize_description, Task, TaskDraft, TaskPatch, TaskStatus};

/// Owns the task list. Every mutation goes through `create`, `edit`,
/// `delete` or `move_task`, each of which either applies fully or leaves the
/// list untouched. Persisting the result is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new(tasks: Vec<Task>) -> TaskBoard {
        TaskBoard { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks in one board column, most recently updated first. Ties keep
    /// insertion order.
    pub fn by_status(&self, status: TaskStatus) -> impl Iterator<Item = &Task> {
        let mut column: Vec<&Task> = self.tasks.iter().filter(|t| t.status == status).collect();
        column.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        column.into_iter()
    }

    /// Adds a new pending task and returns its id.
    pub fn create(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> BoardResult<u64> {
        let category = categories::resolve(&draft.category)?;
        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.tasks.push(Task {
            id,
            title: draft.title.trim().to_string(),
            category: category.name.to_string(),
            quantity: clamp_quantity(draft.quantity),
            unit: category.unit,
            description: normalize_description(draft.description),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        });
        debug!(id, category = category.name, "task created");
        Ok(id)
    }

    /// Applies field changes. A status in the patch triggers the same
    /// timestamp side effects as [`TaskBoard::move_task`].
    pub fn edit(&mut self, id: u64, patch: TaskPatch, now: DateTime<Utc>) -> BoardResult<()> {
        // Validate everything before touching the task.
        let category = patch.category.as_deref().map(categories::resolve).transpose()?;
        let task = self.task_mut(id)?;

        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(c) = category {
            task.category = c.name.to_string();
            task.unit = c.unit;
        }
        if let Some(q) = patch.quantity {
            task.quantity = clamp_quantity(q);
        }
        if patch.description.is_some() {
            task.description = normalize_description(patch.description);
        }
        if let Some(status) = patch.status {
            apply_transition(task, status, now);
        }
        task.updated_at = now;
        debug!(id, "task edited");
        Ok(())
    }

    /// Removes a task, returning it. Unknown ids report `NotFound` and leave
    /// the list unchanged.
    pub fn delete(&mut self, id: u64) -> BoardResult<Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(BoardError::NotFound(id))?;
        debug!(id, "task deleted");
        Ok(self.tasks.remove(idx))
    }

    /// Moves a task to `status`. Any status is reachable from any other; only
    /// the timestamp side effects depend on the edge taken.
    pub fn move_task(&mut self, id: u64, status: TaskStatus, now: DateTime<Utc>) -> BoardResult<()> {
        let task = self.task_mut(id)?;
        let from = task.status;
        apply_transition(task, status, now);
        task.updated_at = now;
        debug!(id, %from, to = %status, "task moved");
        Ok(())
    }

    /// Open tasks ordered by how long they have been waiting, longest first.
    ///
    /// Pending tasks wait since creation, in-progress ones since they were
    /// started (or created, if no start was recorded).
    pub fn critical_tasks(&self, now: DateTime<Utc>, limit: usize) -> Vec<(&Task, Duration)> {
        let mut open: Vec<(&Task, Duration)> = self
            .tasks
            .iter()
            .filter(|t| t.status != TaskStatus::Done)
            .map(|t| {
                let since = match t.status {
                    TaskStatus::Pending => t.created_at,
                    _ => t.started_at.unwrap_or(t.created_at),
                };
                (t, now - since)
            })
            .collect();
        open.sort_by(|a, b| b.1.cmp(&a.1));
        open.truncate(limit);
        open
    }

    fn task_mut(&mut self, id: u64) -> BoardResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(BoardError::NotFound(id))
    }
}

/// Sets `status` and the lifecycle timestamps that go with the edge taken.
/// Moving to the current status changes nothing here.
fn apply_transition(task: &mut Task, to: TaskStatus, now: DateTime<Utc>) {
    let from = task.status;
    task.status = to;
    if from == to {
        return;
    }
    match to {
        TaskStatus::InProgress => {
            if from == TaskStatus::Done {
                task.completed_at = None;
            } else if task.started_at.is_none() {
                task.started_at = Some(now);
            }
        }
        TaskStatus::Done => {
            task.completed_at = Some(now);
            if task.started_at.is_none() {
                task.started_at = Some(now);
            }
        }
        TaskStatus::Pending => {
            task.started_at = None;
            task.completed_at = None;
        }
    }
}
