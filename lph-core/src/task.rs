//! Internal task queue
//!
//! Tasks move strictly forward: Pending → InProgress → Completed. Pinning is
//! orthogonal to status but frozen once a task is completed. There is no
//! release or reopen; an admin deletes a task instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entity::{Entity, EntityKind};
use crate::error::{DeskError, Result};

/// Number of completed tasks shown on the board
pub const COMPLETED_SECTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Events accepted by the task state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    Create,
    Claim,
    Complete,
    TogglePin,
}

impl fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            TaskEvent::Create => "create",
            TaskEvent::Claim => "claim",
            TaskEvent::Complete => "complete",
            TaskEvent::TogglePin => "pin",
        };
        f.write_str(verb)
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// New pending, unpinned task. The id is assigned by the store.
    pub fn create(input: NewTask, actor: &str, now: DateTime<Utc>) -> Result<Self> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(DeskError::invalid("Task title must not be empty"));
        }
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id: String::new(),
            title: title.to_string(),
            description,
            is_pinned: false,
            status: TaskStatus::Pending,
            created_by: actor.to_string(),
            created_at: Some(now),
            in_progress_by: None,
            in_progress_at: None,
            completed_by: None,
            completed_at: None,
        })
    }

    /// Take a pending task.
    ///
    /// Returns `Ok(false)` when `actor` already holds the task.
    pub fn claim(&mut self, actor: &str, now: DateTime<Utc>) -> Result<bool> {
        match self.status {
            TaskStatus::Pending => {
                self.status = TaskStatus::InProgress;
                self.in_progress_by = Some(actor.to_string());
                self.in_progress_at = Some(now);
                Ok(true)
            }
            TaskStatus::InProgress if self.is_claimed_by(actor) => Ok(false),
            TaskStatus::InProgress => Err(DeskError::denied(format!(
                "Task '{}' is already being handled by {}",
                self.title,
                self.in_progress_by.as_deref().unwrap_or("another user")
            ))),
            TaskStatus::Completed => Err(self.invalid(TaskEvent::Claim)),
        }
    }

    /// Finish a task; only its claimant may do so
    pub fn complete(&mut self, actor: &str, now: DateTime<Utc>) -> Result<()> {
        match self.status {
            TaskStatus::InProgress if self.is_claimed_by(actor) => {
                self.status = TaskStatus::Completed;
                self.completed_by = Some(actor.to_string());
                self.completed_at = Some(now);
                Ok(())
            }
            TaskStatus::InProgress => Err(DeskError::denied(format!(
                "Only {} can complete task '{}'",
                self.in_progress_by.as_deref().unwrap_or("the claimant"),
                self.title
            ))),
            from => Err(DeskError::InvalidTransition {
                from,
                event: TaskEvent::Complete,
            }),
        }
    }

    /// Flip the pin flag and return the new value
    pub fn toggle_pin(&mut self) -> Result<bool> {
        if self.is_terminal() {
            return Err(self.invalid(TaskEvent::TogglePin));
        }
        self.is_pinned = !self.is_pinned;
        Ok(self.is_pinned)
    }

    pub fn is_terminal(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_claimed_by(&self, actor: &str) -> bool {
        self.in_progress_by.as_deref() == Some(actor)
    }

    fn invalid(&self, event: TaskEvent) -> DeskError {
        DeskError::InvalidTransition {
            from: self.status,
            event,
        }
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Board view over the task collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBoard {
    /// Pending and in-progress tasks, collection order
    pub active: Vec<Task>,
    /// Most recently completed first
    pub completed: Vec<Task>,
    /// Pinned tasks that are not completed
    pub pinned: Vec<Task>,
}

impl TaskBoard {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let active: Vec<Task> = tasks.iter().filter(|t| !t.is_terminal()).cloned().collect();
        let pinned = active.iter().filter(|t| t.is_pinned).cloned().collect();

        let mut completed: Vec<Task> = tasks.iter().filter(|t| t.is_terminal()).cloned().collect();
        // Stable sort keeps collection order among equal timestamps
        completed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        completed.truncate(COMPLETED_SECTION_LIMIT);

        Self {
            active,
            completed,
            pinned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending(title: &str) -> Task {
        Task::create(
            NewTask {
                title: title.into(),
                description: None,
            },
            "admin_unisma",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_requires_title() {
        let err = Task::create(NewTask::default(), "staff", Utc::now()).unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));

        let task = Task::create(
            NewTask {
                title: "  Arsip berkas audit  ".into(),
                description: Some("   ".into()),
            },
            "staff",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(task.title, "Arsip berkas audit");
        assert_eq!(task.description, None);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.is_pinned);
        assert_eq!(task.created_by, "staff");
    }

    #[test]
    fn test_claim_rules() {
        let mut task = pending("Verifikasi dokumen");
        let now = Utc::now();

        assert!(task.claim("ahmad", now).unwrap());
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.in_progress_by.as_deref(), Some("ahmad"));

        let before = task.clone();
        assert!(!task.claim("ahmad", now + Duration::seconds(5)).unwrap());
        assert_eq!(task, before);

        let err = task.claim("siti", now).unwrap_err();
        assert!(matches!(err, DeskError::PermissionDenied(_)));
        assert_eq!(task, before);
    }

    #[test]
    fn test_complete_by_non_claimant_rejected() {
        let mut task = pending("Input data PU");
        let now = Utc::now();
        task.claim("ahmad", now).unwrap();

        let before = task.clone();
        let err = task.complete("siti", now).unwrap_err();
        assert!(matches!(err, DeskError::PermissionDenied(_)));
        assert_eq!(task, before);

        task.complete("ahmad", now).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_by.as_deref(), Some("ahmad"));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut task = pending("Rekap keuangan");
        let err = task.complete("ahmad", Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            DeskError::InvalidTransition {
                from: TaskStatus::Pending,
                event: TaskEvent::Complete
            }
        ));

        task.claim("ahmad", Utc::now()).unwrap();
        task.complete("ahmad", Utc::now()).unwrap();

        assert!(matches!(
            task.claim("ahmad", Utc::now()),
            Err(DeskError::InvalidTransition { .. })
        ));
        assert!(matches!(
            task.complete("ahmad", Utc::now()),
            Err(DeskError::InvalidTransition { .. })
        ));
        assert!(matches!(
            task.toggle_pin(),
            Err(DeskError::InvalidTransition { .. })
        ));
        assert_eq!(
            DeskError::InvalidTransition {
                from: TaskStatus::Completed,
                event: TaskEvent::TogglePin
            }
            .to_string(),
            "Cannot pin a task that is completed"
        );
    }

    #[test]
    fn test_toggle_pin() {
        let mut task = pending("Siapkan rapat");
        assert!(task.toggle_pin().unwrap());
        assert!(!task.toggle_pin().unwrap());
        task.claim("siti", Utc::now()).unwrap();
        assert!(task.toggle_pin().unwrap());
    }

    #[test]
    fn test_board_sections() {
        let base = Utc::now();
        let mut tasks: Vec<Task> = (0..8).map(|i| pending(&format!("task {i}"))).collect();
        for (i, task) in tasks.iter_mut().enumerate().take(6) {
            task.claim("ahmad", base).unwrap();
            task.complete("ahmad", base + Duration::minutes(i as i64)).unwrap();
        }
        tasks[6].toggle_pin().unwrap();

        let board = TaskBoard::from_tasks(&tasks);
        assert_eq!(board.active.len(), 2);
        assert_eq!(board.pinned.len(), 1);
        assert_eq!(board.pinned[0].title, "task 6");
        assert_eq!(board.completed.len(), COMPLETED_SECTION_LIMIT);
        assert_eq!(board.completed[0].title, "task 5");
        assert_eq!(board.completed[4].title, "task 1");
    }

    #[test]
    fn test_wire_format() {
        let mut task = pending("Cetak sertifikat");
        task.claim("siti", Utc::now()).unwrap();
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["status"], "InProgress");
        assert_eq!(value["inProgressBy"], "siti");
        assert_eq!(value["isPinned"], false);
        assert!(value.get("completedBy").is_none());
    }
}
