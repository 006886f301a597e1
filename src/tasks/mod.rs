//! Task store for the to-do list attached to the timer.
//!
//! The store keeps tasks in creation order and writes the whole collection
//! back to storage after every mutation. Views for the list (filtered and
//! sorted) are recomputed on each call and never cached.

mod error;

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::storage::{self, KeyValueStore, TASKS_KEY};
use crate::types::{Task, TaskFilter, TaskId, TaskSort};

pub use error::TaskError;

/// Minimum prefix length accepted by [`TaskStore::resolve`].
pub const MIN_ID_PREFIX: usize = 4;

/// Message shown when the store has no tasks at all.
pub const EMPTY_STORE_MESSAGE: &str = "No tasks yet. Add one to get started!";

/// Message shown when tasks exist but none match the filter.
pub const NO_MATCH_MESSAGE: &str = "No tasks match your current filter.";

// ============================================================================
// TaskStore
// ============================================================================

/// Ordered, persisted collection of tasks.
pub struct TaskStore {
    tasks: Vec<Task>,
    store: Arc<dyn KeyValueStore>,
    unsaved: bool,
}

impl TaskStore {
    /// Loads the task collection from `store`.
    ///
    /// A missing or corrupt collection yields an empty store.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let tasks: Vec<Task> = storage::load_json(store.as_ref(), TASKS_KEY).unwrap_or_default();
        debug!("Loaded {} tasks", tasks.len());
        Self {
            tasks,
            store,
            unsaved: false,
        }
    }

    /// Appends a new task.
    ///
    /// The text is stored trimmed. Blank text and a zero estimate are rejected
    /// and leave the collection unchanged.
    pub fn add(&mut self, text: &str, estimated_time: Option<u32>) -> Result<TaskId, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::BlankText);
        }
        if estimated_time == Some(0) {
            return Err(TaskError::InvalidEstimate("0".to_string()));
        }

        let task = Task::new(text, estimated_time);
        let id = task.id;
        self.tasks.push(task);
        self.persist();
        Ok(id)
    }

    /// Flips the completion flag of the task with `id`.
    ///
    /// Returns the new flag, or `None` if no task has this id.
    pub fn toggle(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist();
        Some(completed)
    }

    /// Removes the task with `id`.
    ///
    /// Returns the removed task, or `None` if no task has this id.
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let task = self.tasks.remove(index);
        self.persist();
        Some(task)
    }

    /// Returns the tasks matching `filter`, ordered by `sort`.
    pub fn list(&self, filter: TaskFilter, sort: TaskSort) -> Vec<&Task> {
        let mut view: Vec<&Task> = self.tasks.iter().filter(|t| filter.matches(t)).collect();
        match sort {
            TaskSort::Date => {}
            TaskSort::Alphabetical => view.sort_by(|a, b| locale_cmp(&a.text, &b.text)),
            TaskSort::Time => view.sort_by(|a, b| estimate_cmp(a.estimated_time, b.estimated_time)),
        }
        view
    }

    /// Resolves a full id or a unique prefix of at least [`MIN_ID_PREFIX`] characters.
    pub fn resolve(&self, prefix: &str) -> Result<TaskId, TaskError> {
        let prefix = prefix.trim().to_ascii_lowercase().replace('-', "");
        if prefix.len() < MIN_ID_PREFIX {
            return Err(TaskError::NotFound(prefix));
        }

        let mut matches = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id),
            (Some(_), Some(_)) => Err(TaskError::Ambiguous(prefix)),
            (None, _) => Err(TaskError::NotFound(prefix)),
        }
    }

    /// Returns the task with `id`.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Returns all tasks in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns the number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if there are no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the number of tasks that are not completed.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Returns the message for an empty view.
    pub fn empty_message(&self) -> &'static str {
        if self.tasks.is_empty() {
            EMPTY_STORE_MESSAGE
        } else {
            NO_MATCH_MESSAGE
        }
    }

    /// Returns true if the last write of the collection failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Writes the whole collection to the backing store.
    pub fn save(&mut self) -> storage::Result<()> {
        let result = storage::save_json(self.store.as_ref(), TASKS_KEY, &self.tasks);
        self.unsaved = result.is_err();
        result
    }

    /// Retries the write if an earlier mutation could not be stored.
    ///
    /// Mutations only log failed writes; callers that must report them call
    /// this afterwards.
    pub fn flush(&mut self) -> storage::Result<()> {
        if self.unsaved {
            self.save()
        } else {
            Ok(())
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.save() {
            warn!("Failed to save tasks: {}", e);
        }
    }
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Ordering and input helpers
// ============================================================================

/// Compares task texts the way a locale-aware collator does for plain text:
/// case-insensitively first, with lowercase before uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            })
            .unwrap_or(Ordering::Equal)
    })
}

/// Ascending by estimate; a missing estimate sorts after every number.
fn estimate_cmp(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parses the minutes field of the add form.
///
/// An empty field means no estimate. Anything other than a positive whole
/// number is rejected.
pub fn parse_estimate(input: &str) -> Result<Option<u32>, TaskError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(Some(minutes)),
        _ => Err(TaskError::InvalidEstimate(input.to_string())),
    }
}

/// Fraction of a task's estimate covered by `elapsed_secs` of focus, capped at 1.
///
/// Returns `None` for completed tasks and tasks without an estimate.
pub fn task_progress(task: &Task, elapsed_secs: u32) -> Option<f64> {
    if task.completed {
        return None;
    }
    let total = f64::from(task.estimated_time?) * 60.0;
    Some((f64::from(elapsed_secs) / total).min(1.0))
}

// ============================================================================
// Tests
// ============================================================================
