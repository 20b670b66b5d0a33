use tracing::{debug, warn};

use crate::db::Persist;
use crate::error::CloError;
use crate::graph::cycle;
use crate::models::{FieldValue, Task, TaskField, TaskState, TASK_FIELDS};
use crate::output::text::{indent, Table};

/// The ordered task collection plus the "current task" cursor.
///
/// Position in the vector is the task's index. Indices shift when a task is
/// removed; ids never change, so subtask links are stored as ids and
/// resolved back to an index on every use.
pub struct TaskStore {
    tasks: Vec<Task>,
    current: Option<usize>,
    source: Box<dyn Persist<Task>>,
}

impl TaskStore {
    pub fn load(source: Box<dyn Persist<Task>>) -> Self {
        let tasks = source.load();
        debug!(count = tasks.len(), "task store ready");
        let store = Self {
            tasks,
            current: None,
            source,
        };
        let nodes: Vec<&str> = store.tasks.iter().map(|t| t.id()).collect();
        if let Err(e) = cycle::detect_cycle(&nodes, &store.subtask_edges()) {
            warn!(error = %e, "stored subtask links contain a cycle");
        }
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Result<&Task, CloError> {
        self.current
            .and_then(|i| self.tasks.get(i))
            .ok_or_else(CloError::no_current_task)
    }

    fn current_mut(&mut self) -> Result<&mut Task, CloError> {
        match self.current {
            Some(i) if i < self.tasks.len() => Ok(&mut self.tasks[i]),
            _ => Err(CloError::no_current_task()),
        }
    }

    /// Append a new open task and make it current.
    pub fn add(&mut self, description: &str) -> Result<&Task, CloError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(CloError::invalid_value("A task needs a description"));
        }
        self.tasks.push(Task::new(description));
        let index = self.tasks.len() - 1;
        self.current = Some(index);
        debug!(index, "added task");
        Ok(&self.tasks[index])
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn set_current(&mut self, index: usize) -> Result<&Task, CloError> {
        if index >= self.tasks.len() {
            return Err(CloError::index_out_of_range(index, self.tasks.len()));
        }
        self.current = Some(index);
        Ok(&self.tasks[index])
    }

    /// Linear scan from id to current index.
    pub fn resolve_index_by_id(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id() == id)
    }

    pub fn modify_current(
        &mut self,
        field: TaskField,
        value: FieldValue,
    ) -> Result<Option<String>, CloError> {
        let task = self.current_mut()?;
        let notice = task.set(field, value)?;
        debug!(field = field.as_str(), "modified current task");
        Ok(notice)
    }

    pub fn close_current(&mut self) -> Result<(), CloError> {
        self.modify_current(TaskField::State, TaskState::Closed.as_str().into())
            .map(|_| ())
    }

    pub fn reopen_current(&mut self) -> Result<(), CloError> {
        self.modify_current(TaskField::State, TaskState::Open.as_str().into())
            .map(|_| ())
    }

    /// Remove one element from a list attribute of the current task.
    /// Returns whether the value was present.
    pub fn remove_from_current(&mut self, field: TaskField, value: &str) -> Result<bool, CloError> {
        let task = self.current_mut()?;
        let removed = match field {
            TaskField::BlockedUntil => task.remove_blocked_until(value),
            TaskField::Projects => task.remove_project(value),
            TaskField::Contexts => task.remove_context(value),
            TaskField::Subtasks => task.remove_subtask(value),
            _ => {
                return Err(CloError::invalid_value(format!(
                    "{} is not a list",
                    field.as_str()
                )))
            }
        };
        Ok(removed)
    }

    /// Record the task at `index` as a subtask of the current task.
    pub fn make_subtask_of_current(&mut self, index: usize) -> Result<(), CloError> {
        let parent_id = self.current()?.id().to_string();
        let child_id = self
            .get(index)
            .ok_or_else(|| CloError::index_out_of_range(index, self.tasks.len()))?
            .id()
            .to_string();

        cycle::would_create_cycle(&self.subtask_edges(), &parent_id, &child_id)?;

        self.modify_current(TaskField::Subtasks, child_id.into())?;
        Ok(())
    }

    /// Every (parent id, subtask id) link in the store.
    fn subtask_edges(&self) -> Vec<(&str, &str)> {
        self.tasks
            .iter()
            .flat_map(|t| t.subtasks().iter().map(move |s| (t.id(), s.as_str())))
            .collect()
    }

    pub fn remove_subtask_of_current(&mut self, index: usize) -> Result<bool, CloError> {
        let child_id = self
            .get(index)
            .ok_or_else(|| CloError::index_out_of_range(index, self.tasks.len()))?
            .id()
            .to_string();
        self.remove_from_current(TaskField::Subtasks, &child_id)
    }

    /// Delete the task at `index`. Later tasks shift down one index, the
    /// cursor follows its task (or is cleared if it was the one removed),
    /// and links to the removed id are dropped.
    pub fn remove(&mut self, index: usize) -> Result<Task, CloError> {
        if index >= self.tasks.len() {
            return Err(CloError::index_out_of_range(index, self.tasks.len()));
        }
        let removed = self.tasks.remove(index);
        for task in &mut self.tasks {
            task.forget_subtask(removed.id());
        }
        self.current = match self.current {
            Some(c) if c == index => None,
            Some(c) if c > index => Some(c - 1),
            other => other,
        };
        debug!(index, "removed task");
        Ok(removed)
    }

    pub fn display_current(&self) -> Result<Table, CloError> {
        let task = self.current()?;
        let mut table = Table::new(&TASK_FIELDS);
        table.add_row(task.row());
        Ok(table)
    }

    /// All tasks by index. Closed tasks are left out unless
    /// `include_closed`, which also adds a trailing State column.
    pub fn display_all(&self, include_closed: bool) -> Table {
        if include_closed {
            let mut headers = index_headers();
            headers.push("State".to_string());
            let mut table = Table::new(&headers[..]);
            for (index, task) in self.tasks.iter().enumerate() {
                let mut row = indexed_row(index, task, 0);
                row.push(task.state().as_str().to_string());
                table.add_row(row);
            }
            table
        } else {
            let indices: Vec<usize> = self.open_indices();
            self.display_indices(&indices)
        }
    }

    pub fn open_indices(&self) -> Vec<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_open())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn display_indices(&self, indices: &[usize]) -> Table {
        let mut table = Table::new(&index_headers()[..]);
        for &index in indices {
            if let Some(task) = self.tasks.get(index) {
                table.add_row(indexed_row(index, task, 0));
            }
        }
        table
    }

    /// The task at `root` followed by its subtask tree, depth first, each
    /// level indented one step further.
    ///
    /// Every step resolves an id by linear scan, so a full subtree costs
    /// O(n * nodes). An id already on the path from the root is shown once
    /// with a `(cycle)` marker and not descended into; an id that no longer
    /// resolves is shown as a missing row.
    pub fn render_with_subtasks(&self, root: usize) -> Result<Table, CloError> {
        if root >= self.tasks.len() {
            return Err(CloError::index_out_of_range(root, self.tasks.len()));
        }
        let mut table = Table::new(&index_headers()[..]);
        let mut path = Vec::new();
        self.push_subtree(root, 0, &mut path, &mut table);
        Ok(table)
    }

    fn push_subtree<'a>(
        &'a self,
        index: usize,
        depth: usize,
        path: &mut Vec<&'a str>,
        table: &mut Table,
    ) {
        let task = &self.tasks[index];
        table.add_row(indexed_row(index, task, depth));
        path.push(task.id());
        for id in task.subtasks() {
            match self.resolve_index_by_id(id) {
                Some(child) if path.contains(&id.as_str()) => {
                    let mut row = indexed_row(child, &self.tasks[child], depth + 1);
                    row[1].push_str(" (cycle)");
                    table.add_row(row);
                }
                Some(child) => self.push_subtree(child, depth + 1, path, table),
                None => {
                    let mut row = vec![String::from("-"), indent(&format!("<missing task {id}>"), depth + 1)];
                    row.resize(TASK_FIELDS.len() + 1, String::new());
                    table.add_row(row);
                }
            }
        }
        path.pop();
    }

    /// Flush the collection to its persistence source.
    pub fn close(&self) -> Result<(), CloError> {
        self.source.save(&self.tasks)
    }
}

fn index_headers() -> Vec<String> {
    std::iter::once("Index")
        .chain(TASK_FIELDS)
        .map(String::from)
        .collect()
}

fn indexed_row(index: usize, task: &Task, depth: usize) -> Vec<String> {
    let mut row = task.row();
    row[0] = indent(&row[0], depth);
    let mut out = Vec::with_capacity(row.len() + 1);
    out.push(index.to_string());
    out.extend(row);
    out
}
