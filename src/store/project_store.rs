use tracing::debug;

use crate::db::Persist;
use crate::error::CloError;
use crate::models::{FieldValue, Project, ProjectField, PROJECT_FIELDS, TASK_FIELDS};
use crate::output::text::Table;
use crate::store::TaskStore;

pub struct ProjectStore {
    projects: Vec<Project>,
    current: Option<usize>,
    source: Box<dyn Persist<Project>>,
}

impl ProjectStore {
    pub fn load(source: Box<dyn Persist<Project>>) -> Self {
        let projects = source.load();
        debug!(count = projects.len(), "project store ready");
        Self {
            projects,
            current: None,
            source,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Result<&Project, CloError> {
        self.current
            .and_then(|i| self.projects.get(i))
            .ok_or_else(CloError::no_current_project)
    }

    pub fn add(&mut self, description: &str) -> Result<&Project, CloError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(CloError::invalid_value("A project needs a description"));
        }
        self.projects.push(Project::new(description));
        let index = self.projects.len() - 1;
        self.current = Some(index);
        debug!(index, "added project");
        Ok(&self.projects[index])
    }

    pub fn set_current(&mut self, index: usize) -> Result<&Project, CloError> {
        if index >= self.projects.len() {
            return Err(CloError::index_out_of_range(index, self.projects.len()));
        }
        self.current = Some(index);
        Ok(&self.projects[index])
    }

    pub fn modify_current(&mut self, field: ProjectField, value: FieldValue) -> Result<(), CloError> {
        let project = match self.current {
            Some(i) if i < self.projects.len() => &mut self.projects[i],
            _ => return Err(CloError::no_current_project()),
        };
        project.set(field, value)?;
        debug!(field = field.as_str(), "modified current project");
        Ok(())
    }

    /// Indices of the tasks filed under `project`, matched on the exact
    /// description string.
    pub fn task_indices_for(&self, project: &Project, tasks: &TaskStore) -> Vec<usize> {
        tasks
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.projects().iter().any(|p| *p == project.description))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn display_current(&self, with_tasks: bool, tasks: &TaskStore) -> Result<Vec<Table>, CloError> {
        let project = self.current()?;
        let mut headers: Vec<&str> = PROJECT_FIELDS.to_vec();
        headers.push("State");
        let mut table = Table::new(&headers[..]);
        let mut row = project.row();
        row.push(project.state.clone());
        table.add_row(row);

        let mut out = vec![table];
        if with_tasks {
            out.extend(self.tasks_table(project, tasks));
        }
        Ok(out)
    }

    /// Every project by index; with `with_tasks`, each project is followed
    /// by a table of its tasks (a projects x tasks scan).
    pub fn display_all(&self, with_tasks: bool, tasks: &TaskStore) -> Vec<Table> {
        let mut headers = vec!["Index"];
        headers.extend(PROJECT_FIELDS);
        headers.push("State");

        if !with_tasks {
            let mut table = Table::new(&headers[..]);
            for (index, project) in self.projects.iter().enumerate() {
                table.add_row(project_row(index, project));
            }
            return vec![table];
        }

        let mut out = Vec::new();
        for (index, project) in self.projects.iter().enumerate() {
            let mut table = Table::new(&headers[..]);
            table.add_row(project_row(index, project));
            out.push(table);
            out.extend(self.tasks_table(project, tasks));
        }
        out
    }

    fn tasks_table(&self, project: &Project, tasks: &TaskStore) -> Option<Table> {
        let indices = self.task_indices_for(project, tasks);
        if indices.is_empty() {
            return None;
        }
        let mut headers = vec!["Index"];
        headers.extend(TASK_FIELDS);
        headers.push("State");
        let mut table = Table::new(&headers[..]);
        for index in indices {
            if let Some(task) = tasks.get(index) {
                let mut row = vec![index.to_string()];
                row.extend(task.row());
                row.push(task.state().as_str().to_string());
                table.add_row(row);
            }
        }
        Some(table)
    }

    pub fn close(&self) -> Result<(), CloError> {
        self.source.save(&self.projects)
    }
}

fn project_row(index: usize, project: &Project) -> Vec<String> {
    let mut row = vec![index.to_string()];
    row.extend(project.row());
    row.push(project.state.clone());
    row
}
