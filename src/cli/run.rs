use anyhow::Result;
use tracing::info;

use crate::cli::commands::Cli;
use crate::cli::config;
use crate::db::{SqliteRecords, TextLines};
use crate::models::{Project, Task};
use crate::repl::{Dispatcher, StdConsole};
use crate::store::{Inbox, ProjectStore, TaskStore};

pub fn run(cli: &Cli) -> Result<()> {
    let paths = config::resolve(cli.dir.as_deref(), cli.file.as_deref())?;
    info!(
        data_dir = %paths.data_dir.display(),
        tasks = %paths.task_file.display(),
        projects = %paths.project_file.display(),
        inbox = %paths.inbox_file.display(),
        "starting"
    );

    let tasks = TaskStore::load(Box::new(SqliteRecords::<Task>::new(&paths.task_file)));
    let projects = ProjectStore::load(Box::new(SqliteRecords::<Project>::new(
        &paths.project_file,
    )));
    let inbox = Inbox::load(Box::new(TextLines::new(&paths.inbox_file)));

    let mut dispatcher = Dispatcher::new(tasks, projects, inbox, StdConsole::new());
    dispatcher.run();
    Ok(())
}
