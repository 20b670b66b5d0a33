use tracing::{debug, info, warn};

use crate::error::CloError;
use crate::models::FieldValue;
use crate::output::text::Table;
use crate::repl::commands::{self, split_command, Command, Mode};
use crate::repl::console::Console;
use crate::store::{Inbox, ProjectStore, TaskStore};

/// What the enclosing loop should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Leave the nearest enclosing interactive loop.
    Stop,
}

/// Result of one handler: the unconsumed tail of its input, or stop.
enum Step<'a> {
    Chain(&'a str),
    Stop,
}

impl<'a> Step<'a> {
    fn done() -> Self {
        Self::Chain("")
    }

    fn chain(rest: &'a str) -> Self {
        Self::Chain(rest)
    }
}

/// The command-mode interpreter.
///
/// Owns the current mode, the task/project stores and the inbox. Routing is
/// recomputed on every call from the mode and whether a current task
/// exists. Handlers may hand back unconsumed input, which is dispatched
/// again before returning, so `t a buy milk` switches to task mode and
/// adds a task in one line.
pub struct Dispatcher<C: Console> {
    mode: Mode,
    tasks: TaskStore,
    projects: ProjectStore,
    inbox: Inbox,
    console: C,
    depth: usize,
}

impl<C: Console> Dispatcher<C> {
    pub fn new(tasks: TaskStore, projects: ProjectStore, inbox: Inbox, console: C) -> Self {
        Self {
            mode: Mode::Main,
            tasks,
            projects,
            inbox,
            console,
            depth: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn prompt(&self) -> String {
        if self.depth == 0 {
            self.mode.prompt().to_string()
        } else {
            format!("inbox[{}] {}", self.depth, self.mode.prompt())
        }
    }

    /// Interpret one line of input. Leftover input from each handler is
    /// dispatched in turn until it is used up, a lookup fails or a command
    /// stops the loop.
    pub fn dispatch(&mut self, line: &str) -> Flow {
        let mut line = line;
        loop {
            let (head, rest) = split_command(line);
            let Some(command) = commands::resolve(self.mode, self.tasks.has_current(), head) else {
                debug!(mode = self.mode.as_str(), head, "command not found");
                self.console.write_line("Command not found");
                return Flow::Continue;
            };
            debug!(mode = self.mode.as_str(), head, ?command, "dispatching");

            let remainder = match self.execute(command, rest) {
                Ok(Step::Stop) => return Flow::Stop,
                Ok(Step::Chain(remainder)) => remainder,
                Err(e) => {
                    warn!(head, code = e.code.as_str(), error = %e, "command failed");
                    self.console
                        .write_line(&format!("Error in '{head}' [{}]: {}", e.code.as_str(), e.message));
                    return Flow::Continue;
                }
            };
            if remainder.trim().is_empty() {
                return Flow::Continue;
            }
            line = remainder;
        }
    }

    /// Read and dispatch lines until a command stops the loop. End of input
    /// saves everything, like `q`.
    pub fn run(&mut self) {
        loop {
            let prompt = self.prompt();
            let Some(line) = self.console.read_line(&prompt) else {
                info!("end of input");
                self.quit();
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if self.dispatch(&line) == Flow::Stop {
                break;
            }
        }
    }

    /// Process inbox line `index` in a nested loop, then drop it from the
    /// inbox.
    pub fn process_item(&mut self, index: usize) -> Result<(), CloError> {
        let item = self
            .inbox
            .get(index)
            .ok_or_else(|| CloError::index_out_of_range(index, self.inbox.len()))?
            .to_string();
        self.process_line(&item);
        // The nested loop may have captured or processed other lines, so
        // find the copy that was processed rather than the first match.
        match self.inbox.position_near(index, &item) {
            Some(pos) => {
                self.inbox.remove(pos)?;
            }
            None => debug!(item = %item, "inbox item already gone"),
        }
        Ok(())
    }

    /// Process every inbox line oldest first, then empty the inbox whatever
    /// the nested loops did.
    pub fn process_all(&mut self) {
        let items: Vec<String> = self.inbox.lines().to_vec();
        for item in &items {
            self.process_line(item);
        }
        self.inbox.clear();
    }

    /// Nested loop for one inbox line: starts in main mode, ends on the
    /// stop signal or end of input, then restores the interrupted mode.
    /// Edits made inside persist.
    fn process_line(&mut self, item: &str) {
        let saved = self.mode;
        self.mode = Mode::Main;
        self.depth += 1;
        self.console.write_line(&format!("Processing: {item}"));
        debug!(depth = self.depth, item, "entering inbox loop");

        loop {
            let prompt = self.prompt();
            let Some(line) = self.console.read_line(&prompt) else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if self.dispatch(&line) == Flow::Stop {
                break;
            }
        }

        debug!(depth = self.depth, "leaving inbox loop");
        self.depth -= 1;
        self.mode = saved;
    }

    fn execute<'a>(&mut self, command: Command, rest: &'a str) -> Result<Step<'a>, CloError> {
        match command {
            Command::SwitchMode(mode) => {
                debug!(from = self.mode.as_str(), to = mode.as_str(), "mode switch");
                self.mode = mode;
                Ok(Step::chain(rest))
            }
            Command::Help => {
                let mut table = Table::new(&["Command", "Meaning"]);
                for (code, cmd) in commands::visible_table(self.mode, self.tasks.has_current()) {
                    table.add_row(vec![code.to_string(), cmd.describe().to_string()]);
                }
                self.show(&table);
                Ok(Step::chain(rest))
            }
            Command::Quit => {
                self.quit();
                Ok(Step::Stop)
            }

            Command::AddTask => {
                self.tasks.add(rest)?;
                self.show(&self.tasks.display_current()?);
                Ok(Step::done())
            }
            Command::ShowTask => {
                self.show(&self.tasks.display_current()?);
                Ok(Step::chain(rest))
            }
            Command::ShowTaskTree => {
                let index = self.tasks.current_index().ok_or_else(CloError::no_current_task)?;
                self.show(&self.tasks.render_with_subtasks(index)?);
                Ok(Step::chain(rest))
            }
            Command::ListTasks { include_closed } => {
                self.show(&self.tasks.display_all(include_closed));
                Ok(Step::chain(rest))
            }
            Command::EditTask => {
                self.show(&self.tasks.display_current()?);
                self.mode = Mode::Edit;
                Ok(Step::chain(rest))
            }
            Command::CloseTask => {
                self.tasks.close_current()?;
                Ok(Step::chain(rest))
            }
            Command::ReopenTask => {
                self.tasks.reopen_current()?;
                Ok(Step::chain(rest))
            }
            Command::SetTask(field) => {
                if let Some(notice) = self.tasks.modify_current(field, FieldValue::One(rest.to_string()))? {
                    self.console.write_line(&notice);
                }
                Ok(Step::done())
            }
            Command::RemoveFromTask(field) => {
                let value = rest.trim();
                if !self.tasks.remove_from_current(field, value)? {
                    self.console
                        .write_line(&format!("'{value}' is not in {}", field.as_str()));
                }
                Ok(Step::done())
            }
            Command::MakeSubtask => {
                let (index, rest) = take_index(rest)?;
                self.tasks.make_subtask_of_current(index)?;
                Ok(Step::chain(rest))
            }
            Command::RemoveSubtask => {
                let (index, rest) = take_index(rest)?;
                if !self.tasks.remove_subtask_of_current(index)? {
                    self.console
                        .write_line(&format!("Task {index} is not a subtask of the current task"));
                }
                Ok(Step::chain(rest))
            }
            Command::SelectTask => {
                let (index, rest) = take_index(rest)?;
                self.tasks.set_current(index)?;
                self.show(&self.tasks.display_current()?);
                Ok(Step::chain(rest))
            }
            Command::RemoveTask => {
                let (index, rest) = take_index(rest)?;
                let removed = self.tasks.remove(index)?;
                self.console
                    .write_line(&format!("Removed task: {}", removed.description()));
                Ok(Step::chain(rest))
            }

            Command::AddProject => {
                self.projects.add(rest)?;
                for table in self.projects.display_current(false, &self.tasks)? {
                    self.show(&table);
                }
                Ok(Step::done())
            }
            Command::ShowProject { with_tasks } => {
                for table in self.projects.display_current(with_tasks, &self.tasks)? {
                    self.show(&table);
                }
                Ok(Step::chain(rest))
            }
            Command::ListProjects { with_tasks } => {
                for table in self.projects.display_all(with_tasks, &self.tasks) {
                    self.show(&table);
                }
                Ok(Step::chain(rest))
            }
            Command::SelectProject => {
                let (index, rest) = take_index(rest)?;
                self.projects.set_current(index)?;
                for table in self.projects.display_current(false, &self.tasks)? {
                    self.show(&table);
                }
                Ok(Step::chain(rest))
            }
            Command::SetProject(field) => {
                self.projects
                    .modify_current(field, FieldValue::One(rest.trim().to_string()))?;
                Ok(Step::done())
            }

            Command::Capture => {
                self.inbox.add(rest)?;
                Ok(Step::done())
            }
            Command::ListInbox => {
                self.show(&self.inbox.display());
                Ok(Step::chain(rest))
            }
            Command::ProcessItem => {
                let (index, rest) = take_index(rest)?;
                self.process_item(index)?;
                Ok(Step::chain(rest))
            }
            Command::ProcessAll => {
                self.process_all();
                Ok(Step::chain(rest))
            }

            Command::ActiveTasks => {
                let indices = self.tasks.open_indices();
                self.show(&self.tasks.display_indices(&indices));
                Ok(Step::chain(rest))
            }
        }
    }

    /// Flush every store. Failures are reported and do not prevent the
    /// others from being written.
    fn quit(&mut self) {
        let results = [
            ("tasks", self.tasks.close()),
            ("projects", self.projects.close()),
            ("inbox", self.inbox.close()),
        ];
        for (what, result) in results {
            match result {
                Ok(()) => debug!(what, "saved"),
                Err(e) => {
                    warn!(what, error = %e, "save failed");
                    self.console
                        .write_line(&format!("Could not save {what} [{}]: {}", e.code.as_str(), e.message));
                }
            }
        }
        info!(depth = self.depth, "stopping");
    }

    fn show(&mut self, table: &Table) {
        self.console.write_line(&table.render());
    }
}

/// Consume a leading index token, returning it with the rest of the input.
fn take_index(rest: &str) -> Result<(usize, &str), CloError> {
    let (token, remainder) = split_command(rest);
    if token.is_empty() {
        return Err(CloError::invalid_value("Expected an index"));
    }
    let index = token
        .parse()
        .map_err(|_| CloError::invalid_value(format!("Expected an index, got '{token}'")))?;
    Ok((index, remainder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRecords;
    use crate::models::{Project, Task, TaskState};
    use crate::repl::console::ScriptedConsole;

    struct Harness {
        tasks: MemoryRecords<Task>,
        projects: MemoryRecords<Project>,
        inbox: MemoryRecords<String>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_inbox(&[])
        }

        fn with_inbox(lines: &[&str]) -> Self {
            Self {
                tasks: MemoryRecords::default(),
                projects: MemoryRecords::default(),
                inbox: MemoryRecords::new(lines.iter().map(|l| l.to_string()).collect()),
            }
        }

        fn dispatcher(&self, input: &[&str]) -> Dispatcher<ScriptedConsole> {
            Dispatcher::new(
                TaskStore::load(Box::new(self.tasks.clone())),
                ProjectStore::load(Box::new(self.projects.clone())),
                Inbox::load(Box::new(self.inbox.clone())),
                ScriptedConsole::new(input.iter().copied()),
            )
        }
    }

    fn descriptions(d: &Dispatcher<ScriptedConsole>) -> Vec<String> {
        d.tasks()
            .tasks()
            .iter()
            .map(|t| t.description().to_string())
            .collect()
    }

    #[test]
    fn test_chained_add_from_main() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        assert_eq!(d.dispatch("t a buy milk"), Flow::Continue);
        assert_eq!(d.mode(), Mode::Task);
        assert_eq!(d.tasks().current().unwrap().description(), "buy milk");
        assert_eq!(d.tasks().current_index(), Some(0));
    }

    #[test]
    fn test_chained_equals_sequential() {
        let h = Harness::new();
        let mut chained = h.dispatcher(&[]);
        chained.dispatch("t a buy milk");

        let h2 = Harness::new();
        let mut sequential = h2.dispatcher(&[]);
        sequential.dispatch("t");
        sequential.dispatch("a buy milk");

        assert_eq!(chained.mode(), sequential.mode());
        assert_eq!(descriptions(&chained), descriptions(&sequential));
        assert_eq!(chained.tasks().current_index(), sequential.tasks().current_index());
    }

    #[test]
    fn test_long_chain_runs_without_recursion() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        let line = format!("{}t a deep", "m ".repeat(100_000));
        assert_eq!(d.dispatch(&line), Flow::Continue);
        assert_eq!(d.mode(), Mode::Task);
        assert_eq!(descriptions(&d), ["deep"]);
    }

    #[test]
    fn test_chain_stops_at_first_unknown_token() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t zz a never");
        assert_eq!(d.mode(), Mode::Task);
        assert!(d.tasks().is_empty());
        assert_eq!(d.console().output().last().unwrap(), "Command not found");
    }

    #[test]
    fn test_unknown_command_changes_nothing() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a first");
        let before_tasks = d.tasks().tasks().to_vec();
        let before_cursor = d.tasks().current_index();

        assert_eq!(d.dispatch("zz top"), Flow::Continue);
        assert_eq!(d.console().output().last().unwrap(), "Command not found");
        assert_eq!(d.mode(), Mode::Task);
        assert_eq!(d.tasks().tasks(), &before_tasks[..]);
        assert_eq!(d.tasks().current_index(), before_cursor);
    }

    #[test]
    fn test_editing_unavailable_without_current_task() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t");
        d.dispatch("te 2h");
        assert_eq!(d.console().output().last().unwrap(), "Command not found");
        // `p` falls through to the global project switch
        d.dispatch("p");
        assert_eq!(d.mode(), Mode::Project);
    }

    #[test]
    fn test_set_attributes_on_current_task() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a write report");
        d.dispatch("p 1");
        d.dispatch("pr work");
        d.dispatch("co office");
        d.dispatch("co laptop");
        d.dispatch("te 2 hours");
        let task = d.tasks().current().unwrap();
        assert_eq!(task.priority(), 1);
        assert_eq!(task.projects(), ["work"]);
        assert_eq!(task.contexts(), ["office", "laptop"]);
        assert_eq!(task.time_estimate(), Some("2 hours"));
    }

    #[test]
    fn test_bad_priority_reported_and_not_applied() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a x");
        assert_eq!(d.dispatch("p soon"), Flow::Continue);
        assert!(d.console().output().last().unwrap().contains("INVALID_VALUE"));
        assert_eq!(d.tasks().current().unwrap().priority(), 3);
    }

    #[test]
    fn test_unparseable_due_date_prints_notice() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a x");
        d.dispatch("dd someday");
        assert!(d.console().output().last().unwrap().contains("could not be parsed"));
        assert!(d.tasks().current().unwrap().due().is_none());
    }

    #[test]
    fn test_close_then_chain_display() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a x");
        d.dispatch("c da");
        assert_eq!(d.tasks().current().unwrap().state(), TaskState::Closed);
        // closed task left out of the open listing
        assert!(!d.console().output().last().unwrap().contains("| x "));
    }

    #[test]
    fn test_select_out_of_range_keeps_cursor() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a one");
        d.dispatch("a two");
        d.dispatch("sc 7");
        assert!(d.console().output().last().unwrap().contains("INDEX_OUT_OF_RANGE"));
        assert_eq!(d.tasks().current_index(), Some(1));
        d.dispatch("sc 0 d");
        assert_eq!(d.tasks().current_index(), Some(0));
    }

    #[test]
    fn test_edit_mode_round_trip() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a x");
        d.dispatch("e");
        assert_eq!(d.mode(), Mode::Edit);
        assert_eq!(d.prompt(), "e> ");
        d.dispatch("ts 30m");
        assert_eq!(d.tasks().current().unwrap().time_spent(), Some("30m"));
        d.dispatch("q");
        assert_eq!(d.mode(), Mode::Task);
        d.dispatch("q");
        assert_eq!(d.mode(), Mode::Main);
    }

    #[test]
    fn test_subtask_commands() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a parent");
        d.dispatch("a child");
        d.dispatch("sc 0 ms 1 ds");
        let child_id = d.tasks().get(1).unwrap().id().to_string();
        assert_eq!(d.tasks().get(0).unwrap().subtasks(), [child_id]);
        assert!(d.console().output().last().unwrap().contains("|   child"));

        d.dispatch("sc 1 ms 0");
        assert!(d.console().output().last().unwrap().contains("CYCLE_DETECTED"));
    }

    #[test]
    fn test_project_mode() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a dig beds");
        d.dispatch("pr garden");
        d.dispatch("m p a garden");
        assert_eq!(d.mode(), Mode::Project);
        d.dispatch("n buy seeds");
        d.dispatch("s active");
        let project = d.projects().current().unwrap();
        assert_eq!(project.notes, ["buy seeds"]);
        assert_eq!(project.state, "active");

        d.dispatch("dt");
        assert!(d.console().output().last().unwrap().contains("dig beds"));
    }

    #[test]
    fn test_filter_active_tasks() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a done already");
        d.dispatch("c");
        d.dispatch("a still open");
        d.dispatch("m f act");
        let out = d.console().output().last().unwrap();
        assert!(out.contains("still open"));
        assert!(!out.contains("done already"));
    }

    #[test]
    fn test_quit_saves_everything() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("t a x");
        d.dispatch("m p a garden");
        d.dispatch("m i a call bank");
        d.dispatch("m");
        assert_eq!(d.dispatch("q"), Flow::Stop);
        assert_eq!(h.tasks.snapshot().len(), 1);
        assert_eq!(h.projects.snapshot()[0].description, "garden");
        assert_eq!(h.inbox.snapshot(), ["call bank"]);
    }

    #[test]
    fn test_run_saves_on_end_of_input() {
        let h = Harness::new();
        let mut d = h.dispatcher(&["t a from script", ""]);
        d.run();
        assert_eq!(h.tasks.snapshot()[0].description(), "from script");
    }

    #[test]
    fn test_process_all_in_order_and_empties_inbox() {
        let h = Harness::with_inbox(&["x", "y"]);
        // each nested loop stops immediately
        let mut d = h.dispatcher(&["q", "q"]);
        d.dispatch("i pa");
        let processed: Vec<&String> = d
            .console()
            .output()
            .iter()
            .filter(|l| l.starts_with("Processing: "))
            .collect();
        assert_eq!(processed, ["Processing: x", "Processing: y"]);
        assert!(d.inbox().is_empty());
        assert_eq!(d.mode(), Mode::Inbox);
    }

    #[test]
    fn test_nested_stop_does_not_end_outer_loop() {
        let h = Harness::with_inbox(&["buy milk"]);
        let mut d = h.dispatcher(&[
            "i p 0",
            "t a buy milk",
            "m",
            "q",
            "d",
            "m",
            "q",
        ]);
        d.run();
        assert_eq!(d.console().remaining_input(), 0);
        assert_eq!(h.tasks.snapshot()[0].description(), "buy milk");
        assert!(h.inbox.snapshot().is_empty());
        let prompts = d.console().prompts();
        assert_eq!(prompts[0], ">> ");
        assert_eq!(prompts[1], "inbox[1] >> ");
        assert_eq!(prompts[2], "inbox[1] t> ");
        // back in the outer loop, in the mode the item interrupted
        assert_eq!(prompts[4], "i> ");
    }

    #[test]
    fn test_process_item_removes_the_processed_duplicate() {
        let h = Harness::with_inbox(&["x", "y", "x"]);
        let mut d = h.dispatcher(&["q"]);
        d.process_item(2).unwrap();
        assert_eq!(d.inbox().lines(), ["x", "y"]);
    }

    #[test]
    fn test_process_item_finds_item_after_earlier_lines_removed() {
        let h = Harness::with_inbox(&["x", "y", "x"]);
        // the nested loop drops the first line, shifting the item down
        let mut d = h.dispatcher(&["m i p 0", "q", "m q"]);
        d.process_item(2).unwrap();
        assert_eq!(d.inbox().lines(), ["y"]);
    }

    #[test]
    fn test_process_item_restores_mode_on_end_of_input() {
        let h = Harness::with_inbox(&["a", "b"]);
        let mut d = h.dispatcher(&[]);
        d.dispatch("i");
        d.process_item(1).unwrap();
        assert_eq!(d.mode(), Mode::Inbox);
        assert_eq!(d.inbox().lines(), ["a"]);
        assert!(d.process_item(4).is_err());
    }

    #[test]
    fn test_help_lists_mode_commands() {
        let h = Harness::new();
        let mut d = h.dispatcher(&[]);
        d.dispatch("f h");
        let out = d.console().output().last().unwrap();
        assert!(out.contains("act"));
        assert!(out.contains("return to main mode"));
    }
}
