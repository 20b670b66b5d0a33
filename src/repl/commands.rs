use crate::models::{ProjectField, TaskField};

/// The active command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Main,
    Task,
    Project,
    Inbox,
    Filter,
    /// Focused editing of the current task, entered from task mode with `e`.
    Edit,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Task => "task",
            Self::Project => "project",
            Self::Inbox => "inbox",
            Self::Filter => "filter",
            Self::Edit => "edit",
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Main => ">> ",
            Self::Task => "t> ",
            Self::Project => "p> ",
            Self::Inbox => "i> ",
            Self::Filter => "f> ",
            Self::Edit => "e> ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SwitchMode(Mode),
    Help,
    Quit,

    AddTask,
    ShowTask,
    ShowTaskTree,
    ListTasks { include_closed: bool },
    EditTask,
    CloseTask,
    ReopenTask,
    SetTask(TaskField),
    RemoveFromTask(TaskField),
    MakeSubtask,
    RemoveSubtask,
    SelectTask,
    RemoveTask,

    AddProject,
    ShowProject { with_tasks: bool },
    ListProjects { with_tasks: bool },
    SelectProject,
    SetProject(ProjectField),

    Capture,
    ListInbox,
    ProcessItem,
    ProcessAll,

    ActiveTasks,
}

impl Command {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::SwitchMode(Mode::Main) => "return to main mode",
            Self::SwitchMode(Mode::Task) => "switch to task mode",
            Self::SwitchMode(Mode::Project) => "switch to project mode",
            Self::SwitchMode(Mode::Inbox) => "switch to inbox mode",
            Self::SwitchMode(Mode::Filter) => "switch to filter mode",
            Self::SwitchMode(Mode::Edit) => "return to editing",
            Self::Help => "list the commands of this mode",
            Self::Quit => "save everything and quit",
            Self::AddTask => "add a task <description>",
            Self::ShowTask => "display the current task",
            Self::ShowTaskTree => "display the current task with its subtasks",
            Self::ListTasks { include_closed: false } => "display all open tasks",
            Self::ListTasks { include_closed: true } => "display all tasks, closed included",
            Self::EditTask => "edit the current task",
            Self::CloseTask => "close the current task",
            Self::ReopenTask => "reopen the current task",
            Self::SetTask(TaskField::Priority) => "set priority <number>",
            Self::SetTask(TaskField::Created) => "set created date <date>",
            Self::SetTask(TaskField::Due) => "set due date <date>",
            Self::SetTask(TaskField::TimeEstimate) => "set time estimate <text>",
            Self::SetTask(TaskField::TimeSpent) => "set time spent <text>",
            Self::SetTask(TaskField::Projects) => "add a project <name>",
            Self::SetTask(TaskField::Contexts) => "add a context <name>",
            Self::SetTask(TaskField::BlockedUntil) => "add a blocker <task id or text>",
            Self::SetTask(TaskField::State) => "set state <open|closed>",
            Self::SetTask(TaskField::Subtasks) => "add a subtask <task id>",
            Self::RemoveFromTask(TaskField::Projects) => "remove a project <name>",
            Self::RemoveFromTask(TaskField::Contexts) => "remove a context <name>",
            Self::RemoveFromTask(TaskField::BlockedUntil) => "remove a blocker <text>",
            Self::RemoveFromTask(_) => "remove a value",
            Self::MakeSubtask => "make task <index> a subtask of the current task",
            Self::RemoveSubtask => "drop task <index> from the current task's subtasks",
            Self::SelectTask => "make task <index> current",
            Self::RemoveTask => "delete task <index>",
            Self::AddProject => "add a project <description>",
            Self::ShowProject { with_tasks: false } => "display the current project",
            Self::ShowProject { with_tasks: true } => "display the current project with its tasks",
            Self::ListProjects { with_tasks: false } => "display all projects",
            Self::ListProjects { with_tasks: true } => "display all projects with their tasks",
            Self::SelectProject => "make project <index> current",
            Self::SetProject(ProjectField::Notes) => "add a note <text>",
            Self::SetProject(ProjectField::State) => "set state <text>",
            Self::SetProject(ProjectField::Description) => "set description <text>",
            Self::Capture => "capture a line <text>",
            Self::ListInbox => "list the inbox",
            Self::ProcessItem => "process inbox item <index>",
            Self::ProcessAll => "process the whole inbox, oldest first",
            Self::ActiveTasks => "list all open tasks by index",
        }
    }
}

pub type CommandTable = Vec<(&'static str, Command)>;

/// Mode switches recognised everywhere, after the mode's own table.
pub fn global_table() -> CommandTable {
    vec![
        ("t", Command::SwitchMode(Mode::Task)),
        ("p", Command::SwitchMode(Mode::Project)),
        ("i", Command::SwitchMode(Mode::Inbox)),
        ("f", Command::SwitchMode(Mode::Filter)),
        ("m", Command::SwitchMode(Mode::Main)),
        ("h", Command::Help),
    ]
}

/// The mode's own table. Commands that act on the current task only exist
/// while there is one.
pub fn mode_table(mode: Mode, has_current_task: bool) -> CommandTable {
    match mode {
        Mode::Main => vec![("q", Command::Quit)],
        Mode::Task => {
            let mut table = vec![
                ("a", Command::AddTask),
                ("da", Command::ListTasks { include_closed: false }),
                ("dac", Command::ListTasks { include_closed: true }),
                ("sc", Command::SelectTask),
                ("rm", Command::RemoveTask),
                ("q", Command::SwitchMode(Mode::Main)),
            ];
            if has_current_task {
                table.push(("e", Command::EditTask));
                table.extend(editing_table());
            }
            table
        }
        Mode::Edit => {
            let mut table = vec![("q", Command::SwitchMode(Mode::Task))];
            if has_current_task {
                table.extend(editing_table());
            }
            table
        }
        Mode::Project => vec![
            ("a", Command::AddProject),
            ("d", Command::ShowProject { with_tasks: false }),
            ("dt", Command::ShowProject { with_tasks: true }),
            ("da", Command::ListProjects { with_tasks: false }),
            ("dat", Command::ListProjects { with_tasks: true }),
            ("sc", Command::SelectProject),
            ("n", Command::SetProject(ProjectField::Notes)),
            ("s", Command::SetProject(ProjectField::State)),
            ("de", Command::SetProject(ProjectField::Description)),
            ("q", Command::SwitchMode(Mode::Main)),
        ],
        Mode::Inbox => vec![
            ("a", Command::Capture),
            ("d", Command::ListInbox),
            ("p", Command::ProcessItem),
            ("pa", Command::ProcessAll),
        ],
        Mode::Filter => vec![("act", Command::ActiveTasks)],
    }
}

fn editing_table() -> CommandTable {
    vec![
        ("d", Command::ShowTask),
        ("ds", Command::ShowTaskTree),
        ("c", Command::CloseTask),
        ("o", Command::ReopenTask),
        ("p", Command::SetTask(TaskField::Priority)),
        ("cr", Command::SetTask(TaskField::Created)),
        ("dd", Command::SetTask(TaskField::Due)),
        ("te", Command::SetTask(TaskField::TimeEstimate)),
        ("ts", Command::SetTask(TaskField::TimeSpent)),
        ("pr", Command::SetTask(TaskField::Projects)),
        ("co", Command::SetTask(TaskField::Contexts)),
        ("bu", Command::SetTask(TaskField::BlockedUntil)),
        ("rpr", Command::RemoveFromTask(TaskField::Projects)),
        ("rco", Command::RemoveFromTask(TaskField::Contexts)),
        ("rbu", Command::RemoveFromTask(TaskField::BlockedUntil)),
        ("ms", Command::MakeSubtask),
        ("rms", Command::RemoveSubtask),
    ]
}

/// Look `head` up for `mode`: the mode's own table first, then the global
/// switches.
pub fn resolve(mode: Mode, has_current_task: bool, head: &str) -> Option<Command> {
    mode_table(mode, has_current_task)
        .into_iter()
        .chain(global_table())
        .find(|(code, _)| *code == head)
        .map(|(_, cmd)| cmd)
}

/// Every code reachable from `mode`, shadowed globals removed.
pub fn visible_table(mode: Mode, has_current_task: bool) -> CommandTable {
    let mut table = mode_table(mode, has_current_task);
    for (code, cmd) in global_table() {
        if !table.iter().any(|(c, _)| *c == code) {
            table.push((code, cmd));
        }
    }
    table
}

/// Split a line at its first run of whitespace into `(head, rest)`.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("t a buy milk"), ("t", "a buy milk"));
        assert_eq!(split_command("  da  "), ("da", ""));
        assert_eq!(split_command("a\t  two  words "), ("a", "two  words "));
        assert_eq!(split_command(""), ("", ""));
    }

    #[test]
    fn test_mode_table_shadows_globals() {
        assert_eq!(
            resolve(Mode::Task, true, "p"),
            Some(Command::SetTask(TaskField::Priority))
        );
        assert_eq!(
            resolve(Mode::Inbox, false, "p"),
            Some(Command::ProcessItem)
        );
        assert_eq!(
            resolve(Mode::Main, false, "p"),
            Some(Command::SwitchMode(Mode::Project))
        );
        assert_eq!(
            resolve(Mode::Filter, false, "m"),
            Some(Command::SwitchMode(Mode::Main))
        );
    }

    #[test]
    fn test_editing_commands_need_current_task() {
        assert_eq!(resolve(Mode::Task, false, "pr"), None);
        assert_eq!(resolve(Mode::Task, false, "d"), None);
        assert_eq!(
            resolve(Mode::Task, false, "p"),
            Some(Command::SwitchMode(Mode::Project))
        );
        assert_eq!(
            resolve(Mode::Task, true, "pr"),
            Some(Command::SetTask(TaskField::Projects))
        );
        assert_eq!(
            resolve(Mode::Edit, false, "q"),
            Some(Command::SwitchMode(Mode::Task))
        );
        assert_eq!(resolve(Mode::Edit, false, "te"), None);
    }

    #[test]
    fn test_quit_only_from_main() {
        assert_eq!(resolve(Mode::Main, false, "q"), Some(Command::Quit));
        assert_eq!(
            resolve(Mode::Task, false, "q"),
            Some(Command::SwitchMode(Mode::Main))
        );
        assert_eq!(resolve(Mode::Inbox, false, "q"), None);
    }

    #[test]
    fn test_visible_table_has_unique_codes() {
        for mode in [Mode::Main, Mode::Task, Mode::Project, Mode::Inbox, Mode::Filter, Mode::Edit] {
            let table = visible_table(mode, true);
            let mut codes: Vec<&str> = table.iter().map(|(c, _)| *c).collect();
            let len = codes.len();
            codes.sort_unstable();
            codes.dedup();
            assert_eq!(codes.len(), len, "duplicate code in {} mode", mode.as_str());
        }
    }
}
