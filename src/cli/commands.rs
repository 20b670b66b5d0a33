use std::path::PathBuf;

use clap::Parser;

const VERSION: &str = env!("GIT_VERSION");

#[derive(Parser, Debug)]
#[command(
    name = "clo",
    version = VERSION,
    about = "Interactive command line task and project tracker",
    after_help = "\
MODES:
  Type a mode letter at the prompt to switch: t (tasks), p (projects),
  i (inbox), f (filters), m (back to main). `h` lists the commands of the
  current mode. `q` in main mode saves everything and quits.

CHAINING:
  Input a command did not use is run as the next command, so
  `t a Buy milk` switches to task mode and adds a task in one line.

FILES:
  Stored in the data directory (default ~/.clo): tasks.db, projects.db,
  inbox.txt. A config.json there may rename any of them.

EXIT CODES:
  0  Saved and quit (or end of input)
  1  Startup error (data directory or config unreadable)"
)]
pub struct Cli {
    /// Task store file (overrides config.json)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Data directory
    #[arg(short, long, env = "CLO_HOME")]
    pub dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
