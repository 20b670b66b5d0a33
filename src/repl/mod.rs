pub mod commands;
pub mod console;
pub mod dispatcher;

pub use commands::{Command, Mode};
pub use console::{Console, ScriptedConsole, StdConsole};
pub use dispatcher::{Dispatcher, Flow};
