pub mod command_set;
pub mod dispatcher;
pub mod parser;

pub use command_set::CommandSet;
pub use parser::{CommandLineParser, GlobalConfiguration, ProcessWorkingDirectory, WorkingDirectory};
