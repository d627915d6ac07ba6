pub mod cli;
pub mod commands;
pub mod console;
pub mod wiring;

pub use cli::Cli;
pub use commands::{parse_command, Command, CommandError};
pub use console::{format_view, ConsoleHost};
pub use wiring::{build_controller, open_store};
