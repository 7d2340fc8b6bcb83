mod converter;
mod converter_commands;

pub use converter::{list_options, report_saved, run_interactive, Converter};
pub use converter_commands::ConverterCommands;
