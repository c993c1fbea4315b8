pub mod args;
pub mod commands;

pub use args::{Cli, Commands, OutputOptions};
pub use commands::run;
