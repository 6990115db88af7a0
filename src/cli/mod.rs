pub mod core;
pub mod output;
pub mod render;
mod shell;

pub use shell::run_cli;
