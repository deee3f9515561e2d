pub mod commands;
pub mod document;
pub mod terminal;
pub mod watch;
