//! Interactive play in the terminal

pub mod repl;

pub use repl::{Flow, GameRepl, ReplCommand};
