//! Argument parsing, dispatch and terminal output for the `indice` binary.
//! Not part of the library API.

mod commands;
mod print;
mod setup;

pub use commands::run;
