//! Ready-made decks used by the command line `demo` subcommand.

pub mod latin;

pub use latin::run as run_latin;
