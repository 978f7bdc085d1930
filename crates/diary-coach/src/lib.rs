//! Diary Coach command-line library.
//!
//! Argument parsing and command handlers for the `diary-coach` binary.

pub mod cli;
pub mod commands;
