//! Command-line front end: argument dispatch, formatting and report output.

mod cli;
mod format;
mod report;

pub(crate) use cli::{as_cli, shellexpand};
