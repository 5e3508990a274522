//! CLI module
//!
//! Command-line interface for polling a feed.
//!
//! # Commands
//!
//! - `watch` - Poll and print the current page, paging from stdin
//! - `fetch` - Fetch a single page once
//! - `validate` - Check a feed configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{render_page, ConsoleCommand, Runner};
