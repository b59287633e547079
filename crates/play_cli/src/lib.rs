//! Terminal front end for the compile-and-play loop.
//!
//! Watches a story file, recompiles it after edits settle, and plays the
//! result line by line on stdout. Choices are picked by number on stdin.

pub mod backends;
pub mod commands;
pub mod host;
pub mod runtime;
pub mod watch;
