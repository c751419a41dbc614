//! Internal modules for the trivia terminal front-end.
//!
//! This library provides input parsing, configuration loading, and text
//! rendering used by the trivia_cli binary.

pub mod commands;
pub mod config;
pub mod render;
