//! The sunchain node: a command-line front end to the settlement engine.
//!
//! Each invocation opens the module store, brings its schema up to date, runs one operation and prints the result
//! as JSON. Configuration comes from `SUN_*` environment variables (and a `.env` file, if present).
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
