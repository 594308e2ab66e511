//! Command Line Interface (CLI) layer for sarcd.
//!
//! `args` defines the flags, `errors` the CLI-level error type, and `runner`
//! merges flags over an optional JSON config before handing the raster pair
//! to `sarcd::api::process_pair_to_path`.
//!
//! When embedding change detection elsewhere, use `sarcd::api` directly.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
