//! Configuration loading and schema definitions
//!
//! Project layout and credential lookup names, read from an optional TOML file.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
