//! Core utilities for the signet signing tools
//!
//! Shared functionality used by the Android crate and the CLI:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based project layout and lookup names
//! - **Process execution**: running the Gradle wrapper with streamed output
//!
//! # Example
//!
//! ```rust,no_run
//! use signet_core::config::Config;
//!
//! let config = Config::load(None)?;
//! println!("android root: {}", config.schema.general.android_dir);
//! # Ok::<(), signet_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};
