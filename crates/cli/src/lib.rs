//! CLI utilities for the signet tools
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Secret masking for terminal output

#![warn(missing_docs)]

pub mod output;
