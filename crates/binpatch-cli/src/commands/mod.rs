//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod apply;
pub mod export;
pub mod scan;
pub mod write;
