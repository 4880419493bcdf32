//! High-level commands for kuduscript operations.
//!
//! These are the entry points frontends call; they tie together locating,
//! strategy dispatch, rendering and writing.

pub mod generate;

pub use generate::{GenerateCommand, GenerationPlan, GenerationReport};
