//! Setup module for the Tile Forge application.
//!
//! This module resolves what to generate and runs the generation.

pub mod execution;
pub mod job;
