//! labrun — task dispatcher for bioinformatics project templates.
//!
//! Wraps conda, Snakemake, pytest and Docker behind a flat set of
//! idempotent operations. Every operation is planned from an observed
//! snapshot of the project, then executed step by step.

pub mod cli;
pub mod core;
pub mod resources;
pub mod transport;
