//! Core dispatch logic — layout, manifest, observation, planning, execution.

pub mod error;
pub mod executor;
pub mod hasher;
pub mod layout;
pub mod parser;
pub mod planner;
pub mod prompt;
pub mod state;
pub mod status;
pub mod types;
