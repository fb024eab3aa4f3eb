//! Placeholder artifacts — contents materialized when a conventional file is missing.
//!
//! Each generator returns the full file contents. Writing is done by the
//! executor, which never overwrites an existing file.

pub mod docs;
pub mod dockerfile;
pub mod testsuite;
