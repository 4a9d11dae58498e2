//! # deployiq-resolver
//!
//! Matches a reported error against the knowledge base, scores the ranked
//! candidates, and applies the winner one step at a time when the solution
//! has opted in to unattended use.

pub mod application;
pub mod file_changes;
pub mod resolver;
pub mod scoring;
pub mod shell;

pub use application::{ApplicationReport, ApplyContext, REASON_AUTOMATION_NOT_SAFE};
pub use resolver::{AutoResolver, Resolution};
pub use shell::ShellExecutor;
