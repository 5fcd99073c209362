//! aql-core: assessment scoring, step banks, and sessions.
//!
//! This crate defines the step bank data model, the additive scoring and
//! percentage normalization rules, and the session state machine that the
//! `aql` command line builds on.

pub mod bank;
pub mod config;
pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod report;
pub mod scorer;
pub mod scoring;
pub mod session;
pub mod sheet;
