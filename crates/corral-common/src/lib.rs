//! # corral-common
//!
//! Shared error definitions, translation options, host facts, and constants
//! used across the corral workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives that the spec model, the
//! internal configuration, and the translator build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod host;
