//! Domain models for Coreport.
//!
//! These are the core types shared across all crates.

pub mod company;
pub mod link;
pub mod user;
