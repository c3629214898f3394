//! Coreport Core: domain models, request context, error taxonomy and
//! the repository traits shared by every other crate.

pub mod context;
pub mod error;
pub mod models;
pub mod repository;
