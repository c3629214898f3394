//! Coreport Links: consistency evaluation, link operations and
//! inconsistency repair for user/company relations.

pub mod config;
pub mod error;
pub mod evaluator;
#[cfg(test)]
mod memory;
pub mod report;
pub mod resolver;
pub mod service;

pub use config::LinkConfig;
pub use error::LinkError;
pub use evaluator::{PairShape, PairStatus, evaluate};
pub use report::{ConsistencyReport, ReportTotals};
pub use resolver::{Repair, Resolution, plan_repair};
pub use service::{LinkAction, LinkReceipt, LinkService};
