//! Link engine configuration.

use serde::Deserialize;

/// Configuration for the link service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Reject `remove_link` while the user is still employee or
    /// responsible in the company. When off (default), the link is removed
    /// and the pair shows up as inconsistent in the report.
    pub strict_unlink: bool,
}

