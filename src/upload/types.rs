// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Successful counting response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub flowers_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Name the service stored the upload under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl CountResponse {
    pub fn new(flowers_count: u64) -> Self {
        Self {
            flowers_count,
            message: None,
            filename: None,
        }
    }
}

/// Text shown to the user for a successful count
pub fn count_message(flowers_count: u64) -> String {
    format!("Flowers Count: {}.", flowers_count)
}
