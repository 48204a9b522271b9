//! JSON reporter
//!
//! Outputs the full ConsistencyResult as pretty-printed JSON.

use crate::models::ConsistencyResult;
use anyhow::Result;

/// Render result as JSON
pub fn render(result: &ConsistencyResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
