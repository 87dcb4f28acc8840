//! JSON rendering for outlines.

use crate::error::{Error, Result};
use crate::model::Outline;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize an outline as `{"title": ..., "outline": [...]}`.
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(outline),
        JsonFormat::Compact => serde_json::to_string(outline),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse an outline previously written by [`to_json`].
pub fn from_json(json: &str) -> Result<Outline> {
    serde_json::from_str(json).map_err(|e| Error::Render(format!("JSON parse error: {}", e)))
}
