//! JSON rendering of conversion results.

use crate::error::Result;
use crate::schema::DocumentResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a conversion result to JSON.
pub fn to_json(result: &DocumentResult, format: JsonFormat) -> Result<String> {
    let rendered = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(result)?,
        JsonFormat::Compact => serde_json::to_string(result)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_has_newlines() {
        let json = to_json(&DocumentResult::unknown(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("document_type"));
    }

    #[test]
    fn test_compact_has_no_newlines() {
        let json = to_json(&DocumentResult::unknown(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }
}
