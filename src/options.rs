//! Conversion options.

use crate::detect::DocumentType;

/// Options for converting a Markdown document.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Explicit document type; skips title-keyword auto-detection.
    pub document_type: Option<DocumentType>,

    /// Whether to reconstruct tables in parallel.
    pub parallel: bool,

    /// Fraction of a header signature's keywords that must be present for
    /// the router's containment fallback. The exact pass always runs first;
    /// this threshold is a tunable, not a contract.
    pub fuzzy_threshold: f32,
}

impl ConvertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a document type instead of auto-detecting.
    pub fn with_document_type(mut self, doc_type: DocumentType) -> Self {
        self.document_type = Some(doc_type);
        self
    }

    /// Enable or disable parallel table reconstruction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the router's fuzzy-match threshold (clamped to 0.0..=1.0).
    pub fn with_fuzzy_threshold(mut self, threshold: f32) -> Self {
        self.fuzzy_threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            document_type: None,
            parallel: true,
            fuzzy_threshold: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConvertOptions::default();
        assert!(options.document_type.is_none());
        assert!(options.parallel);
        assert_eq!(options.fuzzy_threshold, 0.8);
    }

    #[test]
    fn test_builder() {
        let options = ConvertOptions::new()
            .with_document_type(DocumentType::SettlementReport)
            .sequential()
            .with_fuzzy_threshold(1.5);
        assert_eq!(options.document_type, Some(DocumentType::SettlementReport));
        assert!(!options.parallel);
        assert_eq!(options.fuzzy_threshold, 1.0);
    }
}
