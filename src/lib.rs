//! # gridclerk
//!
//! Structured JSON extraction from OCR Markdown for Chinese power-grid
//! engineering documents.
//!
//! An external OCR/layout pipeline renders investment approvals, settlement
//! audits, and test records as Markdown with HTML-like table markup. This
//! library reconstructs the *logical* structure behind the physically merged,
//! loosely numbered source tables and maps it onto the strict per-type JSON
//! schemas of the downstream system.
//!
//! ## Quick Start
//!
//! ```
//! use gridclerk::{convert_markdown, to_json, JsonFormat};
//!
//! fn main() -> gridclerk::Result<()> {
//!     let markdown = "关于某工程可行性研究报告的批复\n<table>...</table>";
//!     let result = convert_markdown(markdown);
//!     println!("{}", to_json(&result, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Markup extraction**: `<table>` blocks split into raw cells with
//!   rowspan/colspan attributes
//! - **Grid reconstruction**: merge spans expanded into a dense logical grid
//! - **Table routing**: header-signature matching names each table and joins
//!   page-break continuations
//! - **Level classification**: numbering taxonomy (一、 / 1、 / （1） / 其中:)
//!   assigns hierarchy depth
//! - **Tree building**: classified rows become an ordered forest
//! - **Schema mapping**: one typed payload per document type
//!
//! The core is pure and synchronous: each conversion owns its grids, trees,
//! and result for its lifetime, so concurrent conversions need no
//! synchronization. Content problems degrade to partial payloads; only the
//! unrecognizable-document case surfaces, and then as the published
//! `unknown` JSON payload rather than an error.

pub mod detect;
pub mod error;
pub mod json;
pub mod model;
pub mod options;
pub mod parser;
pub mod schema;

// Re-export commonly used types
pub use detect::{detect_document_type, DocumentType};
pub use error::{Error, Result};
pub use json::{to_json, JsonFormat};
pub use model::{
    AttrValue, ClassifiedRow, GridCell, LogicalGrid, LogicalTable, PhysicalTable, RawCell,
    TreeNode,
};
pub use options::ConvertOptions;
pub use schema::{DocumentData, DocumentResult};

/// Convert OCR Markdown to a typed document result with default options.
///
/// Never fails on document content: an unrecognizable document yields the
/// published `unknown` payload, and malformed tables degrade locally.
pub fn convert_markdown(markdown: &str) -> DocumentResult {
    convert_markdown_with_options(markdown, &ConvertOptions::default())
}

/// Convert OCR Markdown to a typed document result.
pub fn convert_markdown_with_options(
    markdown: &str,
    options: &ConvertOptions,
) -> DocumentResult {
    let doc_type = match options
        .document_type
        .or_else(|| detect::detect_document_type(markdown))
    {
        Some(doc_type) => doc_type,
        None => {
            log::info!("convert: no document type recognized");
            return DocumentResult::unknown();
        }
    };
    log::info!("convert: document type {}", doc_type);

    let grids: Vec<LogicalGrid> = if doc_type.is_record_type() {
        // Record payloads are extracted by the sibling OCR-record parser.
        Vec::new()
    } else {
        parser::extract_tables(markdown, options.parallel)
            .iter()
            .map(parser::reconstruct_grid)
            .collect()
    };
    log::debug!("convert: reconstructed {} grids", grids.len());

    schema::map_document(doc_type, &grids, markdown, options)
}

/// Builder for converting documents with configured options.
///
/// # Example
///
/// ```
/// use gridclerk::{DocumentType, GridClerk, JsonFormat};
///
/// let json = GridClerk::new()
///     .with_document_type(DocumentType::SettlementReport)
///     .sequential()
///     .convert("<table>...</table>")
///     .to_json(JsonFormat::Compact)?;
/// # Ok::<(), gridclerk::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridClerk {
    options: ConvertOptions,
}

impl GridClerk {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a document type instead of auto-detecting.
    pub fn with_document_type(mut self, doc_type: DocumentType) -> Self {
        self.options = self.options.with_document_type(doc_type);
        self
    }

    /// Disable parallel table reconstruction.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set the router's fuzzy-match threshold.
    pub fn with_fuzzy_threshold(mut self, threshold: f32) -> Self {
        self.options = self.options.with_fuzzy_threshold(threshold);
        self
    }

    /// Convert a Markdown document.
    pub fn convert(&self, markdown: &str) -> ConvertedDocument {
        ConvertedDocument {
            result: convert_markdown_with_options(markdown, &self.options),
        }
    }
}

/// Result wrapper returned by [`GridClerk::convert`].
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    result: DocumentResult,
}

impl ConvertedDocument {
    /// The typed result.
    pub fn result(&self) -> &DocumentResult {
        &self.result
    }

    /// Consume the wrapper and take the typed result.
    pub fn into_result(self) -> DocumentResult {
        self.result
    }

    /// Serialize to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(&self.result, format)
    }
}
