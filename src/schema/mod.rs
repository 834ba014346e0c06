//! Schema mapping: from reconstructed tables to the per-type JSON payload.
//!
//! One explicit payload type per document type, joined in an untagged enum,
//! so every field set is checked at compile time rather than assembled from
//! dynamically keyed maps. Selection is a single dispatch on the detected
//! (or explicitly requested) document type.

mod design_review;
mod fields;
mod final_account;
mod investment;
pub mod number;
mod settlement;

use serde::Serialize;

pub use design_review::{
    CostAmountNode, CostDetailNode, DesignReviewData, DesignSummaryNode, ProjectCostAmount,
    ProjectCostDetail,
};
pub use fields::{ColumnMap, FieldSpec};
pub use final_account::{FinalAccountItem, ProjectGroup};
pub use investment::{FsApprovalNode, InvestmentNode};
pub use settlement::{
    CompensationRow, ContractExecutionRow, MaterialAmountRow, MaterialQuantityRow,
    ServiceContractRow, SettlementData, SettlementSummaryRow,
};

use crate::detect::DocumentType;
use crate::model::LogicalGrid;
use crate::options::ConvertOptions;

/// Error message of the published unknown-type payload.
pub const UNRECOGNIZED_MESSAGE: &str = "无法识别的文档类型";

/// Empty `{}` data object, used for unknown and record-type results.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EmptyData {}

/// Schema-specific payload, one variant per document type.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DocumentData {
    /// fsApproval: 3-level trees with construction-scale fields.
    FsApproval(Vec<FsApprovalNode>),
    /// fsReview / pdApproval: 2-level trees.
    Investment(Vec<InvestmentNode>),
    /// designReview: three named tables.
    DesignReview(DesignReviewData),
    /// settlementReport: six named flat tables.
    Settlement(SettlementData),
    /// finalAccount: per-project flat cost rows.
    FinalAccount(Vec<ProjectGroup>),
    /// Record types and the unknown payload.
    Empty(EmptyData),
}

/// Final conversion output: `{"document_type": ..., "data": ...}`, plus an
/// `error` message for the unknown payload.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub document_type: String,
    pub data: DocumentData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentResult {
    /// Build a typed result.
    pub fn new(doc_type: DocumentType, data: DocumentData) -> Self {
        Self {
            document_type: doc_type.as_str().to_string(),
            data,
            error: None,
        }
    }

    /// The published error payload for an unrecognizable document.
    pub fn unknown() -> Self {
        Self {
            document_type: "unknown".to_string(),
            data: DocumentData::Empty(EmptyData {}),
            error: Some(UNRECOGNIZED_MESSAGE.to_string()),
        }
    }

    /// Whether this is the unknown-type payload.
    pub fn is_unknown(&self) -> bool {
        self.error.is_some()
    }
}

/// Map a detected document onto its output payload.
///
/// `grids` are the document's reconstructed tables; `markdown` is the raw
/// input for the free-text finalAccount path. Content problems degrade to
/// partial or empty payloads, never to an error.
pub fn map_document(
    doc_type: DocumentType,
    grids: &[LogicalGrid],
    markdown: &str,
    options: &ConvertOptions,
) -> DocumentResult {
    let data = match doc_type {
        DocumentType::FsApproval => {
            DocumentData::FsApproval(investment::map_fs_approval(grids))
        }
        DocumentType::FsReview => DocumentData::Investment(investment::map_fs_review(grids)),
        DocumentType::PdApproval => DocumentData::Investment(investment::map_pd_approval(grids)),
        DocumentType::DesignReview => DocumentData::DesignReview(
            design_review::map_design_review(grids, options.fuzzy_threshold),
        ),
        DocumentType::SettlementReport => DocumentData::Settlement(settlement::map_settlement(
            grids,
            options.fuzzy_threshold,
        )),
        DocumentType::FinalAccount => {
            DocumentData::FinalAccount(final_account::map_final_account(markdown))
        }
        // Record payloads come from the sibling OCR-record parser; this core
        // only labels them.
        DocumentType::NoiseRec | DocumentType::EmRec | DocumentType::OpStatus => {
            DocumentData::Empty(EmptyData {})
        }
    };
    DocumentResult::new(doc_type, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_payload_shape() {
        let result = DocumentResult::unknown();
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            "{\"document_type\":\"unknown\",\"data\":{},\"error\":\"无法识别的文档类型\"}"
        );
    }

    #[test]
    fn test_typed_result_has_no_error_key() {
        let result = DocumentResult::new(
            DocumentType::SettlementReport,
            DocumentData::Settlement(SettlementData::default()),
        );
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"document_type\":\"settlementReport\""));
    }

    #[test]
    fn test_record_type_maps_to_empty_data() {
        let result = map_document(
            DocumentType::NoiseRec,
            &[],
            "",
            &crate::options::ConvertOptions::default(),
        );
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, "{\"document_type\":\"noiseRec\",\"data\":{}}");
    }
}
