//! Document type detection.
//!
//! The OCR collaborator hands this crate Markdown whose title lines carry the
//! issuing-document wording (批复/评审/报告...). Detection is a fixed keyword
//! match over the whole Markdown text; record-table markers are checked before
//! document-title keywords, so a settlement report that quotes a noise-record
//! form is still routed by its own table marker first.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The nine supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// 可研批复投资估算 — feasibility study approval, investment estimate.
    FsApproval,
    /// 可研评审投资估算 — feasibility study review.
    FsReview,
    /// 初设批复概算投资 — preliminary design approval.
    PdApproval,
    /// 初设评审 — preliminary design review (multi-table).
    DesignReview,
    /// 结算审计报告 — settlement audit report (multi-table).
    SettlementReport,
    /// 竣工决算审核 — final account review (free-text sourced).
    FinalAccount,
    /// 污染源噪声检测原始记录表 — noise test record.
    NoiseRec,
    /// 工频电场/磁场环境检测原始记录表 — electromagnetic test record.
    EmRec,
    /// 工况信息 — equipment operating-status log.
    OpStatus,
}

impl DocumentType {
    /// The wire identifier used in the JSON output contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::FsApproval => "fsApproval",
            DocumentType::FsReview => "fsReview",
            DocumentType::PdApproval => "pdApproval",
            DocumentType::DesignReview => "designReview",
            DocumentType::SettlementReport => "settlementReport",
            DocumentType::FinalAccount => "finalAccount",
            DocumentType::NoiseRec => "noiseRec",
            DocumentType::EmRec => "emRec",
            DocumentType::OpStatus => "opStatus",
        }
    }

    /// Whether this type routes multiple named logical tables.
    pub fn is_multi_table(&self) -> bool {
        matches!(
            self,
            DocumentType::SettlementReport | DocumentType::DesignReview
        )
    }

    /// Maximum tree depth for this type's hierarchical output.
    ///
    /// Flat and record types report 0.
    pub fn max_depth(&self) -> u8 {
        match self {
            DocumentType::FsApproval => 3,
            DocumentType::FsReview | DocumentType::PdApproval => 2,
            DocumentType::DesignReview => 3,
            _ => 0,
        }
    }

    /// Whether payload extraction is delegated to the sibling OCR-record
    /// parser (this core only labels the document).
    pub fn is_record_type(&self) -> bool {
        matches!(
            self,
            DocumentType::NoiseRec | DocumentType::EmRec | DocumentType::OpStatus
        )
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fsApproval" => Ok(DocumentType::FsApproval),
            "fsReview" => Ok(DocumentType::FsReview),
            "pdApproval" => Ok(DocumentType::PdApproval),
            "designReview" => Ok(DocumentType::DesignReview),
            "settlementReport" => Ok(DocumentType::SettlementReport),
            "finalAccount" => Ok(DocumentType::FinalAccount),
            "noiseRec" => Ok(DocumentType::NoiseRec),
            "emRec" => Ok(DocumentType::EmRec),
            "opStatus" => Ok(DocumentType::OpStatus),
            other => Err(Error::UnknownDocumentType(other.to_string())),
        }
    }
}

/// Record-table markers, matched before document-title keywords.
const RECORD_MARKERS: &[(&str, DocumentType)] = &[
    ("污染源噪声检测原始记录表", DocumentType::NoiseRec),
    ("工频电场/磁场环境检测原始记录表", DocumentType::EmRec),
    ("工频电场磁场环境检测原始记录表", DocumentType::EmRec),
    ("表1检测工况", DocumentType::OpStatus),
    ("附件2 工况信息", DocumentType::OpStatus),
];

/// Document-title keywords, in precedence order.
const TITLE_KEYWORDS: &[(&str, DocumentType)] = &[
    ("竣工决算", DocumentType::FinalAccount),
    ("决算审核", DocumentType::FinalAccount),
    ("结算报告", DocumentType::SettlementReport),
    ("审计报告", DocumentType::SettlementReport),
    ("初设评审", DocumentType::DesignReview),
    ("初步设计的评审意见", DocumentType::DesignReview),
    ("初设批复", DocumentType::PdApproval),
    ("初步设计的批复", DocumentType::PdApproval),
    ("可研评审", DocumentType::FsReview),
    ("可行性研究报告的评审意见", DocumentType::FsReview),
    ("可研批复", DocumentType::FsApproval),
    ("可行性研究报告的批复", DocumentType::FsApproval),
];

/// Detect the document type from Markdown content.
///
/// Returns `None` when no keyword matches; the caller maps that to the
/// published `unknown` error payload.
pub fn detect_document_type(markdown: &str) -> Option<DocumentType> {
    for (marker, doc_type) in RECORD_MARKERS {
        if markdown.contains(marker) {
            log::debug!("detect: record marker {:?} -> {}", marker, doc_type);
            return Some(*doc_type);
        }
    }

    for (keyword, doc_type) in TITLE_KEYWORDS {
        if markdown.contains(keyword) {
            log::debug!("detect: title keyword {:?} -> {}", keyword, doc_type);
            return Some(*doc_type);
        }
    }

    None
}
