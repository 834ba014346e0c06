//! Table routing for multi-table documents.
//!
//! Each reconstructed grid is matched against a registry of known header
//! signatures for the active document type: an exact pass first (every
//! signature keyword present in the normalized header text), then a
//! containment fallback that accepts a configurable fraction of keywords —
//! OCR reorders and splits header cells, so signatures match on content,
//! not position. Same-named tables, including header-less continuations
//! after a page break, are concatenated in document order.

use unicode_normalization::UnicodeNormalization;

use crate::detect::DocumentType;
use crate::model::{LogicalGrid, LogicalTable, ProjectSection};

/// Header rows never span more than this many grid rows.
const MAX_HEADER_ROWS: usize = 3;

/// A known logical table: canonical name plus its header keyword signature.
#[derive(Debug, Clone, Copy)]
pub struct TableSignature {
    /// Canonical table name, used as the output map key.
    pub name: &'static str,

    /// Keywords that together identify the header.
    pub keywords: &'static [&'static str],
}

/// Signature registry for settlement audit reports.
const SETTLEMENT_SIGNATURES: &[TableSignature] = &[
    TableSignature {
        name: "审定结算汇总表",
        keywords: &[
            "序号",
            "审计内容",
            "送审金额（含税）",
            "审定金额（含税）",
            "审定金额（不含税）",
            "增减金额",
            "备注",
        ],
    },
    TableSignature {
        name: "合同执行情况",
        keywords: &[
            "施工单位",
            "中标通知书金额",
            "中标通知书编号",
            "合同金额",
            "结算送审金额",
            "差额",
        ],
    },
    TableSignature {
        name: "赔偿合同",
        keywords: &["合同对方", "赔偿事项", "合同金额", "结算送审金额", "差额"],
    },
    TableSignature {
        name: "物资采购合同1",
        keywords: &["物料名称", "合同数量", "施工图数量", "单价（不含税）", "差额"],
    },
    TableSignature {
        name: "物资采购合同2",
        keywords: &["物料名称", "合同金额（不含税）", "入账金额", "差额", "备注"],
    },
    TableSignature {
        name: "其他服务类合同",
        keywords: &["服务商", "中标通知书", "合同金额", "送审金额", "结算金额"],
    },
];

/// Signature registry for preliminary design reviews.
const DESIGN_REVIEW_SIGNATURES: &[TableSignature] = &[
    TableSignature {
        name: "初设评审的概算投资",
        keywords: &[
            "序号",
            "工程名称",
            "建设规模",
            "静态投资",
            "其中：建设场地征用及清理费",
            "动态投资",
        ],
    },
    TableSignature {
        name: "初设评审的概算投资明细",
        keywords: &[
            "序号",
            "工程或费用名称",
            "建筑工程费",
            "设备购置费",
            "安装工程费",
            "其他费用",
        ],
    },
    TableSignature {
        name: "初设评审的费用金额",
        keywords: &["序号", "费用名称", "金额"],
    },
];

/// The signature registry for a document type. Empty for single-table and
/// record types.
pub fn signatures_for(doc_type: DocumentType) -> &'static [TableSignature] {
    match doc_type {
        DocumentType::SettlementReport => SETTLEMENT_SIGNATURES,
        DocumentType::DesignReview => DESIGN_REVIEW_SIGNATURES,
        _ => &[],
    }
}

/// NFKC-fold and strip all whitespace, so full-width punctuation and header
/// line breaks cannot defeat keyword containment.
pub fn normalize_header_text(text: &str) -> String {
    text.nfkc().filter(|c| !c.is_whitespace()).collect()
}

fn matched_fraction(haystack: &str, signature: &TableSignature) -> f32 {
    let hits = signature
        .keywords
        .iter()
        .filter(|kw| haystack.contains(normalize_header_text(kw).as_str()))
        .count();
    hits as f32 / signature.keywords.len() as f32
}

/// Routes reconstructed grids onto named logical tables.
#[derive(Debug)]
pub struct TableRouter {
    signatures: &'static [TableSignature],
    fuzzy_threshold: f32,
}

impl TableRouter {
    /// Create a router for one document type.
    pub fn new(doc_type: DocumentType, fuzzy_threshold: f32) -> Self {
        Self {
            signatures: signatures_for(doc_type),
            fuzzy_threshold,
        }
    }

    /// Match one grid's header against the registry.
    fn match_signature(&self, grid: &LogicalGrid) -> Option<&'static TableSignature> {
        let haystack = normalize_header_text(&grid.leading_text(MAX_HEADER_ROWS));
        if haystack.is_empty() {
            return None;
        }

        // Exact pass: every keyword present.
        for sig in self.signatures {
            if matched_fraction(&haystack, sig) >= 1.0 {
                return Some(sig);
            }
        }

        // Containment fallback: best signature above the threshold.
        let mut best: Option<(&'static TableSignature, f32)> = None;
        for sig in self.signatures {
            let fraction = matched_fraction(&haystack, sig);
            if fraction >= self.fuzzy_threshold
                && best.map_or(true, |(_, current)| fraction > current)
            {
                best = Some((sig, fraction));
            }
        }
        if let Some((sig, fraction)) = best {
            log::debug!(
                "router: fuzzy matched {:?} at {:.2}",
                sig.name,
                fraction
            );
        }
        best.map(|(sig, _)| sig)
    }

    /// Number of leading rows that belong to the header. A row opening with
    /// a serial token is data, even when its cells echo a column keyword.
    fn header_row_count(&self, grid: &LogicalGrid, signature: &TableSignature) -> usize {
        let mut count = 0;
        for r in 0..grid.rows().min(MAX_HEADER_ROWS) {
            let row = grid.row_texts(r);
            let first = row
                .iter()
                .map(|c| c.trim())
                .find(|c| !c.is_empty())
                .unwrap_or("");
            if crate::parser::is_serial_token(first) {
                break;
            }
            let row_text = normalize_header_text(&row.join(" "));
            let has_keyword = signature
                .keywords
                .iter()
                .any(|kw| row_text.contains(normalize_header_text(kw).as_str()));
            if has_keyword {
                count = r + 1;
            }
        }
        count.max(1)
    }

    /// Assign every grid a canonical name and merge same-named tables.
    ///
    /// Output order follows first appearance in the document. Unmatched
    /// grids that are not continuations are dropped with a warning.
    pub fn route(&self, grids: &[LogicalGrid]) -> Vec<LogicalTable> {
        let mut tables: Vec<LogicalTable> = Vec::new();
        // Name and width of the most recent match, for continuation joining.
        let mut last_matched: Option<(String, usize)> = None;

        for (idx, grid) in grids.iter().enumerate() {
            if grid.is_empty() {
                continue;
            }

            if let Some(sig) = self.match_signature(grid) {
                let header_rows = self.header_row_count(grid, sig);
                let data: Vec<Vec<String>> = (header_rows..grid.rows())
                    .map(|r| grid.row_texts(r))
                    .collect();

                match tables.iter_mut().find(|t| t.name == sig.name) {
                    Some(existing) => existing.rows.extend(data),
                    None => tables.push(LogicalTable {
                        name: sig.name.to_string(),
                        cols: grid.cols(),
                        header: (0..header_rows).map(|r| grid.row_texts(r)).collect(),
                        rows: data,
                    }),
                }
                last_matched = Some((sig.name.to_string(), grid.cols()));
                continue;
            }

            // Continuation: a header-less table after a page break keeps the
            // previous table's column count.
            if let Some((name, cols)) = &last_matched {
                if grid.cols() == *cols {
                    log::debug!(
                        "router: table {} continues {:?} across a page break",
                        idx,
                        name
                    );
                    if let Some(existing) = tables.iter_mut().find(|t| &t.name == name) {
                        existing
                            .rows
                            .extend((0..grid.rows()).map(|r| grid.row_texts(r)));
                        continue;
                    }
                }
            }

            log::warn!("router: table {} matched no known header, dropped", idx);
        }

        tables
    }
}

/// Group a logical table's rows under engineering-project name lines.
///
/// A project line is a row with exactly one distinct non-empty value (a
/// full-width merged label replicates across the grid), carrying no
/// numbering of its own and immediately preceding a tier-1 row. Rows seen
/// before the first project line fall into a section with an empty project
/// name.
pub fn group_by_project(table: &LogicalTable) -> Vec<ProjectSection> {
    let mut sections: Vec<ProjectSection> = Vec::new();
    let mut current: Option<ProjectSection> = None;

    for (i, row) in table.rows.iter().enumerate() {
        if let Some(project) = project_label(row, table.rows.get(i + 1)) {
            if let Some(section) = current.take() {
                if !section.rows.is_empty() {
                    sections.push(section);
                }
            }
            current = Some(ProjectSection {
                project,
                rows: Vec::new(),
            });
            continue;
        }
        match &mut current {
            Some(section) => section.rows.push(row.clone()),
            None => {
                current = Some(ProjectSection {
                    project: String::new(),
                    rows: vec![row.clone()],
                });
            }
        }
    }
    if let Some(section) = current {
        if !section.rows.is_empty() {
            sections.push(section);
        }
    }
    sections
}

fn project_label(row: &[String], next: Option<&Vec<String>>) -> Option<String> {
    let mut distinct: Option<&str> = None;
    for cell in row {
        let text = cell.trim();
        if text.is_empty() {
            continue;
        }
        match distinct {
            None => distinct = Some(text),
            Some(seen) if seen == text => {}
            Some(_) => return None,
        }
    }
    let label = distinct?;

    // A label row carries no serial of its own.
    if label.starts_with(|c: char| c.is_ascii_digit())
        || label.starts_with(['（', '(', '一', '二', '三', '四', '五', '六', '七', '八', '九', '十'])
        || label == "合计"
        || label == "小计"
    {
        return None;
    }

    // ...and is immediately followed by a tier-1 row.
    let next = next?;
    let first = next.iter().find(|c| !c.trim().is_empty())?;
    let tier_one = first
        .trim()
        .starts_with(['一', '二', '三', '四', '五', '六', '七', '八', '九', '十']);
    tier_one.then(|| label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridCell;

    fn grid_from(rows: &[&[&str]]) -> LogicalGrid {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut cells = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            for c in 0..cols {
                cells.push(GridCell {
                    text: row.get(c).unwrap_or(&"").to_string(),
                    owner: (r, c),
                });
            }
        }
        LogicalGrid::from_parts(cols, cells, vec![false; rows.len()])
    }

    #[test]
    fn test_normalize_header_text() {
        assert_eq!(normalize_header_text("送审金额\n（含税）"), "送审金额(含税)");
    }

    #[test]
    fn test_exact_match() {
        let grid = grid_from(&[
            &["序号", "审计内容", "送审金额（含税）", "审定金额（含税）", "审定金额（不含税）", "增减金额", "备注"],
            &["1", "建安费", "100", "90", "80", "-10", ""],
        ]);
        let router = TableRouter::new(DocumentType::SettlementReport, 0.8);
        let tables = router.route(&[grid]);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "审定结算汇总表");
        assert_eq!(tables[0].rows.len(), 1);
    }

    #[test]
    fn test_fuzzy_match_tolerates_missing_keyword() {
        // 备注 column lost by OCR; 6 of 7 keywords remain.
        let grid = grid_from(&[
            &["序号", "审计内容", "送审金额（含税）", "审定金额（含税）", "审定金额（不含税）", "增减金额"],
            &["1", "建安费", "100", "90", "80", "-10"],
        ]);
        let router = TableRouter::new(DocumentType::SettlementReport, 0.8);
        let tables = router.route(&[grid]);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "审定结算汇总表");
    }

    #[test]
    fn test_unmatched_table_dropped() {
        let grid = grid_from(&[&["甲", "乙"], &["1", "2"]]);
        let router = TableRouter::new(DocumentType::SettlementReport, 0.8);
        assert!(router.route(&[grid]).is_empty());
    }

    #[test]
    fn test_page_break_continuation_merged() {
        let page1 = grid_from(&[
            &["施工单位", "中标通知书编号", "中标通知书金额", "合同金额", "结算送审金额", "差额"],
            &["某建设公司", "ZB-001", "500", "500", "490", "-10"],
        ]);
        // Second page: no header, same column count.
        let page2 = grid_from(&[&["另一公司", "ZB-002", "300", "300", "310", "10"]]);
        let router = TableRouter::new(DocumentType::SettlementReport, 0.8);
        let tables = router.route(&[page1, page2]);
        assert_eq!(tables.len(), 1);
        let t = &tables[0];
        assert_eq!(t.name, "合同执行情况");
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][0], "某建设公司");
        assert_eq!(t.rows[1][0], "另一公司");
    }

    #[test]
    fn test_group_by_project() {
        let table = LogicalTable {
            name: "初设评审的概算投资明细".into(),
            cols: 3,
            header: vec![],
            rows: vec![
                vec!["晋城周村220kV变电站新建工程".into(), "晋城周村220kV变电站新建工程".into(), "晋城周村220kV变电站新建工程".into()],
                vec!["一、".into(), "建筑工程".into(), "10".into()],
                vec!["1".into(), "主控楼".into(), "5".into()],
                vec!["凤城220kV间隔扩建工程".into(), "".into(), "".into()],
                vec!["一、".into(), "安装工程".into(), "7".into()],
            ],
        };
        let sections = group_by_project(&table);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].project, "晋城周村220kV变电站新建工程");
        assert_eq!(sections[0].rows.len(), 2);
        assert_eq!(sections[1].project, "凤城220kV间隔扩建工程");
        assert_eq!(sections[1].rows.len(), 1);
    }
}
