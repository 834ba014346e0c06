//! Investment estimate schemas: 可研批复 / 可研评审 / 初设批复.
//!
//! All three read a single logical table of numbered engineering/fee lines
//! with static and dynamic investment columns; 可研批复 additionally carries
//! four construction-scale columns and nests one level deeper.

use serde::Serialize;

use crate::detect::DocumentType;
use crate::model::{AttrValue, ClassifiedRow, LogicalGrid, TreeNode};
use crate::parser::{build_forest, is_serial_token, normalize_header_text, LevelClassifier, Taxonomy};

use super::fields::{ColumnMap, FieldSpec};

const NO: FieldSpec = FieldSpec { field: "no", keywords: &["序号"] };
const STATIC_INVESTMENT: FieldSpec = FieldSpec {
    field: "staticInvestment",
    keywords: &["静态投资"],
};
const DYNAMIC_INVESTMENT: FieldSpec = FieldSpec {
    field: "dynamicInvestment",
    keywords: &["动态投资"],
};

/// fsApproval column set: name plus the four construction-scale columns.
const FS_APPROVAL_SPECS: &[FieldSpec] = &[
    NO,
    FieldSpec { field: "name", keywords: &["工程或费用名称", "名称"] },
    FieldSpec {
        field: "constructionScaleOverheadLine",
        keywords: &["架空线"],
    },
    FieldSpec { field: "constructionScaleBay", keywords: &["间隔"] },
    FieldSpec {
        field: "constructionScaleSubstation",
        keywords: &["变电"],
    },
    FieldSpec {
        field: "constructionScaleOpticalCable",
        keywords: &["光缆"],
    },
    STATIC_INVESTMENT,
    DYNAMIC_INVESTMENT,
];

const FS_REVIEW_SPECS: &[FieldSpec] = &[
    NO,
    FieldSpec { field: "name", keywords: &["工程或费用名称", "名称"] },
    STATIC_INVESTMENT,
    DYNAMIC_INVESTMENT,
];

const PD_APPROVAL_SPECS: &[FieldSpec] = &[
    NO,
    FieldSpec { field: "name", keywords: &["工程名称", "名称"] },
    STATIC_INVESTMENT,
    DYNAMIC_INVESTMENT,
];

/// Amount fields coerced to numbers in the output tree.
const NUMERIC_FIELDS: &[&str] = &["staticInvestment", "dynamicInvestment"];

/// A 可研批复 tree node: scale fields present.
#[derive(Debug, Clone, Serialize)]
pub struct FsApprovalNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    pub name: String,
    pub level: u8,
    #[serde(rename = "constructionScaleOverheadLine")]
    pub construction_scale_overhead_line: String,
    #[serde(rename = "constructionScaleBay")]
    pub construction_scale_bay: String,
    #[serde(rename = "constructionScaleSubstation")]
    pub construction_scale_substation: String,
    #[serde(rename = "constructionScaleOpticalCable")]
    pub construction_scale_optical_cable: String,
    #[serde(rename = "staticInvestment")]
    pub static_investment: AttrValue,
    #[serde(rename = "dynamicInvestment")]
    pub dynamic_investment: AttrValue,
    pub children: Vec<FsApprovalNode>,
}

/// A 可研评审 / 初设批复 tree node: no scale fields.
#[derive(Debug, Clone, Serialize)]
pub struct InvestmentNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    pub name: String,
    pub level: u8,
    #[serde(rename = "staticInvestment")]
    pub static_investment: AttrValue,
    #[serde(rename = "dynamicInvestment")]
    pub dynamic_investment: AttrValue,
    pub children: Vec<InvestmentNode>,
}

fn attr(node: &TreeNode, field: &str) -> AttrValue {
    node.attributes
        .get(field)
        .cloned()
        .unwrap_or(AttrValue::Text(String::new()))
}

fn text_attr(node: &TreeNode, field: &str) -> String {
    match node.attributes.get(field) {
        Some(AttrValue::Text(s)) => s.clone(),
        Some(AttrValue::Number(n)) => n.to_string(),
        None => String::new(),
    }
}

fn to_fs_approval(node: &TreeNode) -> FsApprovalNode {
    FsApprovalNode {
        no: node.no.clone(),
        name: node.name.clone(),
        level: node.level,
        construction_scale_overhead_line: text_attr(node, "constructionScaleOverheadLine"),
        construction_scale_bay: text_attr(node, "constructionScaleBay"),
        construction_scale_substation: text_attr(node, "constructionScaleSubstation"),
        construction_scale_optical_cable: text_attr(node, "constructionScaleOpticalCable"),
        static_investment: attr(node, "staticInvestment"),
        dynamic_investment: attr(node, "dynamicInvestment"),
        children: node.children.iter().map(to_fs_approval).collect(),
    }
}

fn to_investment(node: &TreeNode) -> InvestmentNode {
    InvestmentNode {
        no: node.no.clone(),
        name: node.name.clone(),
        level: node.level,
        static_investment: attr(node, "staticInvestment"),
        dynamic_investment: attr(node, "dynamicInvestment"),
        children: node.children.iter().map(to_investment).collect(),
    }
}

/// Find the grid holding the investment table: its leading rows must name
/// the item column and an investment column.
fn find_target<'a>(grids: &'a [LogicalGrid], name_keyword: &str) -> Option<&'a LogicalGrid> {
    grids.iter().find(|g| {
        let text = g.leading_text(g.rows());
        text.contains(name_keyword)
            || (text.contains("序号") && text.contains("静态投资"))
    })
}

/// Header extent: the first row naming the item or serial column, extended
/// over continuation header rows (a merged 建设规模 header spans two rows).
/// Extension stops at the first row that opens with a serial token, which
/// marks data even when its cells echo a column keyword (变电工程).
fn header_rows(grid: &LogicalGrid, name_keyword: &str, specs: &[FieldSpec]) -> Option<(usize, usize)> {
    let start = (0..grid.rows()).find(|&r| {
        let text = grid.row_texts(r).join(" ");
        text.contains(name_keyword) || text.contains("序号")
    })?;

    let mut end = start;
    for r in start + 1..grid.rows().min(start + 3) {
        let row = grid.row_texts(r);
        let first = row
            .iter()
            .map(|c| c.trim())
            .find(|c| !c.is_empty())
            .unwrap_or("");
        if is_serial_token(first) {
            break;
        }
        let text = normalize_header_text(&row.join(" "));
        let has_keyword = specs.iter().any(|spec| {
            spec.keywords
                .iter()
                .any(|kw| text.contains(normalize_header_text(kw).as_str()))
        });
        if has_keyword {
            end = r;
        } else {
            break;
        }
    }
    Some((start, end))
}

/// Shared row walk: classify every data row and build the forest.
fn build_rows(
    grid: &LogicalGrid,
    columns: &ColumnMap,
    specs: &[FieldSpec],
    header_idx: usize,
    doc_type: DocumentType,
) -> Vec<TreeNode> {
    let mut classifier = LevelClassifier::new(Taxonomy::for_document(doc_type));
    let mut rows = Vec::new();

    for r in header_idx + 1..grid.rows() {
        let row = grid.row_texts(r);
        let name = columns.value(&row, "name");
        if name.is_empty() {
            continue;
        }
        let serial = columns.value(&row, "no");
        let classified = classifier.classify(serial, name);

        let mut out = ClassifiedRow::new(classified.label, classified.level).with_no(serial);
        out.is_subtotal = classified.is_subtotal;
        for spec in specs {
            if spec.field == "no" || spec.field == "name" {
                continue;
            }
            out.fields.insert(
                spec.field.to_string(),
                columns.value(&row, spec.field).to_string(),
            );
        }
        rows.push(out);
    }

    build_forest(rows, doc_type.max_depth(), NUMERIC_FIELDS)
}

fn map_with(
    grids: &[LogicalGrid],
    doc_type: DocumentType,
    name_keyword: &str,
    specs: &[FieldSpec],
) -> Vec<TreeNode> {
    let Some(grid) = find_target(grids, name_keyword) else {
        log::warn!("investment: no table names {:?}", name_keyword);
        return Vec::new();
    };
    let Some((header_start, header_end)) = header_rows(grid, name_keyword, specs) else {
        log::warn!("investment: no header row in target table");
        return Vec::new();
    };
    let header: Vec<Vec<String>> = (header_start..=header_end)
        .map(|r| grid.row_texts(r))
        .collect();
    let columns = ColumnMap::locate(&header, specs);
    build_rows(grid, &columns, specs, header_end, doc_type)
}

/// Map a 可研批复 document onto its 3-level tree list.
pub fn map_fs_approval(grids: &[LogicalGrid]) -> Vec<FsApprovalNode> {
    map_with(grids, DocumentType::FsApproval, "工程或费用名称", FS_APPROVAL_SPECS)
        .iter()
        .map(to_fs_approval)
        .collect()
}

/// Map a 可研评审 document onto its 2-level tree list.
pub fn map_fs_review(grids: &[LogicalGrid]) -> Vec<InvestmentNode> {
    map_with(grids, DocumentType::FsReview, "工程或费用名称", FS_REVIEW_SPECS)
        .iter()
        .map(to_investment)
        .collect()
}

/// Map a 初设批复 document onto its 2-level tree list.
pub fn map_pd_approval(grids: &[LogicalGrid]) -> Vec<InvestmentNode> {
    map_with(grids, DocumentType::PdApproval, "工程名称", PD_APPROVAL_SPECS)
        .iter()
        .map(to_investment)
        .collect()
}
