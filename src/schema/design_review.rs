//! 初设评审 (preliminary design review) schema: three named tables.
//!
//! The summary table is a 2-level tree over the whole review; the cost
//! detail and fee amount tables nest 3 levels and are grouped per
//! engineering project by full-width name lines.

use serde::Serialize;

use crate::detect::DocumentType;
use crate::model::{AttrValue, ClassifiedRow, LogicalGrid, LogicalTable, TreeNode};
use crate::parser::{build_forest, group_by_project, LevelClassifier, TableRouter, Taxonomy};

use super::fields::{ColumnMap, FieldSpec};

const SUMMARY_TABLE: &str = "初设评审的概算投资";
const COST_DETAIL_TABLE: &str = "初设评审的概算投资明细";
const COST_AMOUNT_TABLE: &str = "初设评审的费用金额";

const SUMMARY_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "no", keywords: &["序号"] },
    FieldSpec { field: "name", keywords: &["工程名称", "名称"] },
    FieldSpec { field: "constructionScale", keywords: &["建设规模"] },
    FieldSpec {
        field: "siteClearanceFee",
        keywords: &["其中：建设场地征用及清理费", "建设场地征用及清理费"],
    },
    FieldSpec { field: "staticInvestment", keywords: &["静态投资"] },
    FieldSpec { field: "dynamicInvestment", keywords: &["动态投资"] },
];

const COST_DETAIL_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "no", keywords: &["序号"] },
    FieldSpec { field: "name", keywords: &["工程或费用名称", "名称"] },
    FieldSpec { field: "buildingCost", keywords: &["建筑工程费"] },
    FieldSpec { field: "equipmentCost", keywords: &["设备购置费"] },
    FieldSpec { field: "installationCost", keywords: &["安装工程费"] },
    FieldSpec { field: "otherCost", keywords: &["其他费用"] },
];

const COST_AMOUNT_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "no", keywords: &["序号"] },
    FieldSpec { field: "name", keywords: &["费用名称", "名称"] },
    FieldSpec { field: "cost", keywords: &["金额"] },
];

/// Summary tree node (2 levels).
#[derive(Debug, Clone, Serialize)]
pub struct DesignSummaryNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    pub name: String,
    pub level: u8,
    #[serde(rename = "constructionScale")]
    pub construction_scale: String,
    #[serde(rename = "staticInvestment")]
    pub static_investment: AttrValue,
    #[serde(rename = "siteClearanceFee")]
    pub site_clearance_fee: AttrValue,
    #[serde(rename = "dynamicInvestment")]
    pub dynamic_investment: AttrValue,
    pub children: Vec<DesignSummaryNode>,
}

/// Cost detail tree node (3 levels, four cost categories).
#[derive(Debug, Clone, Serialize)]
pub struct CostDetailNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    pub name: String,
    pub level: u8,
    #[serde(rename = "buildingCost")]
    pub building_cost: AttrValue,
    #[serde(rename = "equipmentCost")]
    pub equipment_cost: AttrValue,
    #[serde(rename = "installationCost")]
    pub installation_cost: AttrValue,
    #[serde(rename = "otherCost")]
    pub other_cost: AttrValue,
    pub children: Vec<CostDetailNode>,
}

/// Fee amount tree node (3 levels, single cost field).
#[derive(Debug, Clone, Serialize)]
pub struct CostAmountNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    pub name: String,
    pub level: u8,
    pub cost: AttrValue,
    pub children: Vec<CostAmountNode>,
}

/// One engineering project's cost detail trees.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCostDetail {
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub items: Vec<CostDetailNode>,
}

/// One engineering project's fee amount trees.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCostAmount {
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub items: Vec<CostAmountNode>,
}

/// The designReview payload: three named tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DesignReviewData {
    #[serde(rename = "初设评审的概算投资")]
    pub summary: Vec<DesignSummaryNode>,
    #[serde(rename = "初设评审的概算投资明细")]
    pub cost_details: Vec<ProjectCostDetail>,
    #[serde(rename = "初设评审的费用金额")]
    pub cost_amounts: Vec<ProjectCostAmount>,
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

fn classify_rows(
    rows: &[Vec<String>],
    columns: &ColumnMap,
    specs: &[FieldSpec],
    numeric: &[&str],
    max_depth: u8,
) -> Vec<TreeNode> {
    let mut classifier = LevelClassifier::new(Taxonomy::for_document(DocumentType::DesignReview));
    let mut out = Vec::new();
    for row in rows {
        let name = columns.value(row, "name");
        if name.is_empty() {
            continue;
        }
        let serial = columns.value(row, "no");
        let classified = classifier.classify(serial, name);
        let mut cr = ClassifiedRow::new(classified.label, classified.level).with_no(serial);
        cr.is_subtotal = classified.is_subtotal;
        for spec in specs {
            if spec.field == "no" || spec.field == "name" {
                continue;
            }
            cr.fields
                .insert(spec.field.to_string(), columns.value(row, spec.field).to_string());
        }
        out.push(cr);
    }
    build_forest(out, max_depth, numeric)
}

fn to_summary(node: &TreeNode) -> DesignSummaryNode {
    DesignSummaryNode {
        no: node.no.clone(),
        name: node.name.clone(),
        level: node.level,
        construction_scale: text_attr(node, "constructionScale"),
        static_investment: attr(node, "staticInvestment"),
        site_clearance_fee: attr(node, "siteClearanceFee"),
        dynamic_investment: attr(node, "dynamicInvestment"),
        children: node.children.iter().map(to_summary).collect(),
    }
}

fn to_cost_detail(node: &TreeNode) -> CostDetailNode {
    CostDetailNode {
        no: node.no.clone(),
        name: node.name.clone(),
        level: node.level,
        building_cost: attr(node, "buildingCost"),
        equipment_cost: attr(node, "equipmentCost"),
        installation_cost: attr(node, "installationCost"),
        other_cost: attr(node, "otherCost"),
        children: node.children.iter().map(to_cost_detail).collect(),
    }
}

fn to_cost_amount(node: &TreeNode) -> CostAmountNode {
    CostAmountNode {
        no: node.no.clone(),
        name: node.name.clone(),
        level: node.level,
        cost: attr(node, "cost"),
        children: node.children.iter().map(to_cost_amount).collect(),
    }
}

fn table_columns(table: &LogicalTable, specs: &[FieldSpec]) -> ColumnMap {
    ColumnMap::locate(&table.header, specs)
}

/// Map a 初设评审 document onto its three named tables.
pub fn map_design_review(grids: &[LogicalGrid], fuzzy_threshold: f32) -> DesignReviewData {
    let router = TableRouter::new(DocumentType::DesignReview, fuzzy_threshold);
    let tables = router.route(grids);
    let mut data = DesignReviewData::default();

    for table in &tables {
        match table.name.as_str() {
            SUMMARY_TABLE => {
                let columns = table_columns(table, SUMMARY_SPECS);
                let forest = classify_rows(
                    &table.rows,
                    &columns,
                    SUMMARY_SPECS,
                    &["staticInvestment", "siteClearanceFee", "dynamicInvestment"],
                    2,
                );
                data.summary = forest.iter().map(to_summary).collect();
            }
            COST_DETAIL_TABLE => {
                let columns = table_columns(table, COST_DETAIL_SPECS);
                for section in group_by_project(table) {
                    let forest = classify_rows(
                        &section.rows,
                        &columns,
                        COST_DETAIL_SPECS,
                        &["buildingCost", "equipmentCost", "installationCost", "otherCost"],
                        3,
                    );
                    data.cost_details.push(ProjectCostDetail {
                        project_name: section.project,
                        items: forest.iter().map(to_cost_detail).collect(),
                    });
                }
            }
            COST_AMOUNT_TABLE => {
                let columns = table_columns(table, COST_AMOUNT_SPECS);
                for section in group_by_project(table) {
                    let forest =
                        classify_rows(&section.rows, &columns, COST_AMOUNT_SPECS, &["cost"], 3);
                    data.cost_amounts.push(ProjectCostAmount {
                        project_name: section.project,
                        items: forest.iter().map(to_cost_amount).collect(),
                    });
                }
            }
            other => log::warn!("designReview: unexpected table {:?}", other),
        }
    }

    data
}
