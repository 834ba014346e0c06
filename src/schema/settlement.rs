//! 结算报告 (settlement audit report) schema: six named flat tables.
//!
//! No hierarchy here; each routed table maps row-by-row onto a typed record,
//! with amount columns coerced to two-decimal numbers. A table the router
//! never matches stays an empty array under its canonical key.

use serde::Serialize;

use crate::detect::DocumentType;
use crate::model::{AttrValue, LogicalGrid, LogicalTable};
use crate::parser::TableRouter;

use super::fields::{ColumnMap, FieldSpec};
use super::number::coerce_amount;

const SUMMARY_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "no", keywords: &["序号"] },
    FieldSpec { field: "auditContent", keywords: &["审计内容"] },
    FieldSpec { field: "submittedAmount", keywords: &["送审金额（含税）", "送审金额"] },
    FieldSpec { field: "approvedAmountWithTax", keywords: &["审定金额（含税）"] },
    FieldSpec { field: "approvedAmountWithoutTax", keywords: &["审定金额（不含税）"] },
    FieldSpec { field: "changeAmount", keywords: &["增减金额"] },
    FieldSpec { field: "remark", keywords: &["备注"] },
];

const CONTRACT_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "contractor", keywords: &["施工单位"] },
    FieldSpec { field: "bidNoticeNo", keywords: &["中标通知书编号"] },
    FieldSpec { field: "bidNoticeAmount", keywords: &["中标通知书金额"] },
    FieldSpec { field: "contractAmount", keywords: &["合同金额"] },
    FieldSpec { field: "submittedAmount", keywords: &["结算送审金额"] },
    FieldSpec { field: "difference", keywords: &["差额"] },
];

const COMPENSATION_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "counterparty", keywords: &["合同对方"] },
    FieldSpec { field: "matter", keywords: &["赔偿事项"] },
    FieldSpec { field: "contractAmount", keywords: &["合同金额"] },
    FieldSpec { field: "submittedAmount", keywords: &["结算送审金额"] },
    FieldSpec { field: "difference", keywords: &["差额"] },
];

const MATERIAL_QUANTITY_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "materialName", keywords: &["物料名称"] },
    FieldSpec { field: "contractQuantity", keywords: &["合同数量"] },
    FieldSpec { field: "drawingQuantity", keywords: &["施工图数量"] },
    FieldSpec { field: "unitPrice", keywords: &["单价（不含税）", "单价"] },
    FieldSpec { field: "difference", keywords: &["差额"] },
];

const MATERIAL_AMOUNT_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "materialName", keywords: &["物料名称"] },
    FieldSpec { field: "contractAmount", keywords: &["合同金额（不含税）", "合同金额"] },
    FieldSpec { field: "bookedAmount", keywords: &["入账金额"] },
    FieldSpec { field: "difference", keywords: &["差额"] },
    FieldSpec { field: "remark", keywords: &["备注"] },
];

const SERVICE_SPECS: &[FieldSpec] = &[
    FieldSpec { field: "provider", keywords: &["服务商"] },
    FieldSpec { field: "bidNotice", keywords: &["中标通知书"] },
    FieldSpec { field: "contractAmount", keywords: &["合同金额"] },
    FieldSpec { field: "submittedAmount", keywords: &["送审金额"] },
    FieldSpec { field: "settledAmount", keywords: &["结算金额"] },
];

/// 审定结算汇总表 row.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementSummaryRow {
    pub no: String,
    #[serde(rename = "auditContent")]
    pub audit_content: String,
    #[serde(rename = "submittedAmount")]
    pub submitted_amount: AttrValue,
    #[serde(rename = "approvedAmountWithTax")]
    pub approved_amount_with_tax: AttrValue,
    #[serde(rename = "approvedAmountWithoutTax")]
    pub approved_amount_without_tax: AttrValue,
    #[serde(rename = "changeAmount")]
    pub change_amount: AttrValue,
    pub remark: String,
}

/// 合同执行情况 row.
#[derive(Debug, Clone, Serialize)]
pub struct ContractExecutionRow {
    pub contractor: String,
    #[serde(rename = "bidNoticeNo")]
    pub bid_notice_no: String,
    #[serde(rename = "bidNoticeAmount")]
    pub bid_notice_amount: AttrValue,
    #[serde(rename = "contractAmount")]
    pub contract_amount: AttrValue,
    #[serde(rename = "submittedAmount")]
    pub submitted_amount: AttrValue,
    pub difference: AttrValue,
}

/// 赔偿合同 row.
#[derive(Debug, Clone, Serialize)]
pub struct CompensationRow {
    pub counterparty: String,
    pub matter: String,
    #[serde(rename = "contractAmount")]
    pub contract_amount: AttrValue,
    #[serde(rename = "submittedAmount")]
    pub submitted_amount: AttrValue,
    pub difference: AttrValue,
}

/// 物资采购合同1 (quantities) row.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialQuantityRow {
    #[serde(rename = "materialName")]
    pub material_name: String,
    #[serde(rename = "contractQuantity")]
    pub contract_quantity: AttrValue,
    #[serde(rename = "drawingQuantity")]
    pub drawing_quantity: AttrValue,
    #[serde(rename = "unitPrice")]
    pub unit_price: AttrValue,
    pub difference: AttrValue,
}

/// 物资采购合同2 (amounts) row.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialAmountRow {
    #[serde(rename = "materialName")]
    pub material_name: String,
    #[serde(rename = "contractAmount")]
    pub contract_amount: AttrValue,
    #[serde(rename = "bookedAmount")]
    pub booked_amount: AttrValue,
    pub difference: AttrValue,
    pub remark: String,
}

/// 其他服务类合同 row.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceContractRow {
    pub provider: String,
    #[serde(rename = "bidNotice")]
    pub bid_notice: String,
    #[serde(rename = "contractAmount")]
    pub contract_amount: AttrValue,
    #[serde(rename = "submittedAmount")]
    pub submitted_amount: AttrValue,
    #[serde(rename = "settledAmount")]
    pub settled_amount: AttrValue,
}

/// The settlementReport payload: six canonical tables, always present.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettlementData {
    #[serde(rename = "审定结算汇总表")]
    pub summary: Vec<SettlementSummaryRow>,
    #[serde(rename = "合同执行情况")]
    pub contract_execution: Vec<ContractExecutionRow>,
    #[serde(rename = "赔偿合同")]
    pub compensation: Vec<CompensationRow>,
    #[serde(rename = "物资采购合同1")]
    pub material_quantities: Vec<MaterialQuantityRow>,
    #[serde(rename = "物资采购合同2")]
    pub material_amounts: Vec<MaterialAmountRow>,
    #[serde(rename = "其他服务类合同")]
    pub service_contracts: Vec<ServiceContractRow>,
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn text(columns: &ColumnMap, row: &[String], field: &str) -> String {
    columns.value(row, field).to_string()
}

fn amount(columns: &ColumnMap, row: &[String], field: &str) -> AttrValue {
    coerce_amount(columns.value(row, field))
}

fn map_rows<T>(
    table: &LogicalTable,
    specs: &[FieldSpec],
    mut make: impl FnMut(&ColumnMap, &[String]) -> T,
) -> Vec<T> {
    let columns = ColumnMap::locate(&table.header, specs);
    table
        .rows
        .iter()
        .filter(|row| !is_blank(row))
        .map(|row| make(&columns, row))
        .collect()
}

/// Map a 结算报告 document onto its six named tables.
pub fn map_settlement(grids: &[LogicalGrid], fuzzy_threshold: f32) -> SettlementData {
    let router = TableRouter::new(DocumentType::SettlementReport, fuzzy_threshold);
    let mut data = SettlementData::default();

    for table in &router.route(grids) {
        match table.name.as_str() {
            "审定结算汇总表" => {
                data.summary = map_rows(table, SUMMARY_SPECS, |c, row| SettlementSummaryRow {
                    no: text(c, row, "no"),
                    audit_content: text(c, row, "auditContent"),
                    submitted_amount: amount(c, row, "submittedAmount"),
                    approved_amount_with_tax: amount(c, row, "approvedAmountWithTax"),
                    approved_amount_without_tax: amount(c, row, "approvedAmountWithoutTax"),
                    change_amount: amount(c, row, "changeAmount"),
                    remark: text(c, row, "remark"),
                });
            }
            "合同执行情况" => {
                data.contract_execution =
                    map_rows(table, CONTRACT_SPECS, |c, row| ContractExecutionRow {
                        contractor: text(c, row, "contractor"),
                        bid_notice_no: text(c, row, "bidNoticeNo"),
                        bid_notice_amount: amount(c, row, "bidNoticeAmount"),
                        contract_amount: amount(c, row, "contractAmount"),
                        submitted_amount: amount(c, row, "submittedAmount"),
                        difference: amount(c, row, "difference"),
                    });
            }
            "赔偿合同" => {
                data.compensation = map_rows(table, COMPENSATION_SPECS, |c, row| CompensationRow {
                    counterparty: text(c, row, "counterparty"),
                    matter: text(c, row, "matter"),
                    contract_amount: amount(c, row, "contractAmount"),
                    submitted_amount: amount(c, row, "submittedAmount"),
                    difference: amount(c, row, "difference"),
                });
            }
            "物资采购合同1" => {
                data.material_quantities =
                    map_rows(table, MATERIAL_QUANTITY_SPECS, |c, row| MaterialQuantityRow {
                        material_name: text(c, row, "materialName"),
                        contract_quantity: amount(c, row, "contractQuantity"),
                        drawing_quantity: amount(c, row, "drawingQuantity"),
                        unit_price: amount(c, row, "unitPrice"),
                        difference: amount(c, row, "difference"),
                    });
            }
            "物资采购合同2" => {
                data.material_amounts =
                    map_rows(table, MATERIAL_AMOUNT_SPECS, |c, row| MaterialAmountRow {
                        material_name: text(c, row, "materialName"),
                        contract_amount: amount(c, row, "contractAmount"),
                        booked_amount: amount(c, row, "bookedAmount"),
                        difference: amount(c, row, "difference"),
                        remark: text(c, row, "remark"),
                    });
            }
            "其他服务类合同" => {
                data.service_contracts =
                    map_rows(table, SERVICE_SPECS, |c, row| ServiceContractRow {
                        provider: text(c, row, "provider"),
                        bid_notice: text(c, row, "bidNotice"),
                        contract_amount: amount(c, row, "contractAmount"),
                        submitted_amount: amount(c, row, "submittedAmount"),
                        settled_amount: amount(c, row, "settledAmount"),
                    });
            }
            other => log::warn!("settlement: unexpected table {:?}", other),
        }
    }

    data
}
