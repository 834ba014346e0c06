//! Header-driven column location.
//!
//! Schema mappers find their columns by keyword containment over the
//! (possibly multi-row) header, not by fixed position: OCR merges, splits,
//! and reorders header cells. Specs are evaluated in declaration order and
//! a column is claimed at most once, so specific keywords (物料名称) must be
//! declared before generic ones (名称).

use std::collections::BTreeMap;

use crate::parser::normalize_header_text;

/// One output field and the header keywords that identify its column.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Output field name (camelCase, per the JSON contract).
    pub field: &'static str,

    /// Any of these keywords marks the column.
    pub keywords: &'static [&'static str],
}

/// Field name to column index mapping for one logical table.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: BTreeMap<&'static str, usize>,
}

impl ColumnMap {
    /// Locate each spec's column in the header rows.
    pub fn locate(header: &[Vec<String>], specs: &[FieldSpec]) -> Self {
        let cols = header.iter().map(Vec::len).max().unwrap_or(0);
        // Per-column header text, all header rows joined.
        let mut column_text: Vec<String> = vec![String::new(); cols];
        for row in header {
            for (c, cell) in row.iter().enumerate() {
                column_text[c].push_str(&normalize_header_text(cell));
            }
        }

        let mut columns = BTreeMap::new();
        let mut claimed = vec![false; cols];
        for spec in specs {
            'spec: for keyword in spec.keywords {
                let needle = normalize_header_text(keyword);
                for (c, text) in column_text.iter().enumerate() {
                    if !claimed[c] && text.contains(needle.as_str()) {
                        columns.insert(spec.field, c);
                        claimed[c] = true;
                        break 'spec;
                    }
                }
            }
        }
        log::debug!("fields: located columns {:?}", columns);
        Self { columns }
    }

    /// Column index for a field, when its header keyword was found.
    pub fn get(&self, field: &str) -> Option<usize> {
        self.columns.get(field).copied()
    }

    /// Cell value of `field` in `row`, trimmed; `""` when the column is
    /// missing or the row is short.
    pub fn value<'a>(&self, row: &'a [String], field: &str) -> &'a str {
        self.get(field)
            .and_then(|c| row.get(c))
            .map(|s| s.trim())
            .unwrap_or("")
    }

    /// Number of located columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if no column was located.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<Vec<String>> {
        vec![vec![
            "序号".into(),
            "工程或费用名称".into(),
            "静态投资（万元）".into(),
            "动态投资（万元）".into(),
        ]]
    }

    #[test]
    fn test_locate_by_keyword() {
        let map = ColumnMap::locate(
            &header(),
            &[
                FieldSpec { field: "no", keywords: &["序号"] },
                FieldSpec { field: "name", keywords: &["工程或费用名称", "名称"] },
                FieldSpec { field: "staticInvestment", keywords: &["静态投资"] },
                FieldSpec { field: "dynamicInvestment", keywords: &["动态投资"] },
            ],
        );
        assert_eq!(map.get("no"), Some(0));
        assert_eq!(map.get("name"), Some(1));
        assert_eq!(map.get("staticInvestment"), Some(2));
        assert_eq!(map.get("dynamicInvestment"), Some(3));
    }

    #[test]
    fn test_specific_before_generic() {
        let header = vec![vec!["物料名称".into(), "名称备注".into()]];
        let map = ColumnMap::locate(
            &header,
            &[
                FieldSpec { field: "materialName", keywords: &["物料名称"] },
                FieldSpec { field: "remark", keywords: &["备注"] },
            ],
        );
        assert_eq!(map.get("materialName"), Some(0));
        assert_eq!(map.get("remark"), Some(1));
    }

    #[test]
    fn test_multi_row_header() {
        let header = vec![
            vec!["金额".into(), "金额".into()],
            vec!["送审".into(), "审定".into()],
        ];
        let map = ColumnMap::locate(
            &header,
            &[
                FieldSpec { field: "submitted", keywords: &["送审"] },
                FieldSpec { field: "approved", keywords: &["审定"] },
            ],
        );
        assert_eq!(map.get("submitted"), Some(0));
        assert_eq!(map.get("approved"), Some(1));
    }

    #[test]
    fn test_value_accessor() {
        let map = ColumnMap::locate(
            &header(),
            &[FieldSpec { field: "no", keywords: &["序号"] }],
        );
        let row: Vec<String> = vec![" 一 ".into(), "变电工程".into()];
        assert_eq!(map.value(&row, "no"), "一");
        assert_eq!(map.value(&row, "missing"), "");
    }
}
