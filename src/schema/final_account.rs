//! 竣工决算 (final account) schema: free-text sibling pipeline.
//!
//! Final-account pages reach this crate as OCR'd running text, not table
//! markup, so this path bypasses the grid/tree pipeline entirely. Lines are
//! split into project-group headings and 6-field cost rows. Signed amounts
//! and percentage strings (`-28.03%`) are preserved verbatim — positive
//! means under budget, negative over budget — never re-derived from other
//! fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::number::{is_amount_token, is_signed_percent};

static TABLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<table[^>]*>.*?</table>").unwrap());
static GROUP_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[一二三四五六七八九十]+[、.．]|[（(][一二三四五六七八九十]+[）)])\s*").unwrap());

/// One cost row of a project group. All six fields are verbatim strings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FinalAccountItem {
    pub name: String,
    #[serde(rename = "budgetAmount")]
    pub budget_amount: String,
    #[serde(rename = "settledAmount")]
    pub settled_amount: String,
    pub variance: String,
    #[serde(rename = "varianceRate")]
    pub variance_rate: String,
    pub remark: String,
}

/// One project's cost rows.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectGroup {
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub items: Vec<FinalAccountItem>,
}

fn amount_text(token: &str) -> bool {
    let stripped = token.trim_end_matches(['万', '元']);
    is_amount_token(stripped)
}

/// A heading opens a new project group: it names a 工程 and carries no
/// amounts of its own.
fn group_heading(line: &str, tokens: &[&str]) -> Option<String> {
    if !line.contains("工程") || line.chars().count() > 60 {
        return None;
    }
    if tokens.iter().any(|t| amount_text(t) || is_signed_percent(t)) {
        return None;
    }
    let name = GROUP_PREFIX_RE.replace(line, "").trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn parse_item(tokens: &[&str]) -> Option<FinalAccountItem> {
    let first_amount = tokens.iter().position(|t| amount_text(t))?;
    if first_amount == 0 {
        // A bare number line has no item name to attach to.
        return None;
    }

    let mut item = FinalAccountItem {
        name: tokens[..first_amount].join(""),
        ..FinalAccountItem::default()
    };

    let mut amounts: Vec<&str> = Vec::new();
    let mut remark: Vec<&str> = Vec::new();
    for token in &tokens[first_amount..] {
        if is_signed_percent(token) && item.variance_rate.is_empty() {
            item.variance_rate = token.to_string();
        } else if amount_text(token) && amounts.len() < 3 && item.variance_rate.is_empty() {
            amounts.push(token);
        } else {
            remark.push(token);
        }
    }

    let mut amounts = amounts.into_iter();
    item.budget_amount = amounts.next().unwrap_or("").to_string();
    item.settled_amount = amounts.next().unwrap_or("").to_string();
    item.variance = amounts.next().unwrap_or("").to_string();
    item.remark = remark.join(" ");
    Some(item)
}

/// Parse a 竣工决算 document into project groups.
pub fn map_final_account(markdown: &str) -> Vec<ProjectGroup> {
    let text = TABLE_BLOCK_RE.replace_all(markdown, "\n");
    let mut groups: Vec<ProjectGroup> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim().trim_start_matches('#').trim();
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if let Some(name) = group_heading(line, &tokens) {
            groups.push(ProjectGroup {
                project_name: name,
                items: Vec::new(),
            });
            continue;
        }

        if let Some(item) = parse_item(&tokens) {
            match groups.last_mut() {
                Some(group) => group.items.push(item),
                None => groups.push(ProjectGroup {
                    project_name: String::new(),
                    items: vec![item],
                }),
            }
        }
    }

    groups.retain(|g| !g.items.is_empty());
    log::debug!("finalAccount: parsed {} project groups", groups.len());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINAL_ACCOUNT_MD: &str = "\
# 晋城周村220kV输变电工程竣工决算审核报告

一、晋城周村220kV变电站新建工程
建筑工程费 1,200.00 900.00 300.00 25.00% 审减
安装工程费 800.00 1,024.24 -224.24 -28.03% 超概算
其他费用 260.00 260.00 0.00 0.00%

二、凤城220kV间隔扩建工程
设备购置费 2,000.00万元 1,900.00万元 100.00 5.00%
";

    #[test]
    fn test_groups_split_on_headings() {
        let groups = map_final_account(FINAL_ACCOUNT_MD);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].project_name, "晋城周村220kV变电站新建工程");
        assert_eq!(groups[0].items.len(), 3);
        assert_eq!(groups[1].project_name, "凤城220kV间隔扩建工程");
        assert_eq!(groups[1].items.len(), 1);
    }

    #[test]
    fn test_signs_preserved_verbatim() {
        let groups = map_final_account(FINAL_ACCOUNT_MD);
        let over = &groups[0].items[1];
        assert_eq!(over.name, "安装工程费");
        assert_eq!(over.variance, "-224.24");
        assert_eq!(over.variance_rate, "-28.03%");
        assert_eq!(over.remark, "超概算");

        let under = &groups[0].items[0];
        assert_eq!(under.variance, "300.00");
        assert_eq!(under.variance_rate, "25.00%");
    }

    #[test]
    fn test_unit_suffixed_amounts_kept_verbatim() {
        let groups = map_final_account(FINAL_ACCOUNT_MD);
        let item = &groups[1].items[0];
        assert_eq!(item.budget_amount, "2,000.00万元");
        assert_eq!(item.settled_amount, "1,900.00万元");
    }

    #[test]
    fn test_title_line_is_not_a_group() {
        // The report title names a 工程 but is longer than a heading and is
        // followed directly by a numbered heading; only numbered groups with
        // items survive.
        let groups = map_final_account(FINAL_ACCOUNT_MD);
        assert!(groups
            .iter()
            .all(|g| !g.project_name.contains("竣工决算审核报告")));
    }

    #[test]
    fn test_tables_ignored() {
        let md = "一、某某220kV工程\n<table><tr><td>费用 1 2</td></tr></table>\n建筑工程费 10.00 9.00 1.00 10.00%";
        let groups = map_final_account(md);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(map_final_account("").is_empty());
    }
}
