//! Tree construction from classified rows.
//!
//! Single left-to-right pass with an explicit ancestor stack: pop until the
//! top is shallower than the incoming row, attach, push. Children lists are
//! append-only and no node is re-parented after creation, so the result is a
//! strict forest by construction. Node levels are normalized on attach
//! (`child.level == parent.level + 1`) even when classified levels skip.

use std::collections::BTreeMap;

use crate::model::{AttrValue, ClassifiedRow, TreeNode};
use crate::schema::number::coerce_amount;

/// Build the ordered root list for one logical table.
///
/// `max_depth` is the schema's declared depth; deeper classified levels are
/// clamped rather than rejected, to tolerate noisy inputs. Fields named in
/// `numeric_fields` go through amount coercion; all others stay verbatim.
pub fn build_forest(
    rows: Vec<ClassifiedRow>,
    max_depth: u8,
    numeric_fields: &[&str],
) -> Vec<TreeNode> {
    let mut roots: Vec<TreeNode> = Vec::new();
    // (classified level, node under construction)
    let mut stack: Vec<(u8, TreeNode)> = Vec::new();

    fn close_down_to(stack: &mut Vec<(u8, TreeNode)>, roots: &mut Vec<TreeNode>, level: u8) {
        while stack.last().is_some_and(|(l, _)| *l >= level) {
            let (_, node) = stack.pop().expect("non-empty stack");
            match stack.last_mut() {
                Some((_, parent)) => parent.children.push(node),
                None => roots.push(node),
            }
        }
    }

    for row in rows {
        let level = row.level.min(max_depth);
        if row.level > max_depth {
            log::debug!(
                "tree: clamped level {} to {} for {:?}",
                row.level,
                max_depth,
                row.label
            );
        }
        close_down_to(&mut stack, &mut roots, level);

        let mut attributes = BTreeMap::new();
        for (field, raw) in &row.fields {
            let value = if numeric_fields.contains(&field.as_str()) {
                coerce_amount(raw)
            } else {
                AttrValue::Text(raw.clone())
            };
            attributes.insert(field.clone(), value);
        }

        let node = TreeNode {
            name: row.label,
            // Normalized depth keeps parent/child levels monotonic.
            level: stack
                .last()
                .map(|(_, parent)| parent.level + 1)
                .unwrap_or(level),
            no: row.no,
            attributes,
            children: Vec::new(),
        };

        if row.is_subtotal {
            // Roll-up rows are leaves; they never adopt children.
            match stack.last_mut() {
                Some((_, parent)) => parent.children.push(node),
                None => roots.push(node),
            }
        } else {
            stack.push((level, node));
        }
    }

    close_down_to(&mut stack, &mut roots, 0);
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassifiedRow;

    fn row(label: &str, level: u8) -> ClassifiedRow {
        ClassifiedRow::new(label, level)
    }

    #[test]
    fn test_two_level_forest() {
        let rows = vec![
            row("变电工程", 1),
            row("晋城周村220kV变电站新建工程", 2),
            row("凤城220kV变电站220kV间隔扩建工程", 2),
        ];
        let forest = build_forest(rows, 3, &[]);
        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.name, "变电工程");
        assert_eq!(root.level, 1);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].name, "晋城周村220kV变电站新建工程");
        assert_eq!(root.children[1].name, "凤城220kV变电站220kV间隔扩建工程");
    }

    #[test]
    fn test_roots_keep_source_order() {
        let rows = vec![row("乙", 1), row("甲", 1)];
        let forest = build_forest(rows, 3, &[]);
        let names: Vec<_> = forest.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["乙", "甲"]);
    }

    #[test]
    fn test_depth_clamped_to_schema_max() {
        let rows = vec![row("a", 1), row("b", 3)];
        let forest = build_forest(rows, 2, &[]);
        assert_eq!(forest[0].children[0].name, "b");
        assert_eq!(forest[0].children[0].level, 2);
    }

    #[test]
    fn test_level_jump_normalized() {
        // A level-3 row directly under a level-1 parent still satisfies
        // child.level == parent.level + 1 in the output.
        let rows = vec![row("a", 1), row("b", 3)];
        let forest = build_forest(rows, 3, &[]);
        assert_eq!(forest[0].level, 1);
        assert_eq!(forest[0].children[0].level, 2);
    }

    #[test]
    fn test_subtotal_is_leaf() {
        let mut subtotal = row("合计", 0);
        subtotal.is_subtotal = true;
        let rows = vec![subtotal, row("变电工程", 1), row("某站", 2)];
        let forest = build_forest(rows, 3, &[]);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "合计");
        assert!(forest[0].children.is_empty());
        assert_eq!(forest[1].children.len(), 1);
    }

    #[test]
    fn test_numeric_fields_coerced() {
        let r = row("a", 1).with_field("staticInvestment", "1,234.567万元");
        let forest = build_forest(vec![r], 3, &["staticInvestment"]);
        assert_eq!(
            forest[0].attributes["staticInvestment"].as_number(),
            Some(1234.57)
        );
    }

    #[test]
    fn test_forest_has_no_shared_nodes() {
        // Traverse with a visited set over node addresses.
        let rows = vec![row("a", 1), row("b", 2), row("c", 2), row("d", 1)];
        let forest = build_forest(rows, 3, &[]);
        let mut seen = std::collections::HashSet::new();
        for root in &forest {
            root.walk(&mut |n| {
                assert!(seen.insert(n as *const _ as usize), "node visited twice");
            });
        }
        assert_eq!(seen.len(), 4);
    }
}
