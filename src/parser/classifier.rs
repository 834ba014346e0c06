//! Numbering and level classification.
//!
//! A row's leading label decides its hierarchy depth. The taxonomy covers
//! Chinese numerals (`一、` — tier 1), Arabic numerals (`1、` — tier 2),
//! parenthesised numerals (`（一）`/`(1)` — sub-item of the open parent),
//! `其中:` markers (sub-item, prefix stripped), and literal roll-up keywords
//! (`合计`, `小计`, ...). Rules are evaluated in fixed precedence order;
//! first match wins.
//!
//! The classifier carries an explicit stack of currently open ancestor
//! levels so sub-items attach under the most recent row at the immediately
//! shallower level. One classifier instance serves one logical table, in
//! source row order.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::detect::DocumentType;

/// Deepest level the classifier ever assigns.
const MAX_LEVEL: u8 = 3;

static CHINESE_SERIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]+[、，,.．]?$").unwrap());
static ARABIC_SERIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[、，,.．]?$").unwrap());
static PAREN_SERIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[（(](?:[一二三四五六七八九十]+|\d+)[）)]").unwrap());
static CHINESE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]+[、，,.．]").unwrap());
static ARABIC_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[、，,.．]").unwrap());

/// Literal keywords that force a level regardless of numbering.
const TOP_ROLLUP_KEYWORDS: &[&str] = &[
    "合计",
    "工程静态投资",
    "工程动态投资",
    "可抵扣固定资产增值税额",
];

/// `其中:` prefixes, both half- and full-width colon.
const AMONG_WHICH_PREFIXES: &[&str] = &["其中:", "其中："];

/// The numbering taxonomy active for one document type.
///
/// All current schemas share the same numeral rules; the taxonomy keeps the
/// per-type hook the schema mapper selects by.
#[derive(Debug, Clone, Copy)]
pub struct Taxonomy {
    doc_type: DocumentType,
}

impl Taxonomy {
    /// Taxonomy for one document type.
    pub fn for_document(doc_type: DocumentType) -> Self {
        Self { doc_type }
    }

    /// The document type this taxonomy serves.
    pub fn document_type(&self) -> DocumentType {
        self.doc_type
    }

    /// Deepest level this taxonomy assigns: the schema's declared depth, or
    /// the global maximum for types without a tree.
    pub fn depth_limit(&self) -> u8 {
        match self.doc_type.max_depth() {
            0 => MAX_LEVEL,
            depth => depth,
        }
    }
}

/// Result of classifying one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Assigned hierarchy depth, 0..=3.
    pub level: u8,

    /// Normalized label: the name text with any `其中:` prefix stripped.
    pub label: String,

    /// Whether the row is a 合计/小计-style roll-up.
    pub is_subtotal: bool,
}

/// Check whether text is a serial/numbering token (`一`, `一、`, `1`, `(2)`),
/// bare or delimited. Used to tell a data row from a trailing header row.
pub fn is_serial_token(text: &str) -> bool {
    let t = text.trim();
    CHINESE_SERIAL_RE.is_match(t)
        || ARABIC_SERIAL_RE.is_match(t)
        || PAREN_SERIAL_RE.is_match(t)
        || CHINESE_PREFIX_RE.is_match(t)
        || ARABIC_PREFIX_RE.is_match(t)
}

/// Stateful row-by-row level classifier.
#[derive(Debug)]
pub struct LevelClassifier {
    taxonomy: Taxonomy,
    /// Open ancestor levels, strictly increasing bottom to top.
    stack: Vec<u8>,
}

impl LevelClassifier {
    /// Create a classifier for one logical table.
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy,
            stack: Vec::new(),
        }
    }

    /// The currently open ancestor levels, shallowest first.
    pub fn open_levels(&self) -> &[u8] {
        &self.stack
    }

    /// Classify one row given its serial cell and name cell texts.
    pub fn classify(&mut self, serial: &str, name: &str) -> Classification {
        let serial = serial.trim();
        let name = name.trim();

        // Rule 1: literal terminal keywords.
        if TOP_ROLLUP_KEYWORDS.contains(&name) {
            // Roll-ups close every open section and never open a parent.
            self.stack.clear();
            return Classification {
                level: 0,
                label: name.to_string(),
                is_subtotal: true,
            };
        }
        if name == "小计" {
            let level = self.stack.last().copied().unwrap_or(0);
            return Classification {
                level,
                label: name.to_string(),
                is_subtotal: true,
            };
        }

        // Rule 2: parenthesised numeral — sub-item of the open parent.
        if PAREN_SERIAL_RE.is_match(serial) || PAREN_SERIAL_RE.is_match(name) {
            let limit = self.taxonomy.depth_limit();
            let level = self
                .stack
                .last()
                .map(|l| (l + 1).min(limit))
                .unwrap_or(limit);
            self.open(level);
            return Classification {
                level,
                label: name.to_string(),
                is_subtotal: false,
            };
        }

        // Rule 3: 其中: marker — sub-item, prefix stripped.
        for prefix in AMONG_WHICH_PREFIXES {
            if let Some(stripped) = name.strip_prefix(prefix) {
                let level = self
                    .stack
                    .last()
                    .map(|l| (l + 1).min(self.taxonomy.depth_limit()))
                    .unwrap_or(1);
                self.open(level);
                return Classification {
                    level,
                    label: stripped.trim().to_string(),
                    is_subtotal: false,
                };
            }
        }

        // Rule 4: bare numeral serial, or a delimited numbering prefix on the
        // name when the serial column is absent.
        if CHINESE_SERIAL_RE.is_match(serial) || CHINESE_PREFIX_RE.is_match(name) {
            self.open(1);
            return Classification {
                level: 1,
                label: name.to_string(),
                is_subtotal: false,
            };
        }
        if ARABIC_SERIAL_RE.is_match(serial) || ARABIC_PREFIX_RE.is_match(name) {
            self.open(2);
            return Classification {
                level: 2,
                label: name.to_string(),
                is_subtotal: false,
            };
        }

        // Rule 5: no recognizable numbering — sibling continuation of the
        // previous row, or an independent root when nothing is open.
        let level = self.stack.last().copied().unwrap_or(0);
        Classification {
            level,
            label: name.to_string(),
            is_subtotal: false,
        }
    }

    /// Record a row at `level` as the now-open ancestor for that depth.
    fn open(&mut self, level: u8) {
        while self.stack.last().is_some_and(|l| *l >= level) {
            self.stack.pop();
        }
        self.stack.push(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LevelClassifier {
        LevelClassifier::new(Taxonomy::for_document(DocumentType::FsApproval))
    }

    #[test]
    fn test_chinese_serial_is_tier_one() {
        let mut c = classifier();
        let got = c.classify("一", "变电工程");
        assert_eq!(got.level, 1);
        assert_eq!(got.label, "变电工程");
        assert_eq!(c.open_levels(), [1]);
    }

    #[test]
    fn test_arabic_serial_is_tier_two() {
        let mut c = classifier();
        c.classify("一", "变电工程");
        let got = c.classify("1", "晋城周村220kV变电站新建工程");
        assert_eq!(got.level, 2);
        assert_eq!(c.open_levels(), [1, 2]);
    }

    #[test]
    fn test_delimited_prefix_in_name() {
        let mut c = classifier();
        assert_eq!(c.classify("", "二、线路工程").level, 1);
        assert_eq!(c.classify("", "3、某某线路").level, 2);
    }

    #[test]
    fn test_paren_serial_attaches_under_open_parent() {
        let mut c = classifier();
        c.classify("一", "变电工程");
        c.classify("1", "某站新建工程");
        let got = c.classify("(1)", "建筑工程费");
        assert_eq!(got.level, 3);
    }

    #[test]
    fn test_paren_serial_without_parent_defaults_deep() {
        let mut c = classifier();
        assert_eq!(c.classify("（一）", "某费用").level, 3);
    }

    #[test]
    fn test_among_which_prefix_stripped() {
        let mut c = classifier();
        c.classify("一", "其他费用");
        let got = c.classify("", "其中:建设场地征用及清理费");
        assert_eq!(got.level, 2);
        assert_eq!(got.label, "建设场地征用及清理费");
        assert!(!got.label.contains("其中"));
    }

    #[test]
    fn test_among_which_fullwidth_colon() {
        let mut c = classifier();
        c.classify("一", "其他费用");
        let got = c.classify("", "其中：建设场地征用及清理费");
        assert_eq!(got.label, "建设场地征用及清理费");
    }

    #[test]
    fn test_rollup_keywords_force_level_zero() {
        let mut c = classifier();
        c.classify("一", "变电工程");
        for kw in ["合计", "工程静态投资", "工程动态投资", "可抵扣固定资产增值税额"] {
            let got = c.classify("", kw);
            assert_eq!(got.level, 0, "{kw}");
            assert!(got.is_subtotal);
        }
        assert!(c.open_levels().is_empty());
    }

    #[test]
    fn test_subtotal_stays_at_open_level() {
        let mut c = classifier();
        c.classify("一", "变电工程");
        c.classify("1", "某站工程");
        let got = c.classify("", "小计");
        assert_eq!(got.level, 2);
        assert!(got.is_subtotal);
    }

    #[test]
    fn test_continuation_inherits_previous_level() {
        let mut c = classifier();
        c.classify("一", "变电工程");
        c.classify("1", "某站工程");
        let got = c.classify("", "接上页某工程");
        assert_eq!(got.level, 2);
        assert!(!got.is_subtotal);
    }

    #[test]
    fn test_unnumbered_without_parent_is_root() {
        let mut c = classifier();
        let got = c.classify("", "独立说明行");
        assert_eq!(got.level, 0);
    }
}
