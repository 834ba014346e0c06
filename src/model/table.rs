//! Physical and logical tables.

use super::RawCell;

/// One `<table>` block as extracted from the Markdown, before grid
/// reconstruction: rows of raw cells in document order.
#[derive(Debug, Clone, Default)]
pub struct PhysicalTable {
    /// Position of the table in the document, 0-based.
    pub index: usize,

    /// Raw cells per source row.
    pub rows: Vec<Vec<RawCell>>,
}

impl PhysicalTable {
    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of source rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One named table assembled from one or more physical tables sharing a
/// header signature, possibly across page breaks.
#[derive(Debug, Clone)]
pub struct LogicalTable {
    /// Canonical table name from the signature registry.
    pub name: String,

    /// Column count, taken from the first matched physical table.
    pub cols: usize,

    /// Header rows (resolved texts) from the first occurrence.
    pub header: Vec<Vec<String>>,

    /// Data rows in document order: page 1 rows, then page 2 rows, ...
    pub rows: Vec<Vec<String>>,
}

impl LogicalTable {
    /// Check if the table carries no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rows of one logical table grouped under an engineering-project name line.
#[derive(Debug, Clone)]
pub struct ProjectSection {
    /// Project name detected from a full-width label row.
    pub project: String,

    /// Data rows belonging to this project.
    pub rows: Vec<Vec<String>>,
}
