//! Intermediate representation for table reconstruction.
//!
//! This module defines the IR that bridges raw OCR table markup and the
//! schema-specific JSON payloads: raw cells with their merge spans, the dense
//! logical grid they expand into, classified rows, and the output tree.
//! Every value is created fresh per conversion request and dropped when the
//! payload is emitted.

mod cell;
mod row;
mod table;
mod tree;

pub use cell::{GridCell, LogicalGrid, RawCell};
pub use row::ClassifiedRow;
pub use table::{LogicalTable, PhysicalTable, ProjectSection};
pub use tree::{AttrValue, TreeNode};
