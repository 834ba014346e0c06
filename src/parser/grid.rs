//! Cell grid reconstruction.
//!
//! Expands merge spans into a dense logical grid: walk raw cells in document
//! order, advance a column cursor past positions already claimed by an
//! earlier rowspan, then stamp the cell's text into its full
//! `row_span x col_span` footprint. A later cell never overwrites an earlier
//! claim; it binds to the first unoccupied column.

use std::collections::BTreeMap;

use crate::model::{GridCell, LogicalGrid, PhysicalTable};

/// A rowspan claim carried down from an earlier row.
#[derive(Debug, Clone)]
struct Carry {
    text: String,
    owner: (usize, usize),
    remaining: u32,
}

/// Reconstruct the dense logical grid for one physical table.
///
/// Rows whose cells, once spans are subtracted, do not fill the table width
/// are padded with empty cells and flagged incomplete; padding cells own
/// their own position so the one-owner invariant holds everywhere.
pub fn reconstruct_grid(table: &PhysicalTable) -> LogicalGrid {
    let mut rows: Vec<Vec<GridCell>> = Vec::with_capacity(table.rows.len());
    // Claims pending for the row currently being expanded, keyed by column.
    let mut carries: BTreeMap<usize, Carry> = BTreeMap::new();

    for (row_idx, raw_row) in table.rows.iter().enumerate() {
        let mut out: Vec<GridCell> = Vec::new();
        let mut next_carries: BTreeMap<usize, Carry> = BTreeMap::new();
        let mut col = 0usize;

        let take_carry = |col: &mut usize,
                          out: &mut Vec<GridCell>,
                          next: &mut BTreeMap<usize, Carry>,
                          carries: &mut BTreeMap<usize, Carry>|
         -> bool {
            if let Some(carry) = carries.remove(col) {
                out.push(GridCell {
                    text: carry.text.clone(),
                    owner: carry.owner,
                });
                if carry.remaining > 1 {
                    next.insert(
                        *col,
                        Carry {
                            remaining: carry.remaining - 1,
                            ..carry
                        },
                    );
                }
                *col += 1;
                true
            } else {
                false
            }
        };

        for cell in raw_row {
            let row_span = cell.row_span.max(1);
            let col_span = cell.col_span.max(1) as usize;
            if cell.row_span < 1 || cell.col_span < 1 {
                log::warn!(
                    "grid: clamped malformed span at ({}, {})",
                    cell.origin_row,
                    cell.origin_col
                );
            }

            // Each footprint position binds to the first unoccupied column:
            // claims carried down from earlier rows are flushed first and
            // never overwritten.
            let mut first_pos = None;
            for _ in 0..col_span {
                while take_carry(&mut col, &mut out, &mut next_carries, &mut carries) {}
                let owner = *first_pos.get_or_insert((row_idx, out.len()));
                out.push(GridCell {
                    text: cell.text.clone(),
                    owner,
                });
                if row_span > 1 {
                    next_carries.insert(
                        col,
                        Carry {
                            text: cell.text.clone(),
                            owner,
                            remaining: row_span - 1,
                        },
                    );
                }
                col += 1;
            }
        }

        // Stamp whatever rowspan claims remain for this row. Gaps between the
        // cursor and a claimed column become padding.
        while let Some((&claim_col, _)) = carries.iter().next() {
            while col < claim_col {
                out.push(GridCell {
                    text: String::new(),
                    owner: (row_idx, col),
                });
                col += 1;
            }
            take_carry(&mut col, &mut out, &mut next_carries, &mut carries);
        }

        rows.push(out);
        carries = next_carries;
    }

    // Width = max column count after span expansion; short rows are padded.
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut incomplete = Vec::with_capacity(rows.len());
    let mut cells = Vec::with_capacity(cols * rows.len());
    for (row_idx, mut row) in rows.into_iter().enumerate() {
        let short = row.len() < cols;
        if short {
            log::debug!(
                "grid: row {} padded from {} to {} columns",
                row_idx,
                row.len(),
                cols
            );
        }
        while row.len() < cols {
            let col = row.len();
            row.push(GridCell {
                text: String::new(),
                owner: (row_idx, col),
            });
        }
        incomplete.push(short);
        cells.extend(row);
    }

    LogicalGrid::from_parts(cols, cells, incomplete)
}
