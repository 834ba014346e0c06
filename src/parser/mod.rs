//! Table reconstruction pipeline.
//!
//! Stages run in document order: markup extraction splits `<table>` blocks
//! into raw cells, the grid reconstructor expands merge spans into a dense
//! grid, the router names and merges logical tables, the classifier assigns
//! hierarchy levels, and the tree builder assembles the output forest.

mod classifier;
mod grid;
mod markup;
mod router;
mod tree_builder;

pub use classifier::{is_serial_token, Classification, LevelClassifier, Taxonomy};
pub use grid::reconstruct_grid;
pub use markup::extract_tables;
pub use router::{
    group_by_project, normalize_header_text, signatures_for, TableRouter, TableSignature,
};
pub use tree_builder::build_forest;
