pub mod matrix;
pub mod newick;
pub mod nj;
pub mod run;
pub mod tree;

pub use matrix::DistanceMatrix;
pub use newick::to_newick;
pub use nj::{build_taxonomy, CsvEdgeWriter, EdgeSink, NjEngine};
pub use run::{run, RenderMode};
pub use tree::{Node, Taxonomy};
