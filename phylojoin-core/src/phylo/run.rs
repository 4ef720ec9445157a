use std::io::Write;

use crate::error::PhyloResult;
use crate::io::csv::write_expanded_matrix;
use crate::phylo::matrix::DistanceMatrix;
use crate::phylo::newick::to_newick;
use crate::phylo::nj::{build_taxonomy, CsvEdgeWriter};

/// What the pipeline emits after reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Stream the joined edges as they are created.
    #[default]
    Edges,
    /// Emit the expanded distance matrix, internal nodes included.
    Matrix,
    /// Emit a rooted tree in Newick format.
    Newick,
}

/// Run the full pipeline on a parsed matrix, writing to `out`. In `Edges`
/// mode output is produced while the tree is being built; the other modes
/// build silently and render afterwards.
pub fn run<W: Write>(
    matrix: &DistanceMatrix,
    mode: RenderMode,
    outlier_name: Option<&str>,
    out: &mut W,
) -> PhyloResult<()> {
    match mode {
        RenderMode::Edges => {
            let mut edges = CsvEdgeWriter::new(&mut *out);
            build_taxonomy(matrix, Some(&mut edges))?;
            Ok(())
        }
        RenderMode::Matrix => {
            let taxonomy = build_taxonomy(matrix, None)?;
            write_expanded_matrix(&taxonomy, out)
        }
        RenderMode::Newick => {
            let taxonomy = build_taxonomy(matrix, None)?;
            let newick = to_newick(&taxonomy, outlier_name)?;
            writeln!(out, "{newick}")?;
            Ok(())
        }
    }
}
