use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use phylojoin_core::error::PhyloResult;
use phylojoin_core::io::csv::read_distance_matrix;
use phylojoin_core::phylo::{run, DistanceMatrix, RenderMode};

/// Reconstruct an unrooted phylogenetic tree from a CSV genetic-distance
/// matrix using the neighbor-joining method.
#[derive(Parser, Debug)]
#[command(
    name = "phylojoin",
    version,
    about = "Neighbor-joining phylogeny reconstruction from a CSV distance matrix"
)]
struct Args {
    /// Input CSV distance matrix (defaults to stdin)
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Emit the expanded distance matrix instead of the edge stream
    #[arg(short = 'm', long = "matrix", conflicts_with = "newick")]
    matrix: bool,

    /// Emit a rooted tree in Newick format
    #[arg(short = 'n', long = "newick")]
    newick: bool,

    /// Leaf to use as the outlier when rooting the Newick tree
    #[arg(short = 'o', long = "outlier", requires = "newick")]
    outlier: Option<String>,
}

fn main() {
    let args = Args::parse();

    let mode = if args.matrix {
        RenderMode::Matrix
    } else if args.newick {
        RenderMode::Newick
    } else {
        RenderMode::Edges
    };

    let matrix = match read_input(args.input.as_deref()) {
        Ok(matrix) => matrix,
        Err(err) => fail(err),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if let Err(err) = run(&matrix, mode, args.outlier.as_deref(), &mut out) {
        // Edge-stream mode may already have written edges; flush what there is.
        let _ = out.flush();
        fail(err);
    }
    if let Err(err) = out.flush() {
        fail(err.into());
    }
}

fn read_input(path: Option<&Path>) -> PhyloResult<DistanceMatrix> {
    match path {
        Some(path) => read_distance_matrix(File::open(path)?),
        None => read_distance_matrix(io::stdin().lock()),
    }
}

fn fail(err: phylojoin_core::error::PhyloError) -> ! {
    eprintln!("phylojoin: {err}");
    process::exit(1);
}
