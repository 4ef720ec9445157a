use std::io::Write;

use crate::error::{PhyloError, PhyloResult};
use crate::limits::MAX_NODES;
use crate::phylo::matrix::DistanceMatrix;
use crate::phylo::tree::{Node, Taxonomy};

/// Receives each joined edge as soon as it is created. The order is fixed:
/// within an iteration the `f` edge precedes the `g` edge, iterations run in
/// sequence, and the closing edge between the last two active nodes comes
/// last.
pub trait EdgeSink {
    fn edge(&mut self, u: usize, v: usize, length: f64) -> PhyloResult<()>;
}

/// Writes edges as `u,v,length` lines with two-decimal lengths.
pub struct CsvEdgeWriter<W: Write> {
    out: W,
}

impl<W: Write> CsvEdgeWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EdgeSink for CsvEdgeWriter<W> {
    fn edge(&mut self, u: usize, v: usize, length: f64) -> PhyloResult<()> {
        writeln!(self.out, "{u},{v},{length:.2}")?;
        Ok(())
    }
}

/// Neighbor-joining reconstruction state: the node table, the expanded
/// distance matrix, and the set of nodes still eligible for joining. An
/// engine is built from one matrix and consumed by one `build` call.
pub struct NjEngine {
    num_taxa: usize,
    dim: usize,
    nodes: Vec<Node>,
    dist: Vec<f64>,
    row_sums: Vec<f64>,
    active: Vec<usize>,
}

impl NjEngine {
    pub fn new(matrix: &DistanceMatrix) -> Self {
        let n = matrix.n();
        // n leaves plus n - 2 synthesized internal nodes; no internals are
        // created below three taxa.
        let dim = if n >= 3 { 2 * n - 2 } else { n };
        let mut nodes = Vec::with_capacity(dim);
        for label in matrix.labels() {
            nodes.push(Node::leaf(label.clone()));
        }
        let mut dist = vec![0.0f64; dim * dim];
        for i in 0..n {
            for j in 0..n {
                dist[i * dim + j] = matrix.get(i, j);
            }
        }
        Self {
            num_taxa: n,
            dim,
            nodes,
            dist,
            row_sums: vec![0.0f64; dim],
            active: (0..n).collect(),
        }
    }

    /// Run the reconstruction, emitting every joined edge to `sink` as it is
    /// created, and return the fully linked tree.
    pub fn build(mut self, mut sink: Option<&mut dyn EdgeSink>) -> PhyloResult<Taxonomy> {
        match self.num_taxa {
            1 => {}
            2 => {
                let d = self.d(0, 1);
                emit(&mut sink, 0, 1, d)?;
                self.nodes[0].neighbors[0] = Some(1);
                self.nodes[1].neighbors[0] = Some(0);
            }
            _ => self.join_all(&mut sink)?,
        }
        Ok(Taxonomy::new(self.nodes, self.dist, self.dim, self.num_taxa))
    }

    fn join_all(&mut self, sink: &mut Option<&mut dyn EdgeSink>) -> PhyloResult<()> {
        for _ in 0..self.num_taxa - 2 {
            self.join_closest(sink)?;
        }

        // Two nodes remain; the closing edge connects them directly.
        let (p, q) = (self.active[0], self.active[1]);
        let closing = self.d(p, q);
        emit(sink, p, q, closing)?;
        self.nodes[p].neighbors[0] = Some(q);
        self.nodes[q].neighbors[0] = Some(p);
        Ok(())
    }

    fn join_closest(&mut self, sink: &mut Option<&mut dyn EdgeSink>) -> PhyloResult<()> {
        let r = self.active.len() as f64;

        for pos in 0..self.active.len() {
            let i = self.active[pos];
            let mut sum = 0.0;
            for other in 0..self.active.len() {
                sum += self.d(i, self.active[other]);
            }
            self.row_sums[i] = sum;
        }

        // Pair minimizing Q; the first pair in scan order wins ties, which
        // keeps the output reproducible.
        let mut best = f64::INFINITY;
        let mut f = self.active[0];
        let mut g = self.active[1];
        for (pos, &i) in self.active.iter().enumerate() {
            for &j in &self.active[pos + 1..] {
                let q = (r - 2.0) * self.d(i, j) - self.row_sums[i] - self.row_sums[j];
                if q < best {
                    best = q;
                    f = i;
                    g = j;
                }
            }
        }

        let u = self.synthesize()?;
        let dfg = self.d(f, g);
        let len_f = dfg / 2.0 + (self.row_sums[f] - self.row_sums[g]) / (2.0 * (r - 2.0));
        let len_g = dfg - len_f;
        emit(sink, f, u, len_f)?;
        emit(sink, g, u, len_g)?;

        self.nodes[u].neighbors[1] = Some(f);
        self.nodes[u].neighbors[2] = Some(g);
        self.nodes[f].neighbors[0] = Some(u);
        self.nodes[g].neighbors[0] = Some(u);

        for pos in 0..self.active.len() {
            let k = self.active[pos];
            if k == f || k == g {
                continue;
            }
            let duk = (self.d(f, k) + self.d(g, k) - dfg) / 2.0;
            self.set_d(u, k, duk);
        }
        // The joined pair's rows keep the two branch lengths so the expanded
        // matrix carries every edge of the finished tree.
        self.set_d(u, f, len_f);
        self.set_d(u, g, len_g);
        self.dist[u * self.dim + u] = 0.0;

        self.active.retain(|&k| k != f && k != g);
        self.active.push(u);
        Ok(())
    }

    fn synthesize(&mut self) -> PhyloResult<usize> {
        let index = self.nodes.len();
        if index + 1 > MAX_NODES {
            return Err(PhyloError::NodeLimitExceeded {
                n: index + 1,
                max: MAX_NODES,
            });
        }
        self.nodes.push(Node {
            name: format!("#{index}").into_boxed_str(),
            neighbors: [None; 3],
        });
        Ok(index)
    }

    fn d(&self, i: usize, j: usize) -> f64 {
        self.dist[i * self.dim + j]
    }

    fn set_d(&mut self, i: usize, j: usize, val: f64) {
        self.dist[i * self.dim + j] = val;
        self.dist[j * self.dim + i] = val;
    }
}

fn emit(
    sink: &mut Option<&mut dyn EdgeSink>,
    u: usize,
    v: usize,
    length: f64,
) -> PhyloResult<()> {
    match sink {
        Some(sink) => sink.edge(u, v, length),
        None => Ok(()),
    }
}

/// Construct the engine and run it in one call.
pub fn build_taxonomy(
    matrix: &DistanceMatrix,
    sink: Option<&mut dyn EdgeSink>,
) -> PhyloResult<Taxonomy> {
    NjEngine::new(matrix).build(sink)
}
