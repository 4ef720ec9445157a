use crate::error::{PhyloError, PhyloResult};
use crate::limits::MAX_TAXA;

/// Symmetric pairwise distances over `n` labeled taxa, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    labels: Vec<Box<str>>,
    data: Vec<f64>,
    n: usize,
}

impl DistanceMatrix {
    /// Build a matrix from labels and row-major data, validating the shape
    /// invariants. The diagonal is compared against zero after narrowing to
    /// single precision; symmetry is exact.
    pub fn from_parts(labels: Vec<Box<str>>, data: Vec<f64>) -> PhyloResult<Self> {
        let n = labels.len();
        assert!(n >= 1, "distance matrix requires at least one taxon");
        assert_eq!(
            data.len(),
            n * n,
            "distance matrix data length mismatch: expected {}, got {}",
            n * n,
            data.len()
        );
        if n > MAX_TAXA {
            return Err(PhyloError::TooManyTaxa { n, max: MAX_TAXA });
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if labels[i] == labels[j] {
                    return Err(PhyloError::DuplicateLabel {
                        label: labels[i].to_string(),
                    });
                }
            }
        }
        for i in 0..n {
            for j in 0..n {
                let v = data[i * n + j];
                if !v.is_finite() || v < 0.0 {
                    return Err(PhyloError::InvalidDistance { i, j });
                }
            }
        }
        for i in 0..n {
            if data[i * n + i] as f32 != 0.0 {
                return Err(PhyloError::NonZeroDiagonal { index: i });
            }
            for j in (i + 1)..n {
                if data[i * n + j] != data[j * n + i] {
                    return Err(PhyloError::Asymmetric { i, j });
                }
            }
        }
        Ok(Self { labels, data, n })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn labels(&self) -> &[Box<str>] {
        &self.labels
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn set(&mut self, i: usize, j: usize, val: f64) {
        self.data[i * self.n + j] = val;
        self.data[j * self.n + i] = val;
    }
}
