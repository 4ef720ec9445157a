use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhyloError {
    #[error("input field longer than {max} bytes at line {line}")]
    FieldTooLong { line: usize, max: usize },

    #[error("malformed numeric field at line {line}")]
    MalformedNumber { line: usize },

    #[error("missing numeric field at line {line}")]
    MissingField { line: usize },

    #[error("empty taxon label at line {line}")]
    MalformedLabel { line: usize },

    #[error("expected {expected} fields at line {line}, found {found}")]
    RowShapeMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("row label '{found}' at line {line} does not match header label '{expected}'")]
    LabelMismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("duplicate taxon label '{label}'")]
    DuplicateLabel { label: String },

    #[error("non-zero distance on the diagonal at index {index}")]
    NonZeroDiagonal { index: usize },

    #[error("distance matrix is not symmetric at ({i}, {j})")]
    Asymmetric { i: usize, j: usize },

    #[error("{n} taxa exceeds the maximum of {max}")]
    TooManyTaxa { n: usize, max: usize },

    #[error("distance at ({i}, {j}) is not a finite non-negative value")]
    InvalidDistance { i: usize, j: usize },

    #[error("node count {n} exceeds the maximum of {max}")]
    NodeLimitExceeded { n: usize, max: usize },

    #[error("no leaf named '{name}' to use as outlier")]
    UnknownOutlier { name: String },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type PhyloResult<T> = Result<T, PhyloError>;
