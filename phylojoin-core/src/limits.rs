/// Maximum number of bytes in a single CSV field, delimiters excluded.
pub const INPUT_MAX: usize = 1024;

/// Maximum number of taxa accepted from an input matrix.
pub const MAX_TAXA: usize = 128;

/// Maximum size of the node table: `n` leaves plus `n - 2` internal nodes.
pub const MAX_NODES: usize = 2 * MAX_TAXA - 2;
