//! Strict line-oriented CSV for distance matrices.
//!
//! Lines whose first byte is `#` are comments and are skipped wherever they
//! occur. The first content line is the header: an empty field followed by
//! the taxon labels. The next `n` lines each carry a label echoing the
//! header plus `n` distances. Anything after the last data row is ignored.

use std::io::{Read, Write};

use crate::error::{PhyloError, PhyloResult};
use crate::limits::{INPUT_MAX, MAX_TAXA};
use crate::phylo::matrix::DistanceMatrix;
use crate::phylo::tree::Taxonomy;

/// Parse an in-memory distance matrix.
pub fn parse_distance_matrix(input: &[u8]) -> PhyloResult<DistanceMatrix> {
    let mut lines = LineCursor::new(input);

    let (header_line, header) = lines
        .next_content_line()
        .ok_or_else(|| PhyloError::MalformedLabel {
            line: lines.line_no() + 1,
        })?;
    let labels = parse_header(header_line, header)?;
    let n = labels.len();

    let mut data = vec![0.0f64; n * n];
    for i in 0..n {
        let (line_no, row) =
            lines
                .next_content_line()
                .ok_or_else(|| PhyloError::RowShapeMismatch {
                    line: lines.line_no() + 1,
                    expected: n + 1,
                    found: 0,
                })?;
        parse_row(line_no, row, &labels[i], &mut data[i * n..(i + 1) * n])?;
    }
    // Whatever follows the last data row is ignored.

    DistanceMatrix::from_parts(labels, data)
}

/// Slurp `input` and parse it; the matrix is expected to fit in memory.
pub fn read_distance_matrix<R: Read>(mut input: R) -> PhyloResult<DistanceMatrix> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    parse_distance_matrix(&buf)
}

/// Write a matrix in the same CSV shape the parser accepts, with two-decimal
/// distances.
pub fn write_distance_matrix<W: Write>(matrix: &DistanceMatrix, mut out: W) -> PhyloResult<()> {
    for label in matrix.labels() {
        write!(out, ",{label}")?;
    }
    writeln!(out)?;
    for (i, label) in matrix.labels().iter().enumerate() {
        write!(out, "{label}")?;
        for j in 0..matrix.n() {
            write!(out, ",{:.2}", matrix.get(i, j))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the expanded post-reconstruction matrix: one row and column per
/// node, synthesized internal nodes included.
pub fn write_expanded_matrix<W: Write>(taxonomy: &Taxonomy, mut out: W) -> PhyloResult<()> {
    for node in taxonomy.nodes() {
        write!(out, ",{}", node.name)?;
    }
    writeln!(out)?;
    for (i, node) in taxonomy.nodes().iter().enumerate() {
        write!(out, "{}", node.name)?;
        for j in 0..taxonomy.num_nodes() {
            write!(out, ",{:.2}", taxonomy.distance(i, j))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Hands out `\n`-terminated lines (terminator stripped), skipping comment
/// lines and tracking 1-based line numbers.
struct LineCursor<'a> {
    rest: &'a [u8],
    line_no: usize,
}

impl<'a> LineCursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { rest: buf, line_no: 0 }
    }

    fn line_no(&self) -> usize {
        self.line_no
    }

    fn next_content_line(&mut self) -> Option<(usize, &'a [u8])> {
        loop {
            if self.rest.is_empty() {
                return None;
            }
            self.line_no += 1;
            let line = match self.rest.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    let line = &self.rest[..end];
                    self.rest = &self.rest[end + 1..];
                    line
                }
                None => {
                    let line = self.rest;
                    self.rest = &self.rest[self.rest.len()..];
                    line
                }
            };
            if line.first() == Some(&b'#') {
                continue;
            }
            return Some((self.line_no, line));
        }
    }
}

fn parse_header(line_no: usize, line: &[u8]) -> PhyloResult<Vec<Box<str>>> {
    let fields: Vec<&[u8]> = line.split(|&b| b == b',').collect();
    if !fields[0].is_empty() || fields.len() == 1 {
        return Err(PhyloError::MalformedLabel { line: line_no });
    }
    let n = fields.len() - 1;
    if n > MAX_TAXA {
        return Err(PhyloError::TooManyTaxa { n, max: MAX_TAXA });
    }
    let mut labels = Vec::with_capacity(n);
    for field in &fields[1..] {
        check_field_len(field, line_no)?;
        if field.is_empty() {
            return Err(PhyloError::MalformedLabel { line: line_no });
        }
        let label = std::str::from_utf8(field)
            .map_err(|_| PhyloError::MalformedLabel { line: line_no })?;
        labels.push(label.to_string().into_boxed_str());
    }
    Ok(labels)
}

fn parse_row(
    line_no: usize,
    line: &[u8],
    expected_label: &str,
    out_row: &mut [f64],
) -> PhyloResult<()> {
    let fields: Vec<&[u8]> = line.split(|&b| b == b',').collect();
    let expected = out_row.len() + 1;
    if fields.len() != expected {
        return Err(PhyloError::RowShapeMismatch {
            line: line_no,
            expected,
            found: fields.len(),
        });
    }

    let label = fields[0];
    check_field_len(label, line_no)?;
    if label.is_empty() {
        return Err(PhyloError::MalformedLabel { line: line_no });
    }
    if label != expected_label.as_bytes() {
        return Err(PhyloError::LabelMismatch {
            line: line_no,
            expected: expected_label.to_string(),
            found: String::from_utf8_lossy(label).into_owned(),
        });
    }

    for (slot, field) in out_row.iter_mut().zip(&fields[1..]) {
        *slot = parse_number(field, line_no)?;
    }
    Ok(())
}

/// `[0-9]+(\.[0-9]+)?` — no sign or exponent, and a leading zero is only
/// legal as the single integer digit. The integer part accumulates as
/// `10·v + d`; the fraction digit by digit.
fn parse_number(field: &[u8], line: usize) -> PhyloResult<f64> {
    if field.is_empty() {
        return Err(PhyloError::MissingField { line });
    }
    check_field_len(field, line)?;

    let mut value = 0.0f64;
    let mut pos = 0;
    while pos < field.len() && field[pos].is_ascii_digit() {
        value = value * 10.0 + f64::from(field[pos] - b'0');
        pos += 1;
    }
    if pos == 0 {
        return Err(PhyloError::MalformedNumber { line });
    }
    if field[0] == b'0' && pos > 1 {
        return Err(PhyloError::MalformedNumber { line });
    }
    if pos == field.len() {
        return Ok(value);
    }
    if field[pos] != b'.' || pos + 1 == field.len() {
        return Err(PhyloError::MalformedNumber { line });
    }
    pos += 1;
    let mut scale = 0.1f64;
    while pos < field.len() {
        let b = field[pos];
        if !b.is_ascii_digit() {
            return Err(PhyloError::MalformedNumber { line });
        }
        value += f64::from(b - b'0') * scale;
        scale *= 0.1;
        pos += 1;
    }
    Ok(value)
}

fn check_field_len(field: &[u8], line: usize) -> PhyloResult<()> {
    if field.len() > INPUT_MAX {
        return Err(PhyloError::FieldTooLong {
            line,
            max: INPUT_MAX,
        });
    }
    Ok(())
}
