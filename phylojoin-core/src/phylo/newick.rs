use crate::error::{PhyloError, PhyloResult};
use crate::phylo::tree::Taxonomy;

/// Serialize the reconstructed tree in Newick format.
///
/// The tree is rooted at the sole neighbor of the outlier leaf; the outlier
/// itself is left out of the output and its edge length is discarded with
/// it. If `outlier_name` is `None`, the leaf with the greatest total
/// distance to the other leaves is used (ties go to the lowest index).
pub fn to_newick(taxonomy: &Taxonomy, outlier_name: Option<&str>) -> PhyloResult<String> {
    let outlier = match outlier_name {
        Some(name) => taxonomy
            .leaf_index(name)
            .ok_or_else(|| PhyloError::UnknownOutlier {
                name: name.to_string(),
            })?,
        None => farthest_leaf(taxonomy),
    };

    if taxonomy.num_leaves() == 1 {
        return Ok(format!("{};", taxonomy.node(0).name));
    }

    let root = taxonomy.node(outlier).neighbors[0].expect("leaf joined during reconstruction");

    if taxonomy.num_leaves() == 2 {
        // The outlier's neighbor is the other leaf; it stands alone.
        return Ok(format!("{};", taxonomy.node(root).name));
    }

    let mut out = String::new();
    out.push('(');
    let mut first = true;
    for &neighbor in taxonomy.node(root).neighbors.iter().flatten() {
        if neighbor == outlier {
            continue;
        }
        if !first {
            out.push(',');
        }
        first = false;
        write_subtree(taxonomy, neighbor, root, &mut out);
    }
    out.push_str(");");
    Ok(out)
}

fn write_subtree(taxonomy: &Taxonomy, index: usize, parent: usize, out: &mut String) {
    let node = taxonomy.node(index);
    if !taxonomy.is_leaf(index) {
        out.push('(');
        let mut first = true;
        for &neighbor in node.neighbors.iter().flatten() {
            if neighbor == parent {
                continue;
            }
            if !first {
                out.push(',');
            }
            first = false;
            write_subtree(taxonomy, neighbor, index, out);
        }
        out.push(')');
    }
    out.push_str(&node.name);
    out.push(':');
    out.push_str(&format!("{:.2}", taxonomy.distance(index, parent)));
}

/// Default outlier: the leaf with the greatest row sum over the original
/// leaf block of the matrix.
fn farthest_leaf(taxonomy: &Taxonomy) -> usize {
    let n = taxonomy.num_leaves();
    let mut best = 0;
    let mut best_sum = f64::NEG_INFINITY;
    for i in 0..n {
        let sum: f64 = (0..n).map(|j| taxonomy.distance(i, j)).sum();
        if sum > best_sum {
            best_sum = sum;
            best = i;
        }
    }
    best
}
