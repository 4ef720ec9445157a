//! End-to-end runs over the three render modes.

use phylojoin_core::error::PhyloError;
use phylojoin_core::io::csv::parse_distance_matrix;
use phylojoin_core::phylo::{build_taxonomy, run, RenderMode, Taxonomy};

const CLASSIC: &str = "\
,A,B,C,D
A,0,5,9,9
B,5,0,10,10
C,9,10,0,8
D,9,10,8,0
";

fn run_to_string(input: &str, mode: RenderMode, outlier: Option<&str>) -> String {
    let matrix = parse_distance_matrix(input.as_bytes()).unwrap();
    let mut out = Vec::new();
    run(&matrix, mode, outlier, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn edge_stream_mode() {
    let out = run_to_string(CLASSIC, RenderMode::Edges, None);
    assert_eq!(out, "0,4,2.00\n1,4,3.00\n2,5,4.00\n3,5,4.00\n4,5,3.00\n");
}

#[test]
fn matrix_mode() {
    let out = run_to_string(CLASSIC, RenderMode::Matrix, None);
    let expected = "\
,A,B,C,D,#4,#5
A,0.00,5.00,9.00,9.00,2.00,0.00
B,5.00,0.00,10.00,10.00,3.00,0.00
C,9.00,10.00,0.00,8.00,7.00,4.00
D,9.00,10.00,8.00,0.00,7.00,4.00
#4,2.00,3.00,7.00,7.00,0.00,3.00
#5,0.00,0.00,4.00,4.00,3.00,0.00
";
    assert_eq!(out, expected);
}

#[test]
fn newick_mode_default_outlier() {
    let out = run_to_string(CLASSIC, RenderMode::Newick, None);
    assert_eq!(out, "((A:2.00,B:3.00)#4:3.00,D:4.00);\n");
}

#[test]
fn newick_mode_named_outlier() {
    let out = run_to_string(CLASSIC, RenderMode::Newick, Some("A"));
    assert_eq!(out, "((C:4.00,D:4.00)#5:3.00,B:3.00);\n");
}

#[test]
fn output_is_deterministic() {
    for mode in [RenderMode::Edges, RenderMode::Matrix, RenderMode::Newick] {
        let first = run_to_string(CLASSIC, mode, None);
        let second = run_to_string(CLASSIC, mode, None);
        assert_eq!(first, second);
    }
}

#[test]
fn comment_lines_do_not_change_output() {
    let commented = format!("# generated\n# by hand\n# today\n{CLASSIC}");
    let plain = run_to_string(CLASSIC, RenderMode::Edges, None);
    let with_comments = run_to_string(&commented, RenderMode::Edges, None);
    assert_eq!(plain, with_comments);
}

#[test]
fn short_row_fails_without_output() {
    let result = parse_distance_matrix(b",A,B,C\nA,0,1\n");
    match result.unwrap_err() {
        PhyloError::RowShapeMismatch {
            expected: 4,
            found: 3,
            ..
        } => {}
        other => panic!("expected row shape mismatch, got {other:?}"),
    }
}

#[test]
fn asymmetric_matrix_fails() {
    let result = parse_distance_matrix(b",A,B\nA,0,5\nB,5.01,0\n");
    assert!(matches!(
        result.unwrap_err(),
        PhyloError::Asymmetric { .. }
    ));
}

#[test]
fn unknown_outlier_leaves_sink_untouched() {
    let matrix = parse_distance_matrix(CLASSIC.as_bytes()).unwrap();
    let mut out = Vec::new();
    let err = run(&matrix, RenderMode::Newick, Some("nope"), &mut out).unwrap_err();
    assert!(matches!(err, PhyloError::UnknownOutlier { .. }));
    assert!(out.is_empty());
}

/// Length of the unique tree path between two nodes, following the
/// capacity-3 adjacency and summing per-edge distances.
fn tree_path_length(taxonomy: &Taxonomy, a: usize, b: usize) -> f64 {
    let m = taxonomy.num_nodes();
    let mut prev = vec![usize::MAX; m];
    prev[a] = a;
    let mut queue = std::collections::VecDeque::from([a]);
    while let Some(i) = queue.pop_front() {
        for &j in taxonomy.node(i).neighbors.iter().flatten() {
            if prev[j] == usize::MAX {
                prev[j] = i;
                queue.push_back(j);
            }
        }
    }
    let mut total = 0.0;
    let mut cur = b;
    while cur != a {
        total += taxonomy.distance(cur, prev[cur]);
        cur = prev[cur];
    }
    total
}

#[test]
fn additive_input_is_recovered_along_tree_paths() {
    // The classic matrix is additive, so every pairwise input distance must
    // equal the sum of branch lengths along the reconstructed tree path.
    let matrix = parse_distance_matrix(CLASSIC.as_bytes()).unwrap();
    let taxonomy = build_taxonomy(&matrix, None).unwrap();
    for a in 0..matrix.n() {
        for b in 0..matrix.n() {
            if a == b {
                continue;
            }
            let path = tree_path_length(&taxonomy, a, b);
            assert!(
                (path - matrix.get(a, b)).abs() < 1e-6,
                "path {a}->{b}: {path} vs {}",
                matrix.get(a, b)
            );
        }
    }
}

#[test]
fn degenerate_sizes_end_to_end() {
    let one = run_to_string(",A\nA,0\n", RenderMode::Edges, None);
    assert!(one.is_empty());
    let one_newick = run_to_string(",A\nA,0\n", RenderMode::Newick, None);
    assert_eq!(one_newick, "A;\n");

    let two = run_to_string(",X,Y\nX,0,4\nY,4,0\n", RenderMode::Edges, None);
    assert_eq!(two, "0,1,4.00\n");
    let two_newick = run_to_string(",X,Y\nX,0,4\nY,4,0\n", RenderMode::Newick, Some("X"));
    assert_eq!(two_newick, "Y;\n");
}
