//! Graph Module Tests
//!
//! Validates dataset parsing and subgraph derivation.
//!
//! ## Test Scopes
//! - **Parsing**: adjacency/partition formats, implicit self-loops, and the
//!   fatal handling of malformed lines.
//! - **Derivation**: ownership, contributor sets, out-degrees, boundary
//!   computation, and routing tables for the reference 8-vertex scenario.

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::graph::builder::{
        build_subgraph, derive_reverse, parse_adjacency, parse_partition, parse_reverse,
    };

    /// The reference 8-vertex graph: vertices 1-4 form the interesting core,
    /// 6 is dangling (implicit self-loop), and 5/7/8 keep to themselves.
    const ADJACENCY: &str = "5 3 2\n1 3 4\n5 4 2 1\n2 3 6 7\n1\n\n8\n6\n";
    const PARTITION: &str = "3\n2\n2\n2\n3\n1\n1\n1\n";

    // ============================================================
    // PARSING TESTS
    // ============================================================

    #[test]
    fn test_parse_adjacency_basic() {
        let adjacency = parse_adjacency(ADJACENCY).unwrap();

        assert_eq!(adjacency.len(), 8);
        assert_eq!(adjacency[0], vec![5, 3, 2]);
        assert_eq!(adjacency[3], vec![2, 3, 6, 7]);
    }

    #[test]
    fn test_parse_adjacency_empty_line_is_self_loop() {
        let adjacency = parse_adjacency(ADJACENCY).unwrap();

        // Vertex 6's line is empty: it must become a self-loop with
        // out-degree 1, not a zero-degree sink.
        assert_eq!(adjacency[5], vec![6]);
    }

    #[test]
    fn test_parse_adjacency_rejects_garbage_token() {
        let result = parse_adjacency("2 x\n1\n");

        match result {
            Err(Error::Configuration(msg)) => assert!(msg.contains("line 1")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_adjacency_rejects_out_of_range_id() {
        // Only 2 vertices exist, so an edge to 9 is malformed input.
        let result = parse_adjacency("2 9\n1\n");

        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_parse_partition_basic() {
        let partition = parse_partition(PARTITION).unwrap();

        assert_eq!(partition, vec![3, 2, 2, 2, 3, 1, 1, 1]);
    }

    #[test]
    fn test_parse_partition_rejects_zero_ordinal() {
        assert!(matches!(
            parse_partition("1\n0\n"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_parse_partition_rejects_garbage() {
        assert!(matches!(
            parse_partition("1\ntwo\n"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_partition_length_must_match_adjacency() {
        let adjacency = parse_adjacency(ADJACENCY).unwrap();
        let partition = parse_partition("1\n2\n").unwrap();

        assert!(matches!(
            build_subgraph(&adjacency, None, &partition, 1),
            Err(Error::Configuration(_))
        ));
    }

    // ============================================================
    // REVERSE ADJACENCY TESTS
    // ============================================================

    #[test]
    fn test_derive_reverse_includes_self_loops() {
        let adjacency = parse_adjacency(ADJACENCY).unwrap();

        let reverse = derive_reverse(&adjacency);

        // 1 -> 2, 3 -> 2, 4 -> 2
        assert_eq!(reverse[1], vec![1, 3, 4]);
        // Dangling vertex 6 points at itself; 4 and 8 point at it too.
        let mut into_six = reverse[5].clone();
        into_six.sort();
        assert_eq!(into_six, vec![4, 6, 8]);
    }

    #[test]
    fn test_explicit_reverse_matches_derived() {
        let adjacency = parse_adjacency(ADJACENCY).unwrap();
        let partition = parse_partition(PARTITION).unwrap();
        // Hand-written reverse dataset for the same graph. Vertex 6's own
        // self-loop is intentionally absent: the builder must reconcile it.
        let reverse_text = "2 3 5\n1 3 4\n1 2 4\n2 3\n1 3\n4 8\n4\n7\n";
        let reverse = parse_reverse(reverse_text).unwrap();

        let from_explicit = build_subgraph(&adjacency, Some(&reverse), &partition, 1).unwrap();
        let from_derived = build_subgraph(&adjacency, None, &partition, 1).unwrap();

        for v in &from_derived.owned {
            let mut a = from_explicit.contributors[v].clone();
            let mut b = from_derived.contributors[v].clone();
            a.sort();
            b.sort();
            assert_eq!(a, b, "contributors of vertex {} diverge", v);
        }
        assert_eq!(from_explicit.boundary, from_derived.boundary);
    }

    // ============================================================
    // SUBGRAPH DERIVATION TESTS (reference scenario, uid = 2)
    // ============================================================

    #[test]
    fn test_ownership_for_uid_two() {
        let subgraph = reference_subgraph(2);

        assert_eq!(
            subgraph.owned.iter().copied().collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_contributors_and_out_degrees() {
        let subgraph = reference_subgraph(2);

        let mut into_two = subgraph.contributors[&2].clone();
        into_two.sort();
        assert_eq!(into_two, vec![1, 3, 4]);

        assert_eq!(subgraph.out_degree[&1], 3);
        assert_eq!(subgraph.out_degree[&2], 3);
        assert_eq!(subgraph.out_degree[&3], 4);
        assert_eq!(subgraph.out_degree[&4], 4);
    }

    #[test]
    fn test_boundary_is_contributors_owned_elsewhere() {
        let subgraph = reference_subgraph(2);

        // Vertex 1 (owned by uid 3) is the only external contributor to
        // {2, 3, 4}; forward neighbors 5/6/7 never send to us, so they must
        // not appear in the wait set.
        assert_eq!(subgraph.boundary.iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_routing_tables() {
        let subgraph = reference_subgraph(2);

        // 2 and 3 both have edges into uid 3's territory; 4 feeds uid 1.
        assert_eq!(subgraph.routing[&3], vec![2, 3]);
        assert_eq!(subgraph.routing[&1], vec![4]);
        assert!(!subgraph.routing.contains_key(&2));

        assert_eq!(
            subgraph.destinations[&4].iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn test_instance_with_no_destinations() {
        // uid 1 owns {6, 7, 8}, a closed cluster: it receives vertex 4's
        // updates but never sends anything.
        let subgraph = reference_subgraph(1);

        assert!(subgraph.routing.is_empty());
        assert_eq!(subgraph.boundary.iter().copied().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_dangling_vertex_contributes_to_itself() {
        let subgraph = reference_subgraph(1);

        let mut into_six = subgraph.contributors[&6].clone();
        into_six.sort();
        assert_eq!(into_six, vec![4, 6, 8]);
        assert_eq!(subgraph.out_degree[&6], 1);
    }

    fn reference_subgraph(uid: u32) -> crate::graph::types::Subgraph {
        let adjacency = parse_adjacency(ADJACENCY).unwrap();
        let partition = parse_partition(PARTITION).unwrap();
        build_subgraph(&adjacency, None, &partition, uid).unwrap()
    }
}
