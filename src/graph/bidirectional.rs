use super::{DependencyGraph, LinkKey};

/// Collapse opposite same-type edge pairs into one bidirectional link.
///
/// Walks links in output order; for each A→B whose reverse B→A of the same
/// type is still present, B→A is removed and folded into A→B. The survivor is
/// therefore the edge with the smaller source path. Returns the number of
/// merged pairs.
pub fn merge_bidirectional(graph: &mut DependencyGraph) -> usize {
    let reverse_weight = graph.tuning().reverse_weight;

    let mut keys: Vec<LinkKey> = graph.links.keys().copied().collect();
    keys.sort_by(|a, b| {
        graph
            .path(a.source)
            .cmp(graph.path(b.source))
            .then_with(|| graph.path(a.target).cmp(graph.path(b.target)))
            .then_with(|| a.link_type.cmp(&b.link_type))
    });

    let mut merged = 0;
    for key in keys {
        if !graph.links.contains_key(&key) {
            continue;
        }
        let reverse_key = LinkKey {
            link_type: key.link_type,
            source: key.target,
            target: key.source,
        };
        let Some(reverse) = graph.links.remove(&reverse_key) else {
            continue;
        };
        if let Some(link) = graph.links.get_mut(&key) {
            link.strength = (link.strength + reverse_weight * reverse.strength).min(1.0);
            link.absorb(&reverse.symbols, &reverse.lines);
            link.bidirectional = true;
            merged += 1;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{graph, import};
    use crate::graph::{LinkType, Observation, detect_cycles};
    use std::path::PathBuf;

    #[test]
    fn test_mutual_imports_collapse_to_one_circular_link() {
        let mut g = graph(2);
        g.record(0, import(1, &["a"], 1));
        g.record(1, import(0, &["b"], 2));

        detect_cycles(&mut g);
        assert_eq!(merge_bidirectional(&mut g), 1);

        let links = g.into_links();
        assert_eq!(links.len(), 1);
        let link = &links[0];
        assert_eq!(link.source, PathBuf::from("/proj/f0.ts"));
        assert_eq!(link.link_type, LinkType::Circular);
        assert!(link.bidirectional);
        assert!((link.strength - 1.0).abs() < 1e-9);
        assert_eq!(link.symbols.len(), 2);
    }

    #[test]
    fn test_different_types_not_merged() {
        let mut g = graph(2);
        g.record(0, import(1, &["a"], 1));
        g.record(
            1,
            Observation::Call {
                target: 0,
                name: "go".into(),
                line: 3,
            },
        );
        assert_eq!(merge_bidirectional(&mut g), 0);
        assert!(g.into_links().iter().all(|l| !l.bidirectional));
    }

    #[test]
    fn test_merged_strength_weights_reverse_edge() {
        let mut g = graph(2);
        g.record(
            0,
            Observation::Call {
                target: 1,
                name: "f".into(),
                line: 1,
            },
        );
        g.record(
            1,
            Observation::Call {
                target: 0,
                name: "g".into(),
                line: 2,
            },
        );
        merge_bidirectional(&mut g);
        let links = g.into_links();
        assert_eq!(links.len(), 1);
        assert!((links[0].strength - 0.9).abs() < 1e-9, "0.6 + 0.5 * 0.6");
    }
}
