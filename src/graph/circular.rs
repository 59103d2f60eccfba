use petgraph::graphmap::DiGraphMap;

use super::DependencyGraph;
use crate::resolver::FileId;

/// Detect cycles in the assembled graph and retag their edges as circular.
///
/// Runs an iterative depth-first search from every unvisited file in id
/// order over the union of all link types. Each back edge to a file still on
/// the DFS stack yields one cycle: the path slice from that file to the top.
/// Every consecutive pair of a cycle (wrapping around) is then retagged with
/// [`DependencyGraph::mark_circular`].
///
/// Returns the witnessed cycles, each as file ids in traversal order.
pub fn detect_cycles(graph: &mut DependencyGraph) -> Vec<Vec<FileId>> {
    let n = graph.file_count();
    let mut adjacency: DiGraphMap<FileId, ()> = DiGraphMap::with_capacity(n, graph.len());
    for id in 0..n {
        adjacency.add_node(id);
    }
    for (source, target) in graph.edge_pairs() {
        adjacency.add_edge(source, target, ());
    }

    let cycles = find_cycles(&adjacency, n);

    for cycle in &cycles {
        for (i, &source) in cycle.iter().enumerate() {
            let target = cycle[(i + 1) % cycle.len()];
            graph.mark_circular(source, target);
        }
    }

    cycles
}

struct Frame {
    node: FileId,
    neighbors: Vec<FileId>,
    next: usize,
}

fn frame(adjacency: &DiGraphMap<FileId, ()>, node: FileId) -> Frame {
    let mut neighbors: Vec<FileId> = adjacency.neighbors(node).collect();
    neighbors.sort_unstable();
    Frame {
        node,
        neighbors,
        next: 0,
    }
}

fn find_cycles(adjacency: &DiGraphMap<FileId, ()>, n: usize) -> Vec<Vec<FileId>> {
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut path: Vec<FileId> = Vec::new();
    let mut cycles = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }

        visited[root] = true;
        on_stack[root] = true;
        path.push(root);
        let mut stack = vec![frame(adjacency, root)];

        while let Some(top) = stack.last_mut() {
            if top.next < top.neighbors.len() {
                let next = top.neighbors[top.next];
                top.next += 1;

                if on_stack[next] {
                    if let Some(pos) = path.iter().position(|&p| p == next) {
                        cycles.push(path[pos..].to_vec());
                    }
                } else if !visited[next] {
                    visited[next] = true;
                    on_stack[next] = true;
                    path.push(next);
                    stack.push(frame(adjacency, next));
                }
            } else {
                on_stack[top.node] = false;
                path.pop();
                stack.pop();
            }
        }
    }

    cycles
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
