//! Reachability trimming: the packages a run list can possibly touch.

use std::collections::{HashMap, VecDeque};

use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;

use crate::graph::{DependencyGraph, PackageId, SolutionConstraint};

/// Packages reachable from the run list over any dependency edge of any
/// surviving version, sorted by name.
///
/// Packages with no versions (undeclared or filtered out) are included so
/// callers can report on them.
pub fn trim(graph: &DependencyGraph, run_list: &[SolutionConstraint]) -> Vec<PackageId> {
    let edges = graph.package_edges();
    let mut reached = vec![false; graph.package_count()];

    let mut dfs = Dfs::empty(edges);
    for constraint in run_list {
        if reached[constraint.package.index()] {
            continue;
        }
        dfs.move_to(constraint.package.node());
        while let Some(node) = dfs.next(edges) {
            reached[node.index()] = true;
        }
    }

    let mut closure: Vec<PackageId> = graph
        .package_ids()
        .filter(|id| reached[id.index()])
        .collect();
    closure.sort_by(|a, b| graph.name(*a).cmp(graph.name(*b)));

    tracing::debug!(
        "trimmed {} packages to a closure of {}",
        graph.package_count(),
        closure.len()
    );
    closure
}

/// Same as [`trim`], as package names.
pub fn trim_names(graph: &DependencyGraph, run_list: &[SolutionConstraint]) -> Vec<String> {
    trim(graph, run_list)
        .into_iter()
        .map(|id| graph.name(id).to_string())
        .collect()
}

/// Shortest dependency path from `from` to `to`, both ends included.
pub fn path_between(
    graph: &DependencyGraph,
    from: PackageId,
    to: PackageId,
) -> Option<Vec<PackageId>> {
    if from == to {
        return Some(vec![from]);
    }

    let edges = graph.package_edges();
    let mut parent: HashMap<PackageId, PackageId> = HashMap::new();
    let mut queue = VecDeque::from([from]);

    while let Some(current) = queue.pop_front() {
        // Edges come back newest-first; sort for a stable path.
        let mut next: Vec<PackageId> = edges
            .edges_directed(current.node(), Direction::Outgoing)
            .map(|e| edges[e.target()])
            .collect();
        next.sort_by(|a, b| graph.name(*a).cmp(graph.name(*b)));
        next.dedup();

        for target in next {
            if target == from || parent.contains_key(&target) {
                continue;
            }
            parent.insert(target, current);
            if target == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(&p) = parent.get(&cursor) {
                    path.push(p);
                    cursor = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(target);
        }
    }
    None
}
