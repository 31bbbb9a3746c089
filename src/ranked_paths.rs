use std::collections::hash_map::Entry::{Occupied, Vacant};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::cmp::Ordering;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableUnGraph;
use petgraph::visit::EdgeRef;

use super::transit_graph::Segment;
type GG = StableUnGraph<String, Segment>;


/// Dijkstra from `source` to `target` over segment travel times, ignoring the nodes and edges
/// in the exclusion sets.  Based on the implementation in the petgraph library, extended to
/// remember the edge each node was reached by so the path can be rebuilt.
///
/// Returns the cost of the path and its nodes, from `source` to `target` inclusive, or `None` if
/// `target` can't be reached.
pub fn dijkstra_with_exclusions(
    graph: &GG,
    source: NodeIndex,
    target: NodeIndex,
    banned_nodes: &HashSet<NodeIndex>,
    banned_edges: &HashSet<EdgeIndex>,
) -> Option<(f64, Vec<NodeIndex>)>
{
    if banned_nodes.contains(&source) || banned_nodes.contains(&target) {
        return None;
    }

    let mut visited = HashSet::new();
    let mut scores = HashMap::new();
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    scores.insert(source, 0.);

    let mut visit_next = BinaryHeap::new();
    visit_next.push(MinScored(0., source));
    while let Some(MinScored(node_score, node)) = visit_next.pop() {
        if visited.contains(&node) {
            continue;
        }
        if node == target {
            break;
        }
        for edge in graph.edges(node) {
            if banned_edges.contains(&edge.id()) {
                continue;
            }
            // undirected edges may be reported from either end
            let next = if edge.source() == node { edge.target() } else { edge.source() };
            if visited.contains(&next) || banned_nodes.contains(&next) {
                continue;
            }
            let next_score = node_score + edge.weight().travel_time;
            match scores.entry(next) {
                Occupied(ent) => {
                    if next_score < *ent.get() {
                        *ent.into_mut() = next_score;
                        visit_next.push(MinScored(next_score, next));
                        predecessors.insert(next, node);
                    }
                }
                Vacant(ent) => {
                    ent.insert(next_score);
                    visit_next.push(MinScored(next_score, next));
                    predecessors.insert(next, node);
                }
            }
        }
        visited.insert(node);
    }

    let cost = *scores.get(&target)?;
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        current = *predecessors.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some((cost, path))
}

/// Enumerates up to `kk` loopless paths from `source` to `target` in order of increasing total
/// travel time (Yen's algorithm).  Paths of equal cost come out in the order they were found.
pub fn k_shortest_simple_paths(graph: &GG, source: NodeIndex, target: NodeIndex, kk: usize)
                               -> Vec<(f64, Vec<NodeIndex>)> {
    let mut found: Vec<(f64, Vec<NodeIndex>)> = vec![];
    if kk == 0 || ! graph.contains_node(source) || ! graph.contains_node(target) {
        return found;
    }
    if source == target {
        found.push((0., vec![source]));
        return found;
    }

    let no_nodes = HashSet::new();
    let no_edges = HashSet::new();
    match dijkstra_with_exclusions(graph, source, target, &no_nodes, &no_edges) {
        Some(first) => found.push(first),
        None => return found,
    }

    let mut candidates: Vec<(f64, Vec<NodeIndex>)> = vec![];
    while found.len() < kk {
        let prev_path = match found.last() {
            Some((_, path)) => path.clone(),
            None => break,
        };

        for spur_pos in 0..prev_path.len() - 1 {
            let spur_node = prev_path[spur_pos];
            let root = &prev_path[..=spur_pos];

            // don't let the spur re-use the next edge of any found path sharing this root
            let mut banned_edges = HashSet::new();
            for (_, path) in &found {
                if path.len() > spur_pos + 1 && &path[..=spur_pos] == root {
                    if let Some(edge) = graph.find_edge(path[spur_pos], path[spur_pos + 1]) {
                        banned_edges.insert(edge);
                    }
                }
            }
            // nor revisit the root, which would make a loop
            let banned_nodes: HashSet<NodeIndex> = root[..spur_pos].iter().cloned().collect();

            if let Some((spur_cost, spur_path)) = dijkstra_with_exclusions(
                graph, spur_node, target, &banned_nodes, &banned_edges) {
                let root_cost = path_cost(graph, root);
                let mut total_path = root[..spur_pos].to_vec();
                total_path.extend(spur_path);
                let already_known = found.iter().chain(candidates.iter())
                                         .any(|(_, path)| *path == total_path);
                if ! already_known {
                    candidates.push((root_cost + spur_cost, total_path));
                }
            }
        }

        // take the cheapest candidate; the earliest one wins ties
        let mut best_idx: Option<usize> = None;
        for (ii, (cost, _)) in candidates.iter().enumerate() {
            match best_idx {
                Some(bi) if candidates[bi].0 <= *cost => (),
                _ => best_idx = Some(ii),
            }
        }
        match best_idx {
            Some(bi) => found.push(candidates.remove(bi)),
            None => break,
        }
    }
    found
}

fn path_cost(graph: &GG, path: &[NodeIndex]) -> f64 {
    path.windows(2).map(|pair| {
        match graph.find_edge(pair[0], pair[1]) {
            Some(edge) => graph[edge].travel_time,
            None => f64::INFINITY,
        }
    }).sum()
}


#[derive(Copy, Clone, Debug)]
pub struct MinScored<K, T>(pub K, pub T);

impl<K: PartialOrd, T> PartialEq for MinScored<K, T> {
    #[inline]
    fn eq(&self, other: &MinScored<K, T>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: PartialOrd, T> Eq for MinScored<K, T> {}

impl<K: PartialOrd, T> PartialOrd for MinScored<K, T> {
    #[inline]
    fn partial_cmp(&self, other: &MinScored<K, T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: PartialOrd, T> Ord for MinScored<K, T> {
    #[inline]
    fn cmp(&self, other: &MinScored<K, T>) -> Ordering {
        let a = &self.0;
        let b = &other.0;
        if a == b {
            Ordering::Equal
        } else if a < b {
            Ordering::Greater
        } else if a > b {
            Ordering::Less
        } else if a.ne(a) && b.ne(b) {
            // these are the NaN cases
            Ordering::Equal
        } else if a.ne(a) {
            // Order NaN less, so that it is last in the MinScore order
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}
