use std::collections::HashMap;
use std::fmt::Debug;

use crate::config::NetworkConfig;
use crate::transit_graph::{LineSet, TransitGraph};


pub fn line_set(lines: &[&str]) -> LineSet {
    lines.iter().map(|ll| String::from(*ll)).collect()
}

pub fn line_sets(sets: &[&[&str]]) -> Vec<LineSet> {
    sets.iter().map(|ss| line_set(ss)).collect()
}

/// A-B-C on tram line "1", with the metro "U1" running B-D-C alongside it.
pub fn detour_graph(cfg: &NetworkConfig) -> TransitGraph {
    let mut graph = TransitGraph::new(cfg);
    graph.add_line("1", &["A", "B", "C"], None).unwrap();
    graph.add_line("U1", &["B", "D", "C"], None).unwrap();
    graph
}

/// Checks that the contents of two hashmaps are the same.
pub fn compare_hashmaps<KK, VV>(query_map: &HashMap<KK, VV>, true_map: &HashMap<KK, VV>)
    where KK: Debug + Eq + std::hash::Hash,
    VV: Debug + PartialEq,
{
    assert_eq!(query_map.len(), true_map.len());

    for (true_key, true_val) in true_map {
        match query_map.get(true_key) {
            Some(val) => assert_eq!(val, true_val),
            None => assert!(false, "Key {:?} missing!", true_key),
        }
    }
}
