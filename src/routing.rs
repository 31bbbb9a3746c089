use super::error::TransitError;
use super::journeys::Route;
use super::modes::classify;
use super::ranked_paths::k_shortest_simple_paths;
use super::transit_graph::{LineSet, Segment, TransitGraph};
use super::RoutingConfig;


/// Finds the route from `source` to `target` with the lowest realistic travel time.
///
/// The `k` paths with the lowest raw travel time are enumerated (k comes from the config), and
/// each is re-scored with transfer penalties and waiting time added at every change of line.
/// The best-scoring candidate wins; ties go to the candidate that was enumerated first.
pub fn fastest_path<CC>(graph: &TransitGraph, cfg: &CC, source: &str, target: &str)
                        -> Result<Route, TransitError> where CC: RoutingConfig {
    let source_idx = graph.get_node_idx_by_id(source)
                          .ok_or_else(|| TransitError::unknown_station(source))?;
    let target_idx = graph.get_node_idx_by_id(target)
                          .ok_or_else(|| TransitError::unknown_station(target))?;
    let network = graph.get_network();

    let candidates = k_shortest_simple_paths(network, source_idx, target_idx,
                                             cfg.get_num_candidates());
    log::debug!("{} candidate paths from {} to {}", candidates.len(), source, target);

    let mut best: Option<Route> = None;
    for (_, path) in candidates {
        let mut segments: Vec<&Segment> = vec![];
        for pair in path.windows(2) {
            // the enumerator only walks existing edges
            if let Some(edge) = network.find_edge(pair[0], pair[1]) {
                segments.push(&network[edge]);
            }
        }
        let segment_lines: Vec<LineSet> = segments.iter().map(|ss| ss.lines.clone()).collect();
        let labels = minimize_line_labels(&segment_lines);

        let mut time: f64 = segments.iter().map(|ss| ss.travel_time).sum();
        for ii in 1..labels.len() {
            if labels[ii] != labels[ii - 1] {
                time += cfg.transfer_penalty(segments[ii - 1].mode, segments[ii].mode);
                time += segment_wait_time(cfg, graph, &labels[ii]);
            }
        }

        match &best {
            Some(best_route) if best_route.time <= time => (),
            _ => {
                let stations = path.iter()
                    .filter_map(|ni| graph.get_node_id_by_idx(*ni))
                    .map(String::from)
                    .collect();
                best = Some(Route {
                    lines: collapse_repeats(labels),
                    time,
                    stations,
                });
            }
        }
    }

    best.ok_or_else(|| TransitError::NoPathFound {
        origin: String::from(source),
        target: String::from(target),
    })
}

/// Reduces the per-segment line sets of a path to the shortest sequence of line sets that can
/// be ridden without changing, with no two neighbouring sets equal.
pub fn minimize_lines(segment_lines: &[LineSet]) -> Vec<LineSet> {
    collapse_repeats(minimize_line_labels(segment_lines))
}

/// Labels each segment with the set of lines it will be ridden on.  Segments ridden without a
/// change share the same label, and every label is a subset of the segment's own lines.
pub fn minimize_line_labels(segment_lines: &[LineSet]) -> Vec<LineSet> {
    let mut labels = strip_extra_lines(segment_lines.iter());
    // a second pass from the far end anchors each change where the earlier lines run out
    labels = strip_extra_lines(labels.iter().rev());
    labels.reverse();
    labels
}

// greedily rides the current lines for as long as any of them continue
fn strip_extra_lines<'a, I>(segment_lines: I) -> Vec<LineSet>
                            where I: Iterator<Item = &'a LineSet> {
    let mut labels: Vec<LineSet> = vec![];
    for next_lines in segment_lines {
        let label = match labels.last() {
            Some(current) => {
                let continued: LineSet = current.intersection(next_lines).cloned().collect();
                if continued.is_empty() {
                    next_lines.clone()
                } else {
                    continued
                }
            }
            None => next_lines.clone(),
        };
        labels.push(label);
    }
    labels
}

fn collapse_repeats(labels: Vec<LineSet>) -> Vec<LineSet> {
    let mut collapsed: Vec<LineSet> = vec![];
    for label in labels {
        if collapsed.last() != Some(&label) {
            collapsed.push(label);
        }
    }
    collapsed
}

/// Average wait for the first of several lines to arrive, assuming their arrivals are perfectly
/// staggered: half the combined interval.  Headways are in minutes.
pub fn wait_time_from_headways<I>(headways: I) -> f64 where I: IntoIterator<Item = f64> {
    let frequency_per_hour: f64 = headways.into_iter().map(|headway| 60. / headway).sum();
    if frequency_per_hour <= 0. {
        // nothing ever comes
        return f64::INFINITY;
    }
    30. / frequency_per_hour
}

/// Expected wait when boarding any of `lines`.
pub fn segment_wait_time<CC>(cfg: &CC, graph: &TransitGraph, lines: &LineSet) -> f64
                             where CC: RoutingConfig {
    let headways = lines.iter().filter_map(|line_id| {
        let mode = match graph.line_mode(line_id) {
            Some(mode) => Some(mode),
            None => classify(line_id).ok(),
        };
        match mode {
            Some(mode) => Some(cfg.line_headway(line_id, mode)),
            None => {
                log::warn!("no mode known for line {}, ignoring its service", line_id);
                None
            }
        }
    });
    wait_time_from_headways(headways)
}


#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::config::NetworkConfig;
    use crate::modes::Mode;
    use crate::test_utils::{detour_graph, line_set, line_sets};

    #[test]
    fn test_minimize_single_change() {
        let segment_lines = line_sets(&[
            &["2", "10", "60"],
            &["2", "10", "60"],
            &["2", "52", "60"],
            &["2", "52", "60"],
            &["2", "6", "18"],
            &["2", "6", "18"],
            &["2", "18"],
            &["2", "18", "4"],
            &["2", "18"],
            &["18", "1"],
            &["18", "1"],
            &["1"],
        ]);
        assert_eq!(minimize_lines(&segment_lines), line_sets(&[&["2"], &["1"]]));
    }

    #[test]
    fn test_minimize_several_changes() {
        let segment_lines = line_sets(&[
            &["10", "60"],
            &["10", "60"],
            &["52", "60"],
            &["52", "60"],
            &["6", "18"],
            &["6", "18"],
            &["18"],
            &["18", "4"],
            &["18"],
            &["18", "1"],
            &["18", "1"],
            &["1"],
        ]);
        let labels = minimize_line_labels(&segment_lines);
        assert_eq!(labels.len(), segment_lines.len());
        assert_eq!(labels[3], line_set(&["60"]));
        assert_eq!(labels[4], line_set(&["18"]));
        assert_eq!(labels[10], line_set(&["18"]));
        assert_eq!(minimize_lines(&segment_lines), line_sets(&[&["60"], &["18"], &["1"]]));
    }

    #[test]
    fn test_minimize_keeps_interchangeable_lines() {
        let segment_lines = line_sets(&[&["1", "2"], &["1", "2", "U3"], &["1", "2"]]);
        assert_eq!(minimize_lines(&segment_lines), line_sets(&[&["1", "2"]]));
        assert!(minimize_lines(&[]).is_empty());
    }

    #[test]
    fn test_minimize_properties() {
        let cases = vec![
            line_sets(&[&["a", "b"], &["b", "c"], &["c"], &["a", "c"], &["a"]]),
            line_sets(&[&["a"], &["a", "b"], &["b"], &["b", "c"], &["c", "d"], &["d"]]),
            line_sets(&[&["x", "y", "z"], &["y"], &["x", "y", "z"], &["z"], &["z", "x"]]),
            line_sets(&[&["a"], &["b"], &["a"], &["b"]]),
            line_sets(&[&["q"]]),
        ];
        for segment_lines in cases {
            let labels = minimize_line_labels(&segment_lines);
            // each segment's label is a non-empty subset of its lines
            for (label, lines) in labels.iter().zip(segment_lines.iter()) {
                assert!(! label.is_empty());
                assert!(label.is_subset(lines), "{:?} not in {:?}", label, lines);
            }
            let minimized = minimize_lines(&segment_lines);
            for pair in minimized.windows(2) {
                assert_ne!(pair[0], pair[1]);
            }
            // applying it again changes nothing
            assert_eq!(minimize_lines(&minimized), minimized);
        }
    }

    #[test]
    fn test_wait_time_alternating_lines() {
        let cfg = NetworkConfig::default();
        let mut graph = TransitGraph::new(&cfg);
        graph.add_line("5", &["A", "B"], None).unwrap();
        graph.add_line("6", &["A", "B"], None).unwrap();
        assert_relative_eq!(cfg.get_headway(Mode::Tram), 6.);
        assert_relative_eq!(segment_wait_time(&cfg, &graph, &line_set(&["5", "6"])), 1.5);
        assert_relative_eq!(segment_wait_time(&cfg, &graph, &line_set(&["5"])), 3.);
        assert_relative_eq!(wait_time_from_headways(vec![6., 6.]), 1.5);
    }

    #[test]
    fn test_wait_time_exceptions_and_overrides() {
        let cfg = NetworkConfig::default();
        let mut graph = TransitGraph::new(&cfg);
        graph.add_line("Airport Shuttle", &["A", "B"], Some(Mode::Commuter)).unwrap();
        // 15 minute commuter headway
        assert_relative_eq!(segment_wait_time(&cfg, &graph, &line_set(&["Airport Shuttle"])), 7.5);
        // U6 runs every 3 minutes, and isn't in the graph, so it's classified on the fly
        assert_relative_eq!(segment_wait_time(&cfg, &graph, &line_set(&["U6"])), 1.5);
        // lines with no known mode contribute nothing
        assert_eq!(segment_wait_time(&cfg, &graph, &line_set(&["Mystery"])), f64::INFINITY);
    }

    #[test]
    fn test_wait_time_never_increases_with_more_lines() {
        let headways = [6., 4., 15., 30., 3., 8.];
        let mut prev = f64::INFINITY;
        for ii in 1..=headways.len() {
            let wait = wait_time_from_headways(headways[..ii].iter().cloned());
            assert!(wait <= prev);
            prev = wait;
        }
        assert_eq!(wait_time_from_headways(vec![]), f64::INFINITY);
    }

    #[test]
    fn test_fastest_path_single_line() {
        let cfg = NetworkConfig::default();
        let graph = detour_graph(&cfg);
        let route = fastest_path(&graph, &cfg, "A", "C").unwrap();
        assert_eq!(route.stations, vec!["A", "B", "C"]);
        assert_eq!(route.lines, line_sets(&[&["1"]]));
        assert_relative_eq!(route.time, 4.);
        assert_eq!(route.num_transfers(), 0);
    }

    #[test]
    fn test_fastest_path_mode_change() {
        let cfg = NetworkConfig::default();
        let graph = detour_graph(&cfg);
        let route = fastest_path(&graph, &cfg, "A", "D").unwrap();
        assert_eq!(route.stations, vec!["A", "B", "D"]);
        assert_eq!(route.lines, line_sets(&[&["1"], &["U1"]]));
        // 2 on the tram, 1.5 on the metro, a mode change, and half the metro's 4 minute headway
        assert_relative_eq!(route.time, 2. + 1.5 + 5. + 2.);
    }

    #[test]
    fn test_fastest_path_same_mode_change() {
        let cfg = NetworkConfig::default();
        let mut graph = TransitGraph::new(&cfg);
        graph.add_line("1", &["A", "B"], None).unwrap();
        graph.add_line("2", &["B", "C"], None).unwrap();
        let route = fastest_path(&graph, &cfg, "A", "C").unwrap();
        assert_relative_eq!(route.time, 2. + 2. + 3. + 3.);
    }

    #[test]
    fn test_fastest_path_avoids_transfers() {
        let cfg = NetworkConfig::default();
        let mut graph = TransitGraph::new(&cfg);
        // short by distance, but with a change halfway
        graph.add_line("U1", &["X", "M"], None).unwrap();
        graph.add_line("U2", &["M", "Y"], None).unwrap();
        // longer, but a single ride
        graph.add_line("5", &["X", "N1", "N2", "Y"], None).unwrap();

        let route = fastest_path(&graph, &cfg, "X", "Y").unwrap();
        assert_eq!(route.stations, vec!["X", "N1", "N2", "Y"]);
        assert_relative_eq!(route.time, 6.);

        // with only one candidate, the transfer route is all there is
        let mut one_candidate = cfg.clone();
        one_candidate.num_candidates = 1;
        let route = fastest_path(&graph, &one_candidate, "X", "Y").unwrap();
        assert_eq!(route.stations, vec!["X", "M", "Y"]);
        assert_relative_eq!(route.time, 1.5 + 1.5 + 3. + 2.);
    }

    #[test]
    fn test_fastest_path_failures() {
        let cfg = NetworkConfig::default();
        let mut graph = detour_graph(&cfg);
        match fastest_path(&graph, &cfg, "A", "Nowhere") {
            Err(TransitError::UnknownStation {name, ..}) => assert_eq!(name, "Nowhere"),
            other => panic!("expected an unknown station, got {:?}", other),
        }

        graph.remove_station("B");
        match fastest_path(&graph, &cfg, "A", "C") {
            Err(TransitError::NoPathFound {origin, target}) => {
                assert_eq!(origin, "A");
                assert_eq!(target, "C");
            }
            other => panic!("expected no path, got {:?}", other),
        }
    }

    #[test]
    fn test_fastest_path_to_self() {
        let cfg = NetworkConfig::default();
        let graph = detour_graph(&cfg);
        let route = fastest_path(&graph, &cfg, "B", "B").unwrap();
        assert_eq!(route.stations, vec!["B"]);
        assert!(route.lines.is_empty());
        assert_eq!(route.time, 0.);
    }
}
