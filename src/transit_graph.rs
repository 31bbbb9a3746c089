// this file defines a struct to represent the stations of a transit network and the line segments
// between them.  It's a wrapper around a petgraph graph.
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;

use glob::{glob_with, MatchOptions};
use itertools::Itertools;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableUnGraph;

use super::error::TransitError;
use super::modes::{classify, Mode, ALL_MODES};
use super::RoutingConfig;


/// The ids of the lines serving a segment.  Ordered so that itineraries print reproducibly.
pub type LineSet = BTreeSet<String>;

#[derive(PartialEq, Debug, Clone)]
pub struct Segment {
    pub lines: LineSet,
    // the fastest mode among the lines, which sets the segment's travel time
    pub mode: Mode,
    pub travel_time: f64,
}

#[derive(Clone, Debug)]
pub struct TransitGraph {
    network: StableUnGraph<String, Segment>,
    node_idxs_by_id: HashMap<String, NodeIndex>,
    line_modes: HashMap<String, Mode>,
    travel_times: HashMap<Mode, f64>,
}

impl TransitGraph {
    pub fn new<CC>(cfg: &CC) -> TransitGraph where CC: RoutingConfig {
        let travel_times = ALL_MODES.iter()
            .map(|mode| (*mode, cfg.get_travel_time(*mode)))
            .collect();
        TransitGraph {
            network: StableUnGraph::default(),
            node_idxs_by_id: HashMap::new(),
            line_modes: HashMap::new(),
            travel_times,
        }
    }

    /// Builds the graph from a directory holding one file per line.  The file's name minus its
    /// extension is the line id, and each non-blank row of the file is a station, in order.
    pub fn from_line_dir<CC>(line_dir: &Path, cfg: &CC) -> Result<TransitGraph, TransitError>
                             where CC: RoutingConfig {
        let pattern = format!("{}/*", glob::Pattern::escape(&line_dir.to_string_lossy()));
        let mut graph = TransitGraph::new(cfg);
        let mut num_lines = 0;
        // hidden files such as .gitkeep are not lines
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };
        // glob yields paths in alphabetical order, so the station order is reproducible
        for path in glob_with(&pattern, options)? {
            let path = path.map_err(|err| err.into_error())?;
            if ! path.is_file() {
                continue;
            }
            let line_id = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => continue,
            };
            let contents = std::fs::read_to_string(&path)?;
            let stations: Vec<&str> = contents.lines()
                                              .map(|row| row.trim())
                                              .filter(|row| ! row.is_empty())
                                              .collect();
            log::debug!("loading line {} with {} stations", line_id, stations.len());
            graph.add_line(&line_id, &stations, None)?;
            num_lines += 1;
        }

        if num_lines == 0 {
            return Err(TransitError::MalformedTopology(
                format!("no line files in {}", line_dir.display())));
        }
        log::info!("loaded {} lines, {} stations, {} segments", num_lines, graph.num_stations(),
                   graph.num_segments());
        Ok(graph)
    }

    /// Adds a segment between each pair of consecutive stations.  Segments that already exist are
    /// merged with, and take on the new line's mode if it's faster.  A line may be added in several
    /// pieces, but always with the same mode.
    pub fn add_line<S>(&mut self, line_id: &str, stations: &[S], mode_override: Option<Mode>)
                       -> Result<(), TransitError> where S: AsRef<str> {
        if stations.len() < 2 {
            return Err(TransitError::MalformedTopology(
                format!("line {} has fewer than two stations", line_id)));
        }
        if stations.iter().any(|ss| ss.as_ref().trim().is_empty()) {
            return Err(TransitError::MalformedTopology(
                format!("line {} has a station with no name", line_id)));
        }
        // a station repeated in place doesn't make a segment
        if stations.iter().map(|ss| ss.as_ref().trim()).dedup().count() < 2 {
            return Err(TransitError::MalformedTopology(
                format!("line {} has fewer than two distinct stations", line_id)));
        }
        let mode = match mode_override {
            Some(mode) => mode,
            None => classify(line_id)?,
        };
        match self.line_modes.get(line_id) {
            Some(known_mode) if *known_mode != mode => {
                return Err(TransitError::MalformedTopology(
                    format!("line {} was already added as {}, not {}", line_id, known_mode, mode)));
            }
            _ => (),
        }
        let travel_time = self.mode_travel_time(mode);
        self.line_modes.insert(String::from(line_id), mode);

        for pair in stations.windows(2) {
            let (from_id, to_id) = (pair[0].as_ref().trim(), pair[1].as_ref().trim());
            if from_id == to_id {
                // ignore self-connections
                log::warn!("line {} visits {} twice in a row", line_id, from_id);
                continue;
            }
            let from_idx = self.get_or_add_station(from_id);
            let to_idx = self.get_or_add_station(to_id);
            match self.network.find_edge(from_idx, to_idx) {
                Some(edge_idx) => {
                    let segment = &mut self.network[edge_idx];
                    segment.lines.insert(String::from(line_id));
                    if travel_time < segment.travel_time {
                        segment.mode = mode;
                        segment.travel_time = travel_time;
                    }
                }
                None => {
                    let mut lines = LineSet::new();
                    lines.insert(String::from(line_id));
                    self.network.add_edge(from_idx, to_idx, Segment {lines, mode, travel_time});
                }
            }
        }
        Ok(())
    }

    pub fn has_station(&self, station_id: &str) -> bool {
        self.node_idxs_by_id.contains_key(station_id)
    }

    pub fn has_segment(&self, from_id: &str, to_id: &str) -> bool {
        self.find_segment(from_id, to_id).is_some()
    }

    pub fn segment(&self, from_id: &str, to_id: &str) -> Option<&Segment> {
        match self.find_segment(from_id, to_id) {
            Some(edge_idx) => self.network.edge_weight(edge_idx),
            None => None,
        }
    }

    /// Removes the station and every segment touching it.  Returns false if there was no such
    /// station.
    pub fn remove_station(&mut self, station_id: &str) -> bool {
        match self.node_idxs_by_id.remove(station_id) {
            Some(node_idx) => {
                self.network.remove_node(node_idx);
                true
            }
            None => false,
        }
    }

    pub fn remove_segment(&mut self, from_id: &str, to_id: &str) -> bool {
        match self.find_segment(from_id, to_id) {
            Some(edge_idx) => self.network.remove_edge(edge_idx).is_some(),
            None => false,
        }
    }

    /// Takes the given lines off a segment.  A segment left with no lines is removed entirely;
    /// otherwise its mode is re-derived from the lines that remain.  Returns false if there was
    /// no such segment.
    pub fn remove_lines_from_segment(&mut self, from_id: &str, to_id: &str, lines: &LineSet)
                                     -> bool {
        let edge_idx = match self.find_segment(from_id, to_id) {
            Some(edge_idx) => edge_idx,
            None => return false,
        };

        let remaining: LineSet = self.network[edge_idx].lines.difference(lines).cloned().collect();
        if remaining.is_empty() {
            log::debug!("segment {}-{} has no lines left, removing it", from_id, to_id);
            self.network.remove_edge(edge_idx);
            return true;
        }

        let mut fastest: Option<(Mode, f64)> = None;
        for line_id in &remaining {
            if let Some(mode) = self.line_modes.get(line_id) {
                let travel_time = self.mode_travel_time(*mode);
                match fastest {
                    Some((_, best_time)) if best_time <= travel_time => (),
                    _ => fastest = Some((*mode, travel_time)),
                }
            }
        }
        let segment = &mut self.network[edge_idx];
        segment.lines = remaining;
        if let Some((mode, travel_time)) = fastest {
            segment.mode = mode;
            segment.travel_time = travel_time;
        }
        true
    }

    /// Station names in node order.  The order is stable for a given construction sequence.
    pub fn station_names(&self) -> Vec<String> {
        self.network.node_indices().map(|ni| self.network[ni].clone()).collect()
    }

    pub fn line_mode(&self, line_id: &str) -> Option<Mode> {
        self.line_modes.get(line_id).copied()
    }

    pub fn num_stations(&self) -> usize {
        self.network.node_count()
    }

    pub fn num_segments(&self) -> usize {
        self.network.edge_count()
    }

    pub(crate) fn get_node_idx_by_id(&self, station_id: &str) -> Option<NodeIndex> {
        self.node_idxs_by_id.get(station_id).copied()
    }

    pub(crate) fn get_node_id_by_idx(&self, node_idx: NodeIndex) -> Option<&str> {
        self.network.node_weight(node_idx).map(|ss| ss.as_str())
    }

    pub(crate) fn get_network(&self) -> &StableUnGraph<String, Segment> {
        &self.network
    }

    fn mode_travel_time(&self, mode: Mode) -> f64 {
        match self.travel_times.get(&mode) {
            Some(time) => *time,
            None => f64::INFINITY,
        }
    }

    fn find_segment(&self, from_id: &str, to_id: &str) -> Option<EdgeIndex> {
        let from_idx = self.get_node_idx_by_id(from_id)?;
        let to_idx = self.get_node_idx_by_id(to_id)?;
        self.network.find_edge(from_idx, to_idx)
    }

    fn get_or_add_station(&mut self, station_id: &str) -> NodeIndex {
        if let Some(node_idx) = self.node_idxs_by_id.get(station_id) {
            return *node_idx;
        }
        let node_idx = self.network.add_node(String::from(station_id));
        self.node_idxs_by_id.insert(String::from(station_id), node_idx);
        node_idx
    }
}
