use std::path::Path;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_isaac::Isaac64Rng;
use rayon::prelude::*;

use super::config::NetworkConfig;
use super::error::TransitError;
use super::journeys::{self, Journey, JourneyOutcome, Route};
use super::name_matching::{NameMatcher, SimilarityMatcher};
use super::routing::fastest_path;
use super::stats::DisruptionStats;
use super::transit_graph::{LineSet, TransitGraph};


// how many origin-target pairs may be drawn per requested journey before giving up on finding
// connected pairs
static MAX_SAMPLES_PER_JOURNEY: usize = 10;

/// A permanent change to the network.
#[derive(PartialEq, Debug, Clone)]
pub enum DisruptionEvent {
    /// The station and every segment touching it are removed.
    CloseStation(String),
    /// The given lines stop serving the segment between two adjacent stations.  With no lines
    /// given, the segment is removed outright.
    Segment {
        origin: String,
        target: String,
        lines: Option<LineSet>,
    },
}

impl DisruptionEvent {
    pub fn close_station(station_id: &str) -> DisruptionEvent {
        DisruptionEvent::CloseStation(String::from(station_id))
    }

    pub fn close_segment(origin: &str, target: &str) -> DisruptionEvent {
        DisruptionEvent::Segment {
            origin: String::from(origin),
            target: String::from(target),
            lines: None,
        }
    }

    pub fn suspend_lines(origin: &str, target: &str, lines: &[&str]) -> DisruptionEvent {
        DisruptionEvent::Segment {
            origin: String::from(origin),
            target: String::from(target),
            lines: Some(lines.iter().map(|ll| String::from(*ll)).collect()),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SimState {
    Idle,
    JourneysGenerated,
    Disrupted,
    Replayed,
    StatsAvailable,
}

/// Measures how a disruption changes a population of randomly sampled journeys.
///
/// A run moves through `Idle -> JourneysGenerated -> Disrupted -> Replayed -> StatsAvailable`,
/// and `reset` takes it back to `Idle` with the network as it was first built.  A run is not
/// meant to be shared between threads; to evaluate several disruptions at once, build one run
/// per disruption.
pub struct SimulationRun {
    pristine: TransitGraph,
    graph: TransitGraph,
    cfg: NetworkConfig,
    journeys: Vec<Journey>,
    closed_stations: Vec<String>,
    state: SimState,
    matcher: Box<dyn NameMatcher + Send + Sync>,
    rng: Isaac64Rng,
}

impl SimulationRun {
    pub fn new(graph: TransitGraph, cfg: NetworkConfig) -> SimulationRun {
        let rng = Isaac64Rng::seed_from_u64(cfg.seed);
        SimulationRun {
            pristine: graph.clone(),
            graph,
            cfg,
            journeys: vec![],
            closed_stations: vec![],
            state: SimState::Idle,
            matcher: Box::new(SimilarityMatcher),
            rng,
        }
    }

    /// Builds a run from a yaml config file, which must name the directory of line files.
    pub fn from_cfg(config_path_str: &str) -> Result<SimulationRun, TransitError> {
        let cfg = NetworkConfig::from_cfg(Path::new(config_path_str))?;
        let graph = match &cfg.line_dir {
            Some(line_dir) => TransitGraph::from_line_dir(line_dir, &cfg)?,
            None => return Err(TransitError::Config(
                format!("{} does not give a line_dir", config_path_str))),
        };
        Ok(SimulationRun::new(graph, cfg))
    }

    pub fn with_matcher<MM>(mut self, matcher: MM) -> SimulationRun
                            where MM: NameMatcher + Send + Sync + 'static {
        self.matcher = Box::new(matcher);
        self
    }

    /// Discards the journeys and any disruption, restoring the network as it was built and
    /// re-seeding the random number generator.
    pub fn reset(&mut self) {
        self.graph = self.pristine.clone();
        self.journeys.clear();
        self.closed_stations.clear();
        self.rng = Isaac64Rng::seed_from_u64(self.cfg.seed);
        self.state = SimState::Idle;
        log::debug!("simulation reset");
    }

    /// Samples `count` random origin-target pairs and routes each of them on the undisrupted
    /// network.  Pairs with no route between them are redrawn.
    pub fn generate_journeys(&mut self, count: usize) -> Result<(), TransitError> {
        if self.state != SimState::Idle || ! self.journeys.is_empty() {
            log::warn!("journeys have already been generated");
            return Err(TransitError::PreconditionViolation(
                String::from("journeys have already been generated, reset first")));
        }
        let stations = self.graph.station_names();
        if stations.len() < 2 {
            return Err(TransitError::PreconditionViolation(
                String::from("the network needs at least two stations to route between")));
        }

        let max_samples = count.saturating_mul(MAX_SAMPLES_PER_JOURNEY);
        let mut num_sampled = 0;
        let mut journeys: Vec<Journey> = Vec::with_capacity(count);
        while journeys.len() < count && num_sampled < max_samples {
            let batch_size = std::cmp::min(count - journeys.len(), max_samples - num_sampled);
            let mut pairs = Vec::with_capacity(batch_size);
            for _ in 0..batch_size {
                let pair: Vec<&String> = stations.choose_multiple(&mut self.rng, 2).collect();
                pairs.push((pair[0].clone(), pair[1].clone()));
            }
            num_sampled += batch_size;

            let graph = &self.graph;
            let cfg = &self.cfg;
            let routed: Vec<Option<Journey>> = pairs.par_iter().map(|(origin, target)| {
                match fastest_path(graph, cfg, origin, target) {
                    Ok(route) => Some(Journey::new(origin, target, route)),
                    Err(err) => {
                        log::debug!("redrawing journey from {} to {}: {}", origin, target, err);
                        None
                    }
                }
            }).collect();
            journeys.extend(routed.into_iter().flatten());
        }

        if journeys.len() < count {
            log::warn!("only found {} of {} connected journeys after {} draws", journeys.len(),
                       count, num_sampled);
        }
        log::info!("generated {} journeys", journeys.len());
        self.journeys = journeys;
        self.state = SimState::JourneysGenerated;
        Ok(())
    }

    pub fn apply_disruption(&mut self, event: DisruptionEvent) -> Result<(), TransitError> {
        self.apply_disruptions(&[event])
    }

    /// Applies several events as a single disruption.  Either all of them take effect or, if any
    /// is invalid, none do.  Journeys are generated first if that hasn't happened yet.
    pub fn apply_disruptions(&mut self, events: &[DisruptionEvent]) -> Result<(), TransitError> {
        match self.state {
            SimState::Idle => {
                log::info!("journeys have not been simulated yet, doing now");
                let count = self.cfg.journey_count;
                self.generate_journeys(count)?;
            }
            SimState::JourneysGenerated => (),
            _ => {
                log::warn!("a disruption was already applied in this run");
                return Err(TransitError::PreconditionViolation(
                    String::from("a disruption was already applied, reset first")));
            }
        }
        if events.is_empty() {
            return Err(TransitError::InvalidDisruptionShape(String::from("no events given")));
        }

        let mut graph = self.graph.clone();
        let mut closed = vec![];
        for event in events {
            match event {
                DisruptionEvent::CloseStation(station_id) => {
                    if ! graph.remove_station(station_id) {
                        return Err(self.unknown_station(station_id));
                    }
                    log::info!("closed station {}", station_id);
                    closed.push(station_id.clone());
                }
                DisruptionEvent::Segment {origin, target, lines} => {
                    for station_id in [origin, target].iter() {
                        if ! graph.has_station(station_id) {
                            return Err(self.unknown_station(station_id));
                        }
                    }
                    let segment = match graph.segment(origin, target) {
                        Some(segment) => segment,
                        None => return Err(TransitError::InvalidDisruptionShape(
                            format!("{} and {} are not adjacent", origin, target))),
                    };
                    match lines {
                        None => {
                            graph.remove_segment(origin, target);
                            log::info!("closed segment {} - {}", origin, target);
                        }
                        Some(lines) => {
                            if lines.is_empty() {
                                return Err(TransitError::InvalidDisruptionShape(
                                    format!("no lines given for {} - {}", origin, target)));
                            }
                            let unserved: Vec<&String> = lines.difference(&segment.lines)
                                                              .collect();
                            if ! unserved.is_empty() {
                                return Err(TransitError::InvalidDisruptionShape(
                                    format!("lines {:?} don't serve {} - {}", unserved, origin,
                                            target)));
                            }
                            graph.remove_lines_from_segment(origin, target, lines);
                            log::info!("suspended {:?} between {} and {}", lines, origin,
                                       target);
                        }
                    }
                }
            }
        }

        self.graph = graph;
        self.closed_stations.extend(closed);
        self.state = SimState::Disrupted;
        Ok(())
    }

    /// Re-routes every journey on the disrupted network.  Journeys to or from a closed station,
    /// or with no remaining route, are canceled.
    pub fn replay(&mut self) -> Result<(), TransitError> {
        if self.state != SimState::Disrupted {
            log::warn!("replay requested with no fresh disruption (state {:?})", self.state);
            return Err(TransitError::PreconditionViolation(
                String::from("apply a disruption before replaying")));
        }

        let graph = &self.graph;
        let cfg = &self.cfg;
        let closed = &self.closed_stations;
        let outcomes: Vec<JourneyOutcome> = self.journeys.par_iter().map(|journey| {
            if closed.iter().any(|station_id| journey.touches(station_id)) {
                log::debug!("Journey from {} to {} not possible", journey.origin, journey.target);
                return JourneyOutcome::Canceled;
            }
            match fastest_path(graph, cfg, &journey.origin, &journey.target) {
                Ok(route) => JourneyOutcome::Completed(route),
                Err(err) => {
                    log::debug!("Journey from {} to {} is no longer reachable: {}",
                                journey.origin, journey.target, err);
                    JourneyOutcome::Canceled
                }
            }
        }).collect();

        for (journey, outcome) in self.journeys.iter_mut().zip(outcomes) {
            journey.set_outcome(outcome);
        }
        log::info!("replayed {} journeys", self.journeys.len());
        self.state = SimState::Replayed;
        Ok(())
    }

    pub fn stats(&mut self) -> Result<DisruptionStats, TransitError> {
        match self.state {
            SimState::Replayed | SimState::StatsAvailable => {
                let stats = DisruptionStats::from_journeys(&self.journeys);
                self.state = SimState::StatsAvailable;
                Ok(stats)
            }
            _ => {
                log::error!("No disruption was replayed (state {:?})", self.state);
                Err(TransitError::PreconditionViolation(
                    String::from("no disruption has been replayed")))
            }
        }
    }

    /// Routes a single trip on the current network.  An unknown station comes back with
    /// suggestions of similarly named stations.
    pub fn route(&self, source: &str, target: &str) -> Result<Route, TransitError> {
        match fastest_path(&self.graph, &self.cfg, source, target) {
            Err(TransitError::UnknownStation {name, ..}) =>
                Err(self.unknown_station(&name)),
            other => other,
        }
    }

    /// The baseline time and, where the journey survived the disruption, the new time.
    pub fn journey_times(&self) -> Vec<(f64, Option<f64>)> {
        self.journeys.iter().map(|journey| (journey.time(), journey.time_new())).collect()
    }

    pub fn write_times_csv(&self, csv_path: &Path, affected_only: bool)
                           -> Result<usize, TransitError> {
        journeys::write_times_csv(&self.journeys, csv_path, affected_only)
    }

    pub fn journeys(&self) -> &[Journey] {
        &self.journeys
    }

    pub fn closed_stations(&self) -> &[String] {
        &self.closed_stations
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn graph(&self) -> &TransitGraph {
        &self.graph
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.cfg
    }

    // suggestions come from the network as it was before the current batch of events
    fn unknown_station(&self, station_id: &str) -> TransitError {
        let suggestions = self.matcher.suggest_default(station_id, &self.graph.station_names());
        log::warn!("Station {} not found, did you mean one of {:?}?", station_id, suggestions);
        TransitError::UnknownStation {
            name: String::from(station_id),
            suggestions,
        }
    }
}
