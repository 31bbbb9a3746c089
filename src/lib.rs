// imports of other modules from this crate
mod error;
pub use error::TransitError;

mod modes;
pub use modes::{classify, Mode, ALL_MODES};

mod config;
pub use config::{ModeTiming, NetworkConfig};

mod transit_graph;
pub use transit_graph::{LineSet, Segment, TransitGraph};

mod ranked_paths;

mod routing;
pub use routing::{fastest_path, minimize_lines, segment_wait_time, wait_time_from_headways};

mod journeys;
pub use journeys::{Journey, JourneyOutcome, Route};

mod stats;
pub use stats::{DisruptionStats, Distribution};

mod name_matching;
pub use name_matching::{detect_possible_duplicates, NameMatcher, SimilarityMatcher,
                         DEFAULT_DUPLICATE_THRESHOLD};

mod disruption_sim;
pub use disruption_sim::{DisruptionEvent, SimState, SimulationRun};

#[cfg(test)]
mod test_utils;


/// Defines the timing parameters the routing algorithm needs.
pub trait RoutingConfig {
    fn get_travel_time(&self, mode: Mode) -> f64;
    fn get_headway(&self, mode: Mode) -> f64;
    fn get_headway_exception(&self, line_id: &str) -> Option<f64>;
    fn get_transfer_penalty_same_mode(&self) -> f64;
    fn get_transfer_penalty_mode_change(&self) -> f64;
    fn get_num_candidates(&self) -> usize;

    /// The headway of a specific line, which may differ from the nominal headway of its mode.
    fn line_headway(&self, line_id: &str, mode: Mode) -> f64 {
        match self.get_headway_exception(line_id) {
            Some(headway) => headway,
            None => self.get_headway(mode),
        }
    }

    fn transfer_penalty(&self, from_mode: Mode, to_mode: Mode) -> f64 {
        if from_mode == to_mode {
            return self.get_transfer_penalty_same_mode();
        }
        return self.get_transfer_penalty_mode_change();
    }
}
