use std::path::Path;

use super::error::TransitError;
use super::transit_graph::LineSet;


/// A routed trip: the sets of interchangeable lines ridden in order, the realistic travel time
/// including transfers and waiting, and the stations passed through.
#[derive(PartialEq, Debug, Clone)]
pub struct Route {
    pub lines: Vec<LineSet>,
    pub time: f64,
    pub stations: Vec<String>,
}

impl Route {
    pub fn num_transfers(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }
}

/// What became of a journey once a disruption was replayed.
#[derive(PartialEq, Debug, Clone)]
pub enum JourneyOutcome {
    Pending,
    Completed(Route),
    Canceled,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Journey {
    pub origin: String,
    pub target: String,
    pub baseline: Route,
    outcome: JourneyOutcome,
}

impl Journey {
    pub fn new(origin: &str, target: &str, baseline: Route) -> Journey {
        Journey {
            origin: String::from(origin),
            target: String::from(target),
            baseline,
            outcome: JourneyOutcome::Pending,
        }
    }

    pub fn outcome(&self) -> &JourneyOutcome {
        &self.outcome
    }

    pub(crate) fn set_outcome(&mut self, outcome: JourneyOutcome) {
        self.outcome = outcome;
    }

    pub fn time(&self) -> f64 {
        self.baseline.time
    }

    pub fn new_route(&self) -> Option<&Route> {
        match &self.outcome {
            JourneyOutcome::Completed(route) => Some(route),
            _ => None,
        }
    }

    pub fn time_new(&self) -> Option<f64> {
        self.new_route().map(|route| route.time)
    }

    pub fn is_canceled(&self) -> bool {
        self.outcome == JourneyOutcome::Canceled
    }

    pub fn touches(&self, station_id: &str) -> bool {
        self.origin == station_id || self.target == station_id
    }

    /// Change in travel time caused by the disruption, if the journey is still possible.
    pub fn delay(&self) -> Option<f64> {
        self.time_new().map(|time_new| time_new - self.time())
    }

    pub fn percent_delay(&self) -> Option<f64> {
        match self.delay() {
            Some(delay) if self.time() > 0. => Some(100. * delay / self.time()),
            Some(_) => Some(0.),
            None => None,
        }
    }
}

/// Writes the old and new travel time of each journey, for plotting elsewhere.  Canceled and
/// pending journeys have an empty `time_new`.  With `affected_only`, only journeys that are still
/// possible but took a different amount of time are written.
pub fn write_times_csv(journeys: &[Journey], csv_path: &Path, affected_only: bool)
                       -> Result<usize, TransitError> {
    let mut writer = csv::Writer::from_path(csv_path)?;
    writer.write_record(&["origin", "target", "time", "time_new"])?;
    let mut num_written = 0;
    for journey in journeys {
        if affected_only {
            match journey.time_new() {
                Some(time_new) if time_new != journey.time() => (),
                _ => continue,
            }
        }
        let time_new = match journey.time_new() {
            Some(time_new) => time_new.to_string(),
            None => String::new(),
        };
        let time = journey.time().to_string();
        writer.write_record(&[&journey.origin, &journey.target, &time, &time_new])?;
        num_written += 1;
    }
    writer.flush()?;
    Ok(num_written)
}
